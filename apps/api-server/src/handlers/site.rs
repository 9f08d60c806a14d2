//! Site title.

use actix_web::{HttpResponse, web};

use quill_core::domain::validate_title;
use quill_shared::dto::{TitleRequest, TitleResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/title
pub async fn get_title(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let title = state.site.title().await?;
    Ok(HttpResponse::Ok().json(TitleResponse { title }))
}

/// PUT /api/title
pub async fn update_title(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<TitleRequest>,
) -> AppResult<HttpResponse> {
    identity.require_admin()?;

    let title = body.into_inner().title.trim().to_string();
    validate_title(&title)?;

    let title = state.site.set_title(&title).await?;
    tracing::info!(user = %identity.username, title = %title, "Site title updated");

    Ok(HttpResponse::Ok().json(TitleResponse { title }))
}
