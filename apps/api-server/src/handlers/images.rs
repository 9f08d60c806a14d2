//! Image catalogue.

use actix_web::{HttpResponse, web};

use quill_core::ports::BaseRepository;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/images
pub async fn list_images(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let images = state.images.find_all().await?;
    Ok(HttpResponse::Ok().json(images))
}
