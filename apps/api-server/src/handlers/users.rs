//! User listing for administrators.

use actix_web::{HttpResponse, web};

use quill_core::ports::BaseRepository;
use quill_shared::dto::UserResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    identity.require_admin()?;

    let users: Vec<UserResponse> = state
        .users
        .find_all()
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}
