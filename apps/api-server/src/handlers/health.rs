//! Health check endpoint.

use actix_web::{HttpResponse, web};

use quill_shared::dto::HealthResponse;

use crate::state::AppState;

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.to_string(),
    })
}
