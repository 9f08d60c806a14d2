//! Login sessions. Tokens are stateless, so logging out only tells the
//! client to forget its token.

use actix_web::{HttpResponse, web};

use quill_core::ports::BaseRepository;
use quill_shared::dto::{LoginRequest, SessionResponse, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/sessions
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim();

    let Some(user) = state.users.find_by_username(username).await? else {
        tracing::warn!(username = %username, "Login failed: unknown user");
        return Err(AppError::Unauthorized);
    };

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::warn!(username = %username, "Login failed: wrong password");
        return Err(AppError::Unauthorized);
    }

    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.role)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Ok().json(SessionResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds(),
        user: UserResponse::from(&user),
    }))
}

/// GET /api/sessions/current
pub async fn current(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    // The token may outlive the account.
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// DELETE /api/sessions/current
pub async fn logout(identity: Identity) -> HttpResponse {
    tracing::info!(user_id = identity.user_id, "User logged out");
    HttpResponse::Ok().json(serde_json::json!({}))
}
