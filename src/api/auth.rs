//! Authentication endpoints
//!
//! Cookie-based sessions: login issues an HttpOnly session cookie, logout
//! deletes the session and clears the cookie.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::UserResponse;
use crate::services::user::SESSION_TTL_DAYS;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, session) = state.user_service.login(&req.email, &req.password).await?;

    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id,
        SESSION_TTL_DAYS * 24 * 60 * 60
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "user": UserResponse::from(&user) })),
    ))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_cookie(&headers) {
        state.user_service.logout(&token).await?;
    }

    let cookie = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string();
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged out" })),
    ))
}

/// GET /auth/me - the logged-in user
pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user.0))
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_str = headers.get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookie_str.split(';') {
        if let Some(token) = cookie.trim().strip_prefix("session=") {
            return Some(token.to_string());
        }
    }
    None
}
