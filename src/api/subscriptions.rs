//! Subscription endpoints
//!
//! Anyone can subscribe with an email; the unsubscribe link carries the
//! subscription's opaque token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::SubscriptionResponse;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// POST /subscriptions
pub async fn subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let subscription = state.subscription_service.subscribe(&req.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "subscription": SubscriptionResponse::from(&subscription),
            "message": "Subscribed",
        })),
    ))
}

/// GET /unsubscribe/{token}
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.subscription_service.unsubscribe(&token).await?;
    Ok(Json(json!({ "message": "Unsubscribed" })))
}
