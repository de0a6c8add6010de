//! Profile endpoints
//!
//! Logged-in users view and edit their own profile. Updates arrive as
//! multipart form data so the avatar image can ride along with the text
//! fields. The password field only changes anything when non-empty.

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::UserResponse;
use crate::models::UpdateProfileInput;

/// GET /profile
pub async fn show_profile(Extension(user): Extension<AuthenticatedUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user.0))
}

/// POST /profile - multipart form: name, email, password?, avatar?
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let mut name = None;
    let mut email = None;
    let mut password = None;
    let mut avatar: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Invalid form data: {}", e)))?
    {
        match field.name() {
            Some("name") => {
                name = Some(field.text().await.map_err(|e| {
                    ApiError::validation_error(format!("Invalid name field: {}", e))
                })?);
            }
            Some("email") => {
                email = Some(field.text().await.map_err(|e| {
                    ApiError::validation_error(format!("Invalid email field: {}", e))
                })?);
            }
            Some("password") => {
                password = Some(field.text().await.map_err(|e| {
                    ApiError::validation_error(format!("Invalid password field: {}", e))
                })?);
            }
            Some("avatar") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::validation_error(format!("Invalid avatar upload: {}", e))
                })?;
                if !data.is_empty() {
                    avatar = Some((data.to_vec(), content_type));
                }
            }
            _ => {}
        }
    }

    let input = UpdateProfileInput {
        name: name.ok_or_else(|| ApiError::validation_error("Missing field: name"))?,
        email: email.ok_or_else(|| ApiError::validation_error("Missing field: email"))?,
        password,
    };

    let mut updated = state.user_service.update_profile(user.0.id, input).await?;

    if let Some((data, content_type)) = avatar {
        let filename = state.image_store.save(&data, &content_type).await?;
        let previous = state
            .user_service
            .set_avatar(user.0.id, Some(filename.clone()))
            .await?;
        if let Some(previous) = previous {
            state.image_store.delete(&previous).await?;
        }
        updated.avatar = Some(filename);
    }

    Ok(Json(UserResponse::from(&updated)))
}
