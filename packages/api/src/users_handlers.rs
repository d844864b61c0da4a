// ABOUTME: HTTP request handlers for the current user
// ABOUTME: Masked profile and GitHub connect / disconnect

use agentboard_core::MaskedUser;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for connecting a GitHub account
#[derive(Debug, Deserialize)]
pub struct ConnectGitHubRequest {
    pub username: Option<String>,
    #[serde(default)]
    pub token: String,
}

/// Get current user (with masked credentials)
pub async fn get_current_user(user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let masked: MaskedUser = user.0.into();
    Ok(Json(json!({ "user": masked })))
}

pub async fn connect_github(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<ConnectGitHubRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    info!("Connecting GitHub for user {}", user.id());

    let updated = state
        .db
        .user_storage
        .set_github_credentials(user.id(), request.username.as_deref(), &request.token)
        .await?;

    let masked: MaskedUser = updated.into();
    Ok(Json(json!({ "user": masked })))
}

pub async fn disconnect_github(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    info!("Disconnecting GitHub for user {}", user.id());

    let updated = state.db.user_storage.clear_github_credentials(user.id()).await?;
    let masked: MaskedUser = updated.into();
    Ok(Json(json!({ "user": masked })))
}
