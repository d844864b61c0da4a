// ABOUTME: HTTP request handlers for project operations
// ABOUTME: List, create, delete, and sync projects owned by the current user

use agentboard_core::validate_project_input;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::guard::require_owned_project;
use crate::state::AppState;

/// Request body for creating a project
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub github_repo: Option<String>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    info!("Listing projects for user {}", user.id());

    let projects = state.db.project_storage.list_for_user(user.id()).await?;
    Ok(Json(json!({ "projects": projects })))
}

pub async fn create_project(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    info!("Creating project for user {}", user.id());

    let input = validate_project_input(request.name.as_deref(), request.github_repo.as_deref())
        .map_err(|e| AppError::validation(e.to_string()))?;

    let project = state.db.project_storage.create(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

pub async fn delete_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Deleting project {} for user {}", project_id, user.id());

    let deleted = state
        .db
        .project_storage
        .delete_owned(user.id(), &project_id)
        .await?;
    if !deleted {
        return Err(AppError::project_not_found());
    }

    Ok(Json(json!({ "deleted": true })))
}

pub async fn sync_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Syncing project {} for user {}", project_id, user.id());

    // Ownership is checked inside the synchronizer before any fetch
    let report = state.synchronizer.sync(user.id(), &project_id).await?;
    Ok(Json(report))
}
