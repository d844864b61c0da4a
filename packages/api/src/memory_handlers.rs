// ABOUTME: HTTP request handlers for agent memory logs
// ABOUTME: Bounded newest-first listing with optional exact entity filters

use agentboard_core::{MemoryQuery, MEMORY_QUERY_LIMIT};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::guard::{require_owned_project, require_project_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MemoryListQuery {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_memories(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<MemoryListQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(params) = query?;
    let project_id = require_project_id(params.project_id.as_deref())?;
    info!("Listing memories for project {}", project_id);

    let project = require_owned_project(&state.db, user.id(), project_id).await?;

    let query = MemoryQuery {
        entity_name: params.entity_name.filter(|v| !v.trim().is_empty()),
        entity_type: params.entity_type.filter(|v| !v.trim().is_empty()),
        limit: params
            .limit
            .unwrap_or(MEMORY_QUERY_LIMIT)
            .clamp(1, MEMORY_QUERY_LIMIT),
    };
    let memories = state.db.memory_storage.list(&project.id, &query).await?;

    Ok(Json(json!({ "memories": memories, "project_id": project.id })))
}
