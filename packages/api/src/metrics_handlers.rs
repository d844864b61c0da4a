// ABOUTME: HTTP request handlers for agent metrics
// ABOUTME: Snapshot reads and the live SSE change stream for one project

use std::convert::Infallible;

use agentboard_core::MetricChange;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{sse::Event, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::guard::{require_owned_project, require_project_id};
use crate::sse::{change_event, create_resync_event, create_sse_response};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
}

pub async fn list_metrics(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<MetricsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let project_id = require_project_id(query.project_id.as_deref())?;
    info!("Listing metrics for project {}", project_id);

    let project = require_owned_project(&state.db, user.id(), project_id).await?;
    let metrics = state.db.metrics_storage.list_for_project(&project.id).await?;

    Ok(Json(json!({ "metrics": metrics, "project_id": project.id })))
}

pub async fn stream_metrics(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<MetricsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let project_id = require_project_id(query.project_id.as_deref())?;
    let project = require_owned_project(&state.db, user.id(), project_id).await?;

    info!("Opening metrics stream for project {}", project.id);

    // Subscribe before responding so no change after this point is missed
    let receiver = state.db.change_feed.subscribe();
    let project_id = project.id;

    let stream = BroadcastStream::new(receiver).filter_map(move |item| {
        event_for(item, &project_id).map(Ok::<Event, Infallible>)
    });

    Ok(create_sse_response(stream))
}

fn event_for(item: Result<MetricChange, BroadcastStreamRecvError>, project_id: &str) -> Option<Event> {
    match item {
        Ok(change) if change.project_id() == project_id => Some(change_event(&change)),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            warn!("Metrics stream for project {} lagged by {} events", project_id, missed);
            Some(create_resync_event(missed))
        }
    }
}
