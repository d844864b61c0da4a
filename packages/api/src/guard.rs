// ABOUTME: Ownership guard for project-scoped endpoints
// ABOUTME: Foreign and missing projects produce the same not-found error

use agentboard_core::Project;
use agentboard_storage::DbState;

use crate::error::AppError;

pub async fn require_owned_project(
    db: &DbState,
    user_id: &str,
    project_id: &str,
) -> Result<Project, AppError> {
    db.project_storage
        .get_owned(user_id, project_id)
        .await?
        .ok_or_else(AppError::project_not_found)
}

/// Read the `projectId` query parameter, rejecting blank values
pub fn require_project_id(project_id: Option<&str>) -> Result<&str, AppError> {
    project_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("projectId query parameter is required"))
}
