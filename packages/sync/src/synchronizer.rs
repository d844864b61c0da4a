// ABOUTME: Metrics synchronizer pulling agent stats from GitHub into storage
// ABOUTME: Upserts each agent independently and collects per-agent failures

use std::sync::Arc;

use agentboard_core::parse_repo_slug;
use agentboard_github::{GitHubError, MetricsSource};
use agentboard_storage::DbState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::convert::record_to_upsert;
use crate::error::SyncError;

/// Outcome of a completed sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    pub synced_agents: usize,
    pub total_agents: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub last_synced_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct MetricsSynchronizer {
    db: DbState,
    source: Arc<dyn MetricsSource>,
}

impl MetricsSynchronizer {
    pub fn new(db: DbState, source: Arc<dyn MetricsSource>) -> Self {
        Self { db, source }
    }

    /// Sync one project on behalf of its owner.
    ///
    /// Precondition failures abort before anything is written. Once the
    /// file is fetched, a failing agent is reported in `errors` and the
    /// rest are still written.
    pub async fn sync(&self, user_id: &str, project_id: &str) -> Result<SyncReport, SyncError> {
        let project = self
            .db
            .project_storage
            .get_owned(user_id, project_id)
            .await?
            .ok_or(SyncError::ProjectNotFound)?;

        let github_repo = project
            .github_repo
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(SyncError::RepoNotConfigured)?;

        let user = self.db.user_storage.get_user(user_id).await?;
        let token = user
            .github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SyncError::GitHubNotConnected)?;

        let slug = parse_repo_slug(github_repo).ok_or(SyncError::InvalidRepoFormat)?;

        info!("Syncing metrics for project {} from {}", project.id, slug);

        let stats = self
            .source
            .fetch_agent_stats(token, &slug.owner, &slug.repo)
            .await
            .map_err(|e| match e {
                GitHubError::Unauthorized(message) => {
                    warn!("GitHub token rejected for project {}: {}", project.id, message);
                    SyncError::GitHubUnauthorized
                }
                other => {
                    warn!("GitHub fetch failed for project {}: {}", project.id, other);
                    SyncError::UpstreamUnavailable(other.to_string())
                }
            })?
            .ok_or(SyncError::MetricsNotFound)?;

        let total_agents = stats.agents.len();
        let mut synced_agents = 0;
        let mut errors = Vec::new();

        for (agent_name, record) in stats.records() {
            let result = match record {
                Ok(record) => record_to_upsert(agent_name, record),
                Err(e) => Err(e.to_string()),
            };

            let upsert = match result {
                Ok(upsert) => upsert,
                Err(message) => {
                    errors.push(format!("{}: {}", agent_name, message));
                    continue;
                }
            };

            match self.db.metrics_storage.upsert(&project.id, &upsert).await {
                Ok(_) => synced_agents += 1,
                Err(e) => errors.push(format!("{}: {}", agent_name, e)),
            }
        }

        let last_synced_at = Utc::now();
        if let Err(e) = self
            .db
            .project_storage
            .mark_synced(&project.id, last_synced_at)
            .await
        {
            warn!("Failed to record last sync for project {}: {}", project.id, e);
        }

        if !errors.is_empty() {
            warn!(
                "Sync for project {} finished with {} agent errors",
                project.id,
                errors.len()
            );
        }
        info!(
            "Synced {}/{} agents for project {}",
            synced_agents, total_agents, project.id
        );

        Ok(SyncReport {
            success: true,
            synced_agents,
            total_agents,
            errors: (!errors.is_empty()).then_some(errors),
            last_synced_at,
        })
    }
}
