// ABOUTME: Failure modes of a metrics sync
// ABOUTME: Each variant carries a stable machine-readable code for API clients

use agentboard_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Project not found or access denied")]
    ProjectNotFound,

    #[error("Project does not have a GitHub repository configured")]
    RepoNotConfigured,

    #[error("GitHub not connected. Please connect your GitHub account first.")]
    GitHubNotConnected,

    #[error("github_repo must be in format \"owner/repo\"")]
    InvalidRepoFormat,

    #[error(".claude/metrics/agent-stats.json not found in repository")]
    MetricsNotFound,

    #[error("GitHub rejected the stored token. Please reconnect your GitHub account.")]
    GitHubUnauthorized,

    #[error("GitHub is unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SyncError {
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::ProjectNotFound => "NOT_FOUND",
            SyncError::RepoNotConfigured => "REPO_NOT_CONFIGURED",
            SyncError::GitHubNotConnected => "GITHUB_NOT_CONNECTED",
            SyncError::InvalidRepoFormat => "INVALID_REPO_FORMAT",
            SyncError::MetricsNotFound => "CLAUDE_METRICS_NOT_FOUND",
            SyncError::GitHubUnauthorized => "GITHUB_UNAUTHORIZED",
            SyncError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            SyncError::Storage(_) => "INTERNAL_ERROR",
        }
    }
}
