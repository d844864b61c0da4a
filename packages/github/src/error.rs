// ABOUTME: Error types for GitHub API calls
// ABOUTME: Separates credential problems from transport and upstream failures

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub rejected the access token: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("GitHub returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type GitHubResult<T> = Result<T, GitHubError>;

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        GitHubError::Network(err.to_string())
    }
}
