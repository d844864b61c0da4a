// ABOUTME: Error types for the dashboard client
// ABOUTME: Separates terminal failures (auth, not found) from retryable transport errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Errors a retry cannot fix
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized(_) | ClientError::NotFound(_) | ClientError::Configuration(_)
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
