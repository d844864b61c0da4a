// ABOUTME: Error types for session token verification
// ABOUTME: Distinguishes malformed, forged, and expired tokens for logging

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,

    #[error("Malformed session token: {0}")]
    MalformedToken(String),

    #[error("Session token signature mismatch")]
    InvalidSignature,

    #[error("Token expired or invalid")]
    TokenExpired,

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}
