// ABOUTME: Error type shared by every storage layer
// ABOUTME: Wraps sqlx, migration, and validation failures

use agentboard_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid stored value in {column}: {value}")]
    InvalidData { column: &'static str, value: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound(_) | StorageError::Sqlx(sqlx::Error::RowNotFound)
        )
    }
}
