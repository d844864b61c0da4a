// ABOUTME: User storage layer using SQLite
// ABOUTME: Resolves identity-provider subjects to users and manages GitHub credentials

use agentboard_core::{generate_id, User, ValidationError};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::timestamps;

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: &str) -> StorageResult<User> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound("User".to_string()))?;

        row_to_user(&row)
    }

    pub async fn find_by_subject(&self, subject: &str) -> StorageResult<Option<User>> {
        debug!("Looking up user by subject: {}", subject);

        let row = sqlx::query("SELECT * FROM users WHERE subject = ?")
            .bind(subject)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Map a verified identity to an internal user, creating the row on first sight.
    ///
    /// The email claim is only required when the user does not exist yet.
    /// Concurrent first requests for one subject converge on a single row.
    pub async fn resolve_identity(&self, subject: &str, email: Option<&str>) -> StorageResult<User> {
        if let Some(user) = self.find_by_subject(subject).await? {
            return Ok(user);
        }

        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ValidationError::Missing("User email not found".to_string()))?;

        let now = timestamps::encode(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, subject, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(subject) DO NOTHING
            "#,
        )
        .bind(generate_id())
        .bind(subject)
        .bind(email)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() > 0 {
            info!("Created user for subject {}", subject);
        }

        self.find_by_subject(subject)
            .await?
            .ok_or_else(|| StorageError::NotFound("User".to_string()))
    }

    pub async fn set_github_credentials(
        &self,
        user_id: &str,
        username: Option<&str>,
        token: &str,
    ) -> StorageResult<User> {
        debug!("Connecting GitHub for user: {}", user_id);

        let token = token.trim();
        if token.is_empty() {
            return Err(ValidationError::Missing("GitHub token is required".to_string()).into());
        }
        let username = username.map(str::trim).filter(|u| !u.is_empty());

        let result = sqlx::query(
            r#"
            UPDATE users
            SET github_token = ?, github_username = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(token)
        .bind(username)
        .bind(timestamps::encode(Utc::now()))
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("User".to_string()));
        }

        self.get_user(user_id).await
    }

    pub async fn clear_github_credentials(&self, user_id: &str) -> StorageResult<User> {
        debug!("Disconnecting GitHub for user: {}", user_id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET github_token = NULL, github_username = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(timestamps::encode(Utc::now()))
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("User".to_string()));
        }

        self.get_user(user_id).await
    }
}

fn row_to_user(row: &SqliteRow) -> StorageResult<User> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(User {
        id: row.try_get("id")?,
        subject: row.try_get("subject")?,
        email: row.try_get("email")?,
        github_username: row.try_get("github_username")?,
        github_token: row.try_get("github_token")?,
        created_at: timestamps::decode("created_at", &created_at)?,
        updated_at: timestamps::decode("updated_at", &updated_at)?,
    })
}
