// ABOUTME: Project storage layer scoped to the owning user
// ABOUTME: Every lookup filters on user_id so foreign projects look nonexistent

use agentboard_core::{generate_id, MetricChange, Project, ProjectCreateInput};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use crate::changes::ChangeFeed;
use crate::error::{StorageError, StorageResult};
use crate::timestamps;

pub struct ProjectStorage {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        Self { pool, feed }
    }

    /// Projects owned by the user, most recently updated first
    pub async fn list_for_user(&self, user_id: &str) -> StorageResult<Vec<Project>> {
        debug!("Listing projects for user: {}", user_id);

        let rows = sqlx::query(
            "SELECT * FROM projects WHERE user_id = ? ORDER BY updated_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_project).collect()
    }

    pub async fn create(&self, user_id: &str, input: ProjectCreateInput) -> StorageResult<Project> {
        debug!("Creating project '{}' for user: {}", input.name, user_id);

        let id = generate_id();
        let now = timestamps::encode(Utc::now());

        let row = sqlx::query(
            r#"
            INSERT INTO projects (id, user_id, name, github_repo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.github_repo)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_project(&row)
    }

    /// Ownership check: returns the project only if `user_id` owns it
    pub async fn get_owned(&self, user_id: &str, project_id: &str) -> StorageResult<Option<Project>> {
        debug!("Fetching project {} for user {}", project_id, user_id);

        let row = sqlx::query("SELECT * FROM projects WHERE id = ? AND user_id = ?")
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_project).transpose()
    }

    /// Delete an owned project; metrics and memory cascade. Returns false when nothing matched.
    ///
    /// Each cascaded metric row is announced as a delete on the change feed
    /// after commit.
    pub async fn delete_owned(&self, user_id: &str, project_id: &str) -> StorageResult<bool> {
        debug!("Deleting project {} for user {}", project_id, user_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let metric_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT m.id FROM agent_metrics m
            JOIN projects p ON p.id = m.project_id
            WHERE p.id = ? AND p.user_id = ?
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for id in metric_ids {
            self.feed.publish(MetricChange::Delete {
                id,
                project_id: project_id.to_string(),
            });
        }

        Ok(true)
    }

    pub async fn mark_synced(&self, project_id: &str, at: DateTime<Utc>) -> StorageResult<()> {
        debug!("Stamping last sync for project {}", project_id);

        let result = sqlx::query("UPDATE projects SET last_synced_at = ? WHERE id = ?")
            .bind(timestamps::encode(at))
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Project".to_string()));
        }

        Ok(())
    }
}

fn row_to_project(row: &SqliteRow) -> StorageResult<Project> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Project {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        github_repo: row.try_get("github_repo")?,
        last_synced_at: timestamps::decode_optional("last_synced_at", row.try_get("last_synced_at")?)?,
        created_at: timestamps::decode("created_at", &created_at)?,
        updated_at: timestamps::decode("updated_at", &updated_at)?,
    })
}
