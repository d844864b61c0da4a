// ABOUTME: Append-only storage for agent memory observations
// ABOUTME: Bounded newest-first listing with optional exact-match filters

use agentboard_core::{generate_id, MemoryEntry, MemoryEntryInput, MemoryQuery, ValidationError};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::timestamps;

pub struct MemoryStorage {
    pool: SqlitePool,
}

impl MemoryStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest entries for a project, capped at `query.limit`
    pub async fn list(&self, project_id: &str, query: &MemoryQuery) -> StorageResult<Vec<MemoryEntry>> {
        debug!("Listing memory for project {} ({:?})", project_id, query);

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM memory_entries WHERE project_id = ");
        builder.push_bind(project_id);

        if let Some(name) = query.entity_name.as_deref().filter(|v| !v.is_empty()) {
            builder.push(" AND entity_name = ");
            builder.push_bind(name);
        }
        if let Some(kind) = query.entity_type.as_deref().filter(|v| !v.is_empty()) {
            builder.push(" AND entity_type = ");
            builder.push_bind(kind);
        }

        builder.push(" ORDER BY created_at DESC, rowid DESC LIMIT ");
        builder.push_bind(query.limit as i64);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_entry).collect()
    }

    pub async fn append(&self, project_id: &str, input: MemoryEntryInput) -> StorageResult<MemoryEntry> {
        for (field, value) in [
            ("entity_name", &input.entity_name),
            ("entity_type", &input.entity_type),
            ("observation", &input.observation),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Missing(format!("{} is required", field)).into());
            }
        }

        let metadata = input
            .metadata
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        if !metadata.is_object() {
            return Err(ValidationError::InvalidFormat("metadata must be a JSON object".to_string()).into());
        }

        debug!("Appending memory for {} in project {}", input.entity_name, project_id);

        let row = sqlx::query(
            r#"
            INSERT INTO memory_entries (id, project_id, entity_name, entity_type, observation, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(generate_id())
        .bind(project_id)
        .bind(input.entity_name.trim())
        .bind(input.entity_type.trim())
        .bind(&input.observation)
        .bind(serde_json::to_string(&metadata)?)
        .bind(timestamps::encode(Utc::now()))
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_entry(&row)
    }
}

fn row_to_entry(row: &SqliteRow) -> StorageResult<MemoryEntry> {
    let metadata: String = row.try_get("metadata")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(MemoryEntry {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        entity_name: row.try_get("entity_name")?,
        entity_type: row.try_get("entity_type")?,
        observation: row.try_get("observation")?,
        metadata: serde_json::from_str(&metadata)?,
        created_at: timestamps::decode("created_at", &created_at)?,
    })
}
