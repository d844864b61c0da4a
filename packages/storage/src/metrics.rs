// ABOUTME: Agent metrics storage keyed by (project, agent name)
// ABOUTME: Upserts publish insert/update events on the change feed

use agentboard_core::{generate_id, AgentMetric, AgentMetricUpsert, MetricChange, Trend};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use crate::changes::ChangeFeed;
use crate::error::{StorageError, StorageResult};
use crate::timestamps;

pub struct MetricsStorage {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl MetricsStorage {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        Self { pool, feed }
    }

    /// All metrics for a project, ordered by agent name
    pub async fn list_for_project(&self, project_id: &str) -> StorageResult<Vec<AgentMetric>> {
        debug!("Listing metrics for project: {}", project_id);

        let rows = sqlx::query("SELECT * FROM agent_metrics WHERE project_id = ? ORDER BY agent_name ASC")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_metric).collect()
    }

    /// Insert or overwrite the row for (project_id, agent_name).
    ///
    /// The row id is stable across updates. The matching change event is
    /// published after commit.
    pub async fn upsert(&self, project_id: &str, input: &AgentMetricUpsert) -> StorageResult<AgentMetric> {
        debug!("Upserting metrics for agent {} in project {}", input.agent_name, project_id);

        let findings = serde_json::to_string(&input.findings)?;
        let last_run = input.last_run.map(timestamps::encode);
        let now = timestamps::encode(Utc::now());

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM agent_metrics WHERE project_id = ? AND agent_name = ?",
        )
        .bind(project_id)
        .bind(&input.agent_name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        let row = sqlx::query(
            r#"
            INSERT INTO agent_metrics (
                id, project_id, agent_name, total_runs, successful_runs, failed_runs,
                success_rate, avg_duration_seconds, last_run, findings, trend, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(project_id, agent_name) DO UPDATE SET
                total_runs = excluded.total_runs,
                successful_runs = excluded.successful_runs,
                failed_runs = excluded.failed_runs,
                success_rate = excluded.success_rate,
                avg_duration_seconds = excluded.avg_duration_seconds,
                last_run = excluded.last_run,
                findings = excluded.findings,
                trend = excluded.trend,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(generate_id())
        .bind(project_id)
        .bind(&input.agent_name)
        .bind(input.total_runs)
        .bind(input.successful_runs)
        .bind(input.failed_runs)
        .bind(input.success_rate)
        .bind(input.avg_duration_seconds)
        .bind(last_run)
        .bind(findings)
        .bind(input.trend.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        let record = row_to_metric(&row)?;
        tx.commit().await.map_err(StorageError::Sqlx)?;

        let change = if existing.is_some() {
            MetricChange::Update { record: record.clone() }
        } else {
            MetricChange::Insert { record: record.clone() }
        };
        self.feed.publish(change);

        Ok(record)
    }

    pub async fn delete(&self, project_id: &str, metric_id: &str) -> StorageResult<bool> {
        debug!("Deleting metric {} from project {}", metric_id, project_id);

        let result = sqlx::query("DELETE FROM agent_metrics WHERE id = ? AND project_id = ?")
            .bind(metric_id)
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.feed.publish(MetricChange::Delete {
                id: metric_id.to_string(),
                project_id: project_id.to_string(),
            });
        }

        Ok(deleted)
    }

    pub fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

fn row_to_metric(row: &SqliteRow) -> StorageResult<AgentMetric> {
    let findings: String = row.try_get("findings")?;
    let trend: String = row.try_get("trend")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(AgentMetric {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        agent_name: row.try_get("agent_name")?,
        total_runs: row.try_get("total_runs")?,
        successful_runs: row.try_get("successful_runs")?,
        failed_runs: row.try_get("failed_runs")?,
        success_rate: row.try_get("success_rate")?,
        avg_duration_seconds: row.try_get("avg_duration_seconds")?,
        last_run: timestamps::decode_optional("last_run", row.try_get("last_run")?)?,
        findings: serde_json::from_str(&findings)?,
        trend: trend.parse::<Trend>().map_err(|_| StorageError::InvalidData {
            column: "trend",
            value: trend.clone(),
        })?,
        updated_at: timestamps::decode("updated_at", &updated_at)?,
    })
}
