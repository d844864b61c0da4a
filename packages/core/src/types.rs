// ABOUTME: Domain types shared by storage, API, and client packages
// ABOUTME: Users, projects, agent metrics, memory entries, and metric change events

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::MEMORY_QUERY_LIMIT;

/// Internal user row, keyed by the identity provider's subject id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub subject: String,
    pub email: String,
    pub github_username: Option<String>,
    #[serde(skip_serializing, default)]
    pub github_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_github_token(&self) -> bool {
        self.github_token
            .as_deref()
            .map(|token| !token.trim().is_empty())
            .unwrap_or(false)
    }
}

/// User view safe to return from the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaskedUser {
    pub id: String,
    pub email: String,
    pub github_username: Option<String>,
    pub github_connected: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for MaskedUser {
    fn from(user: User) -> Self {
        let github_connected = user.has_github_token();
        Self {
            id: user.id,
            email: user.email,
            github_username: user.github_username,
            github_connected,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub github_repo: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCreateInput {
    pub name: String,
    pub github_repo: Option<String>,
}

/// Direction an agent's performance is heading, computed upstream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    #[default]
    Stable,
    Regressing,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Regressing => "regressing",
        }
    }

    /// Arrow used by the dashboard cards
    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::Improving => "↑",
            Trend::Stable => "→",
            Trend::Regressing => "↓",
        }
    }

    /// Missing or unrecognised values fall back to `Stable`
    pub fn from_optional(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "improving" => Ok(Trend::Improving),
            "stable" => Ok(Trend::Stable),
            "regressing" => Ok(Trend::Regressing),
            other => Err(format!("Unknown trend: {}", other)),
        }
    }
}

/// Stored per-agent statistics for a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentMetric {
    pub id: String,
    pub project_id: String,
    pub agent_name: String,
    pub total_runs: i64,
    pub successful_runs: i64,
    pub failed_runs: i64,
    pub success_rate: f64,
    pub avg_duration_seconds: f64,
    pub last_run: Option<DateTime<Utc>>,
    pub findings: Value,
    pub trend: Trend,
    pub updated_at: DateTime<Utc>,
}

/// Values written for one agent during a sync, keyed by (project, agent_name)
#[derive(Debug, Clone, PartialEq)]
pub struct AgentMetricUpsert {
    pub agent_name: String,
    pub total_runs: i64,
    pub successful_runs: i64,
    pub failed_runs: i64,
    pub success_rate: f64,
    pub avg_duration_seconds: f64,
    pub last_run: Option<DateTime<Utc>>,
    pub findings: Value,
    pub trend: Trend,
}

impl AgentMetricUpsert {
    /// Zeroed record for an agent, used as the base for partial inputs
    pub fn empty(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            total_runs: 0,
            successful_runs: 0,
            failed_runs: 0,
            success_rate: 0.0,
            avg_duration_seconds: 0.0,
            last_run: None,
            findings: Value::Object(Default::default()),
            trend: Trend::Stable,
        }
    }
}

/// Append-only observation recorded by an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEntry {
    pub id: String,
    pub project_id: String,
    pub entity_name: String,
    pub entity_type: String,
    pub observation: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEntryInput {
    pub entity_name: String,
    pub entity_type: String,
    pub observation: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Server-side narrowing of a memory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryQuery {
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub limit: usize,
}

impl Default for MemoryQuery {
    fn default() -> Self {
        Self {
            entity_name: None,
            entity_type: None,
            limit: MEMORY_QUERY_LIMIT,
        }
    }
}

/// Row-level change to the agent metrics table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetricChange {
    Insert { record: AgentMetric },
    Update { record: AgentMetric },
    Delete { id: String, project_id: String },
}

impl MetricChange {
    pub fn project_id(&self) -> &str {
        match self {
            MetricChange::Insert { record } | MetricChange::Update { record } => {
                &record.project_id
            }
            MetricChange::Delete { project_id, .. } => project_id,
        }
    }

    /// Event name used on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            MetricChange::Insert { .. } => "insert",
            MetricChange::Update { .. } => "update",
            MetricChange::Delete { .. } => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(token: Option<&str>) -> User {
        User {
            id: "user-1".to_string(),
            subject: "idp|123".to_string(),
            email: "dev@example.com".to_string(),
            github_username: Some("octocat".to_string()),
            github_token: token.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_trend_parsing_falls_back_to_stable() {
        assert_eq!(Trend::from_optional(Some("improving")), Trend::Improving);
        assert_eq!(Trend::from_optional(Some("REGRESSING")), Trend::Regressing);
        assert_eq!(Trend::from_optional(Some("sideways")), Trend::Stable);
        assert_eq!(Trend::from_optional(None), Trend::Stable);
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        let json = serde_json::to_string(&Trend::Regressing).unwrap();
        assert_eq!(json, "\"regressing\"");
    }

    #[test]
    fn test_user_token_never_serialized() {
        let user = sample_user(Some("ghp_secret"));
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("ghp_secret"));
        assert!(!json.contains("github_token"));
    }

    #[test]
    fn test_masked_user_reports_connection() {
        let masked: MaskedUser = sample_user(Some("ghp_secret")).into();
        assert!(masked.github_connected);

        let masked: MaskedUser = sample_user(Some("  ")).into();
        assert!(!masked.github_connected);

        let masked: MaskedUser = sample_user(None).into();
        assert!(!masked.github_connected);
    }

    #[test]
    fn test_metric_change_wire_format() {
        let change = MetricChange::Delete {
            id: "m-1".to_string(),
            project_id: "p-1".to_string(),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["type"], "delete");
        assert_eq!(json["id"], "m-1");
        assert_eq!(change.project_id(), "p-1");
        assert_eq!(change.event_name(), "delete");
    }
}
