// ABOUTME: Wire types for the metrics file and GitHub repository responses
// ABOUTME: Agent records stay raw JSON until each one is converted on its own

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contents of `.claude/metrics/agent-stats.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    #[serde(default)]
    pub metadata: Option<StatsMetadata>,
    /// Agent name to its raw record, in name order
    #[serde(default)]
    pub agents: BTreeMap<String, Value>,
}

impl AgentStats {
    /// Decode each agent record independently so one bad entry does not hide the rest
    pub fn records(&self) -> impl Iterator<Item = (&str, Result<AgentStatRecord, serde_json::Error>)> {
        self.agents
            .iter()
            .map(|(name, raw)| (name.as_str(), serde_json::from_value(raw.clone())))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsMetadata {
    pub version: Option<String>,
    pub last_updated: Option<String>,
    pub description: Option<String>,
}

/// One agent's statistics as written by agent tooling; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStatRecord {
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub total_runs: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub successful_runs: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub failed_runs: Option<i64>,
    pub success_rate: Option<f64>,
    pub avg_duration_seconds: Option<f64>,
    pub last_run: Option<String>,
    pub findings: Option<Value>,
    pub trend: Option<String>,
}

/// Run counts as integers or whole-valued floats (`5` or `5.0`)
fn deserialize_optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a whole number or null")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(value)
                .map(Some)
                .map_err(|_| E::custom("count out of range"))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(E::custom(format!("count must be a whole number, got {}", value)));
            }
            if value < i64::MIN as f64 || value >= i64::MAX as f64 {
                return Err(E::custom("count out of range"));
            }
            Ok(Some(value as i64))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

/// Metadata for a single repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub private: bool,
    pub updated_at: Option<String>,
    pub language: Option<String>,
}

/// Entry in the authenticated user's repository listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub updated_at: Option<String>,
}

/// Subset of a contents API file response
#[derive(Debug, Deserialize)]
pub(crate) struct ContentFile {
    pub content: Option<String>,
    pub encoding: Option<String>,
}
