// ABOUTME: Conversion from raw agent records to metric upserts
// ABOUTME: Applies defaults for missing fields and rejects values that cannot be stored

use agentboard_core::{parse_timestamp, AgentMetricUpsert, Trend};
use agentboard_github::AgentStatRecord;
use serde_json::Value;

pub fn record_to_upsert(agent_name: &str, record: AgentStatRecord) -> Result<AgentMetricUpsert, String> {
    let last_run = match record.last_run.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            parse_timestamp(raw).ok_or_else(|| format!("invalid last_run timestamp '{}'", raw))?,
        ),
    };

    let findings = match record.findings {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value @ Value::Object(_)) => value,
        Some(_) => return Err("findings must be a JSON object".to_string()),
    };

    let mut upsert = AgentMetricUpsert::empty(agent_name);
    upsert.total_runs = record.total_runs.unwrap_or(0);
    upsert.successful_runs = record.successful_runs.unwrap_or(0);
    upsert.failed_runs = record.failed_runs.unwrap_or(0);
    upsert.success_rate = record.success_rate.unwrap_or(0.0);
    upsert.avg_duration_seconds = record.avg_duration_seconds.unwrap_or(0.0);
    upsert.last_run = last_run;
    upsert.findings = findings;
    upsert.trend = Trend::from_optional(record.trend.as_deref());

    Ok(upsert)
}
