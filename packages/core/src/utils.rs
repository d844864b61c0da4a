// ABOUTME: Shared utility functions for Agentboard
// ABOUTME: Identifier generation and lenient timestamp parsing

use chrono::{DateTime, NaiveDateTime, Utc};

/// Generate a new row identifier
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse a timestamp written by agent tooling.
///
/// Accepts RFC 3339 (any offset) and naive ISO-8601 values, which are
/// interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
