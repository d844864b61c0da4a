// ABOUTME: Timestamp encoding for SQLite text columns
// ABOUTME: Fixed-width RFC 3339 so lexical ordering matches time ordering

use agentboard_core::parse_timestamp;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::StorageError;

pub(crate) fn encode(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode(column: &'static str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    parse_timestamp(value).ok_or_else(|| StorageError::InvalidData {
        column,
        value: value.to_string(),
    })
}

pub(crate) fn decode_optional(
    column: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| decode(column, &v))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encoding_sorts_lexically() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let late = early + chrono::Duration::milliseconds(1500);
        assert!(encode(early) < encode(late));
        assert_eq!(encode(early), "2025-01-01T09:00:00.000000Z");
    }

    #[test]
    fn test_decode_round_trip_and_garbage() {
        let now = Utc::now();
        let decoded = decode("updated_at", &encode(now)).unwrap();
        assert_eq!(decoded.timestamp_micros(), now.timestamp_micros());

        assert!(decode("updated_at", "yesterday").is_err());
        assert_eq!(decode_optional("last_run", None).unwrap(), None);
        assert_eq!(decode_optional("last_run", Some(" ".to_string())).unwrap(), None);
    }
}
