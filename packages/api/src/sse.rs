// ABOUTME: Server-Sent Events helpers for the live metrics stream
// ABOUTME: Standard keep-alive, JSON event construction, and change-to-event mapping

use std::convert::Infallible;
use std::time::Duration;

use agentboard_core::MetricChange;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use tracing::warn;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Helper to create SSE response with standard keep-alive settings
pub fn create_sse_response<S>(stream: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

/// Helper to create an SSE event from JSON-serializable data
pub fn create_sse_event<T: serde::Serialize>(
    event_type: &str,
    data: &T,
) -> Result<Event, serde_json::Error> {
    let json_data = serde_json::to_string(data)?;

    Ok(Event::default().event(event_type).data(json_data))
}

pub fn create_error_event(error_message: &str) -> Event {
    Event::default()
        .event("error")
        .data(json!({ "error": error_message }).to_string())
}

/// Tells the subscriber it missed events and must re-seed
pub fn create_resync_event(missed: u64) -> Event {
    Event::default()
        .event("resync")
        .data(json!({ "missed": missed }).to_string())
}

/// Wire form of a metric change: the full row for insert/update, the id for delete
pub fn change_event(change: &MetricChange) -> Event {
    let result = match change {
        MetricChange::Insert { record } | MetricChange::Update { record } => {
            create_sse_event(change.event_name(), record)
        }
        MetricChange::Delete { id, .. } => create_sse_event(change.event_name(), &json!({ "id": id })),
    };

    result.unwrap_or_else(|e| {
        warn!("Failed to serialize metric change: {}", e);
        create_error_event("Failed to serialize metric change")
    })
}
