// ABOUTME: Live metrics subscription with reconnect-and-resync
// ABOUTME: Seeds from REST, applies SSE change events, and publishes snapshots on a watch channel

use std::io;
use std::time::Duration;

use agentboard_core::{AgentMetric, MetricChange};
use futures::{Stream, StreamExt};
use rand::Rng;
use serde::Deserialize;
use sse_stream::SseStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api_client::DashboardClient;
use crate::error::{ClientError, ClientResult};
use crate::live_view::LiveMetricsView;

/// Exponential backoff between reconnect attempts
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of the delay randomly added or removed, 0.0..=1.0
    pub jitter: f64,
    /// A stream that delivers no bytes for this long is treated as dropped.
    /// The server sends a keep-alive comment every 15 seconds.
    pub idle_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.2,
            idle_timeout: Duration::from_secs(45),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt.min(32) as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let jitter = self.jitter.clamp(0.0, 1.0);
        let factor = if jitter > 0.0 {
            rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter))
        } else {
            1.0
        };

        Duration::from_secs_f64((capped * factor).min(self.max_delay.as_secs_f64()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connecting,
    Live,
    Reconnecting { attempt: u32 },
    /// Terminal; the subscription will not retry
    Ended(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub metrics: Vec<AgentMetric>,
    pub status: ConnectionStatus,
}

/// Handle to a running subscription; dropping it stops the background task
pub struct MetricsSubscription {
    receiver: watch::Receiver<MetricsSnapshot>,
    task: JoinHandle<()>,
}

impl MetricsSubscription {
    /// A receiver that observes every published snapshot
    pub fn snapshots(&self) -> watch::Receiver<MetricsSnapshot> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> MetricsSnapshot {
        self.receiver.borrow().clone()
    }

    /// Stop the subscription, e.g. when the view is torn down or the project changes
    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for MetricsSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start following live metrics for a project.
///
/// Must be called inside a tokio runtime.
pub fn subscribe_metrics(
    client: DashboardClient,
    project_id: impl Into<String>,
    policy: ReconnectPolicy,
) -> MetricsSubscription {
    let project_id = project_id.into();
    let (sender, receiver) = watch::channel(MetricsSnapshot {
        metrics: Vec::new(),
        status: ConnectionStatus::Connecting,
    });

    let task = tokio::spawn(run(client, project_id, policy, sender));
    MetricsSubscription { receiver, task }
}

async fn run(
    client: DashboardClient,
    project_id: String,
    policy: ReconnectPolicy,
    sender: watch::Sender<MetricsSnapshot>,
) {
    let mut view = LiveMetricsView::new(project_id.clone());
    let mut attempt: u32 = 0;

    loop {
        match follow(&client, &mut view, &sender, &mut attempt, policy.idle_timeout).await {
            Ok(()) => debug!("Metrics stream for project {} closed", project_id),
            Err(e) if e.is_terminal() => {
                warn!("Metrics subscription for project {} ended: {}", project_id, e);
                publish(&sender, &view, ConnectionStatus::Ended(e.to_string()));
                return;
            }
            Err(e) => warn!("Metrics stream for project {} failed: {}", project_id, e),
        }

        if sender.is_closed() {
            return;
        }

        let delay = policy.delay_for(attempt);
        attempt = attempt.saturating_add(1);
        publish(&sender, &view, ConnectionStatus::Reconnecting { attempt });
        debug!("Reconnecting to project {} in {:?}", project_id, delay);
        tokio::time::sleep(delay).await;
    }
}

/// One connection: open the stream, seed, then apply events until it closes
async fn follow(
    client: &DashboardClient,
    view: &mut LiveMetricsView,
    sender: &watch::Sender<MetricsSnapshot>,
    attempt: &mut u32,
    idle_timeout: Duration,
) -> ClientResult<()> {
    let project_id = view.project_id().to_string();

    // Stream first: the server buffers changes from the moment it responds
    let response = client.open_metrics_stream(&project_id).await?;
    view.seed(client.list_metrics(&project_id).await?);
    *attempt = 0;
    publish(sender, view, ConnectionStatus::Live);
    info!("Following metrics for project {}", project_id);

    let bytes = Box::pin(response.bytes_stream());
    let mut stream = SseStream::from_byte_stream(with_idle_timeout(bytes, idle_timeout));
    while let Some(item) = stream.next().await {
        let event = item.map_err(|e| ClientError::Network(e.to_string()))?;
        let Some(data) = event.data else {
            continue;
        };

        match decode_event(event.event.as_deref(), &data, &project_id) {
            Ok(Some(StreamEvent::Change(change))) => {
                if view.apply(&change) {
                    publish(sender, view, ConnectionStatus::Live);
                }
            }
            Ok(Some(StreamEvent::Resync)) => {
                info!("Re-seeding metrics for project {} after missed events", project_id);
                view.seed(client.list_metrics(&project_id).await?);
                publish(sender, view, ConnectionStatus::Live);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring malformed metrics event: {}", e),
        }
    }

    Ok(())
}

/// Fail the byte stream when no chunk arrives within `idle`
fn with_idle_timeout<S, T, E>(
    bytes: S,
    idle: Duration,
) -> impl Stream<Item = Result<T, io::Error>> + Send + Unpin + 'static
where
    S: Stream<Item = Result<T, E>> + Send + Unpin + 'static,
    T: Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Box::pin(futures::stream::unfold(Some(bytes), move |state| async move {
        let mut bytes = state?;
        match tokio::time::timeout(idle, bytes.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(bytes))),
            Ok(Some(Err(e))) => Some((Err(io::Error::other(e)), Some(bytes))),
            Ok(None) => None,
            Err(_) => Some((
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no data from metrics stream for {:?}", idle),
                )),
                None,
            )),
        }
    }))
}

fn publish(sender: &watch::Sender<MetricsSnapshot>, view: &LiveMetricsView, status: ConnectionStatus) {
    sender.send_replace(MetricsSnapshot {
        metrics: view.metrics().to_vec(),
        status,
    });
}

#[derive(Debug, PartialEq)]
enum StreamEvent {
    Change(MetricChange),
    Resync,
}

#[derive(Deserialize)]
struct DeletedRow {
    id: String,
}

fn decode_event(
    name: Option<&str>,
    data: &str,
    project_id: &str,
) -> Result<Option<StreamEvent>, serde_json::Error> {
    let event = match name.unwrap_or("message") {
        "insert" => StreamEvent::Change(MetricChange::Insert {
            record: serde_json::from_str(data)?,
        }),
        "update" => StreamEvent::Change(MetricChange::Update {
            record: serde_json::from_str(data)?,
        }),
        "delete" => {
            let row: DeletedRow = serde_json::from_str(data)?;
            StreamEvent::Change(MetricChange::Delete {
                id: row.id,
                project_id: project_id.to_string(),
            })
        }
        "resync" => StreamEvent::Resync,
        "error" => {
            warn!("Server reported stream error: {}", data);
            return Ok(None);
        }
        other => {
            debug!("Ignoring metrics event {}", other);
            return Ok(None);
        }
    };
    Ok(Some(event))
}
