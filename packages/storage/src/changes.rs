// ABOUTME: In-process broadcast of agent metric row changes
// ABOUTME: Feeds the live metrics stream without a database change log

use agentboard_core::MetricChange;
use tokio::sync::broadcast;
use tracing::debug;

/// Cloneable publisher for metric change events
#[derive(Clone, Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<MetricChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a change; having no subscribers is not an error
    pub fn publish(&self, change: MetricChange) {
        let kind = change.event_name();
        match self.sender.send(change) {
            Ok(receivers) => debug!("Published metric {} to {} subscribers", kind, receivers),
            Err(_) => debug!("Metric {} dropped, no subscribers", kind),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MetricChange> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
