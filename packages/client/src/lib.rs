// ABOUTME: Dashboard-side client for Agentboard
// ABOUTME: REST access, the live metrics view and subscription, and memory log filtering

pub mod api_client;
pub mod error;
pub mod live_view;
pub mod memory_filter;
pub mod subscription;

pub use api_client::{DashboardClient, MemoryFilter, SyncSummary};
pub use error::{ClientError, ClientResult};
pub use live_view::LiveMetricsView;
pub use memory_filter::filter_memories;
pub use subscription::{
    subscribe_metrics, ConnectionStatus, MetricsSnapshot, MetricsSubscription, ReconnectPolicy,
};
