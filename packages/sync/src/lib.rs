// ABOUTME: Metrics synchronization for Agentboard projects
// ABOUTME: Fetches agent stats for a project's repository and reconciles stored rows

pub mod convert;
pub mod error;
pub mod synchronizer;

pub use convert::record_to_upsert;
pub use error::SyncError;
pub use synchronizer::{MetricsSynchronizer, SyncReport};
