// ABOUTME: Persistence layer for Agentboard built on SQLite
// ABOUTME: Users, projects, agent metrics, memory entries, and the metric change feed

pub mod changes;
pub mod db;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod projects;
mod timestamps;
pub mod users;

pub use changes::ChangeFeed;
pub use db::DbState;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use metrics::MetricsStorage;
pub use projects::ProjectStorage;
pub use users::UserStorage;
