// ABOUTME: GitHub integration for Agentboard
// ABOUTME: Reads .claude/ agent metrics from repositories through the REST contents API

pub mod client;
pub mod error;
pub mod types;

pub use client::{GitHubClient, MetricsSource};
pub use error::{GitHubError, GitHubResult};
pub use types::{AgentStatRecord, AgentStats, RepoInfo, RepoSummary, StatsMetadata};
