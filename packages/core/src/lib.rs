// ABOUTME: Core types, validation, and utilities for Agentboard
// ABOUTME: Foundational package shared by storage, API, client, and CLI packages

pub mod constants;
pub mod format;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    AgentMetric, AgentMetricUpsert, MaskedUser, MemoryEntry, MemoryEntryInput, MemoryQuery,
    MetricChange, Project, ProjectCreateInput, Trend, User,
};

// Re-export constants
pub use constants::{
    agentboard_dir, default_database_path, CLAUDE_DIR, MAX_PROJECT_NAME_LEN, MEMORY_QUERY_LIMIT,
    METRICS_FILE_PATH,
};

// Re-export utilities
pub use format::{format_duration, format_percentage, SuccessBand};
pub use utils::{generate_id, parse_timestamp};

// Re-export validation
pub use validation::{
    is_valid_repo_slug, parse_repo_slug, truncate, validate_project_input, RepoSlug,
    ValidationError,
};
