// ABOUTME: Shared constants and well-known paths for Agentboard
// ABOUTME: Metrics file location, query limits, and the local data directory

use std::env;
use std::path::PathBuf;

/// Directory inside a connected repository that holds agent data
pub const CLAUDE_DIR: &str = ".claude";

/// Path of the agent metrics file inside a connected repository
pub const METRICS_FILE_PATH: &str = ".claude/metrics/agent-stats.json";

/// Maximum number of memory entries returned by a single query
pub const MEMORY_QUERY_LIMIT: usize = 100;

/// Maximum length of a project display name (in characters)
pub const MAX_PROJECT_NAME_LEN: usize = 200;

/// Get the path to the Agentboard data directory (~/.agentboard)
pub fn agentboard_dir() -> PathBuf {
    // HOME first so tests can redirect it
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".agentboard")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".agentboard")
    }
}

/// Default location of the SQLite database
pub fn default_database_path() -> PathBuf {
    agentboard_dir().join("agentboard.db")
}
