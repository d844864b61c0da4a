// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Agentboard

// Server
pub const AGENTBOARD_PORT: &str = "AGENTBOARD_PORT";
pub const AGENTBOARD_HOST: &str = "AGENTBOARD_HOST";
pub const PORT: &str = "PORT"; // Legacy

// Storage
pub const AGENTBOARD_DATABASE_PATH: &str = "AGENTBOARD_DATABASE_PATH";

// CORS
pub const AGENTBOARD_CORS_ORIGIN: &str = "AGENTBOARD_CORS_ORIGIN";

// Identity provider
pub const AGENTBOARD_IDENTITY_SECRET: &str = "AGENTBOARD_IDENTITY_SECRET";

// GitHub
pub const AGENTBOARD_GITHUB_API_URL: &str = "AGENTBOARD_GITHUB_API_URL";
pub const AGENTBOARD_HTTP_TIMEOUT_SECS: &str = "AGENTBOARD_HTTP_TIMEOUT_SECS";

// Live metrics
pub const AGENTBOARD_CHANGE_FEED_CAPACITY: &str = "AGENTBOARD_CHANGE_FEED_CAPACITY";

// Client
pub const AGENTBOARD_API_URL: &str = "AGENTBOARD_API_URL";
pub const AGENTBOARD_TOKEN: &str = "AGENTBOARD_TOKEN";

// Defaults
pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHANGE_FEED_CAPACITY: usize = 256;
pub const MAX_CHANGE_FEED_CAPACITY: usize = 65536;
