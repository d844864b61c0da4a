// ABOUTME: Server configuration loaded from the environment
// ABOUTME: Builds the explicit Config struct handed to the API at startup

pub mod constants;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use constants::*;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub cors_origin: String,
    pub identity_secret: String,
    pub github_api_url: String,
    pub http_timeout_secs: u64,
    pub change_feed_capacity: usize,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get(AGENTBOARD_PORT).or_else(|| get(PORT)) {
            Some(raw) => raw.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host_raw = get(AGENTBOARD_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host_raw
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_raw.clone()))?;

        let database_path = get(AGENTBOARD_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(agentboard_core::default_database_path);

        let cors_origin =
            get(AGENTBOARD_CORS_ORIGIN).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let identity_secret =
            get(AGENTBOARD_IDENTITY_SECRET).ok_or(ConfigError::Missing(AGENTBOARD_IDENTITY_SECRET))?;

        let github_api_url = get(AGENTBOARD_GITHUB_API_URL)
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let http_timeout_secs = match get(AGENTBOARD_HTTP_TIMEOUT_SECS) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|&v| v > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: AGENTBOARD_HTTP_TIMEOUT_SECS,
                    value: raw,
                })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let change_feed_capacity = match get(AGENTBOARD_CHANGE_FEED_CAPACITY) {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|&v| v > 0 && v <= MAX_CHANGE_FEED_CAPACITY)
                .ok_or(ConfigError::InvalidValue {
                    name: AGENTBOARD_CHANGE_FEED_CAPACITY,
                    value: raw,
                })?,
            None => DEFAULT_CHANGE_FEED_CAPACITY,
        };

        let config = Config {
            host,
            port,
            database_path,
            cors_origin,
            identity_secret,
            github_api_url,
            http_timeout_secs,
            change_feed_capacity,
        };

        debug!(
            port = config.port,
            database = %config.database_path.display(),
            github_api_url = %config.github_api_url,
            "Configuration loaded"
        );

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
