// ABOUTME: Shared helpers for client-side CLI commands
// ABOUTME: Builds an authenticated dashboard client from flags or the environment

use agentboard_client::DashboardClient;
use agentboard_config::constants::{AGENTBOARD_API_URL, AGENTBOARD_TOKEN, DEFAULT_PORT};
use anyhow::{anyhow, Context};

#[derive(clap::Args, Clone, Debug)]
pub struct ServerArgs {
    /// Server base URL (defaults to AGENTBOARD_API_URL or the local server)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session token (defaults to AGENTBOARD_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,
}

impl ServerArgs {
    pub fn client(&self) -> anyhow::Result<DashboardClient> {
        let api_url = self
            .api_url
            .clone()
            .or_else(|| std::env::var(AGENTBOARD_API_URL).ok())
            .unwrap_or_else(|| format!("http://localhost:{}", DEFAULT_PORT));

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var(AGENTBOARD_TOKEN).ok())
            .ok_or_else(|| {
                anyhow!(
                    "no session token; pass --token or set {} (see `agentboard token`)",
                    AGENTBOARD_TOKEN
                )
            })?;

        DashboardClient::new(api_url, token).context("failed to build API client")
    }
}
