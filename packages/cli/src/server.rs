// ABOUTME: HTTP server assembly and startup
// ABOUTME: Builds shared state from config and layers CORS, tracing, and panic recovery onto the router

use std::sync::Arc;
use std::time::Duration;

use agentboard_api::{create_router, AppState};
use agentboard_auth::SessionVerifier;
use agentboard_config::Config;
use agentboard_github::GitHubClient;
use agentboard_storage::DbState;
use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::middleware::create_panic_handler;

/// Install the global tracing subscriber, honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Build application state from configuration
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db = DbState::init_with_path(Some(config.database_path.clone()), config.change_feed_capacity)
        .await
        .context("failed to open database")?;

    let github = GitHubClient::new(
        config.github_api_url.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )
    .context("failed to build GitHub client")?;

    let verifier = SessionVerifier::new(&config.identity_secret)
        .context("invalid identity secret")?;

    Ok(AppState::new(db, Arc::new(github), verifier))
}

/// Router with the server-wide layers applied
pub fn build_app(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    Ok(create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(create_panic_handler()))
}

/// Start the server and run until Ctrl-C
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = build_app(state, &config.cors_origin)?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Agentboard API listening on http://{}", addr);
    info!("CORS origin: {}", config.cors_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
