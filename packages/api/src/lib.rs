// ABOUTME: HTTP API layer for Agentboard providing REST endpoints and routing
// ABOUTME: Projects, metrics (snapshot and live stream), memory logs, and the current user

use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod auth;
pub mod error;
pub mod guard;
pub mod health;
pub mod memory_handlers;
pub mod metrics_handlers;
pub mod projects_handlers;
pub mod sse;
pub mod state;
pub mod users_handlers;

pub use error::{ApiResult, AppError};
pub use state::AppState;

/// Creates the full `/api` router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/projects", create_projects_router())
        .nest("/api/metrics", create_metrics_router())
        .route("/api/memory", get(memory_handlers::list_memories))
        .nest("/api/users", create_users_router())
        .with_state(state)
}

pub fn create_projects_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects_handlers::list_projects).post(projects_handlers::create_project),
        )
        .route("/{id}", delete(projects_handlers::delete_project))
        .route("/{id}/sync", post(projects_handlers::sync_project))
}

pub fn create_metrics_router() -> Router<AppState> {
    Router::new()
        .route("/", get(metrics_handlers::list_metrics))
        .route("/stream", get(metrics_handlers::stream_metrics))
}

pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users_handlers::get_current_user))
        .route(
            "/me/github",
            put(users_handlers::connect_github).delete(users_handlers::disconnect_github),
        )
}
