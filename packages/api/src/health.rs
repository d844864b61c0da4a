// ABOUTME: Unauthenticated liveness endpoint

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "agentboard"
    }))
}
