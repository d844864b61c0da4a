// ABOUTME: Shared application state handed to the router
// ABOUTME: Bundles storage, the synchronizer, and the session verifier

use std::sync::Arc;

use agentboard_auth::SessionVerifier;
use agentboard_github::MetricsSource;
use agentboard_storage::DbState;
use agentboard_sync::MetricsSynchronizer;

#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub synchronizer: MetricsSynchronizer,
    pub verifier: SessionVerifier,
}

impl AppState {
    pub fn new(db: DbState, source: Arc<dyn MetricsSource>, verifier: SessionVerifier) -> Self {
        let synchronizer = MetricsSynchronizer::new(db.clone(), source);
        Self {
            db,
            synchronizer,
            verifier,
        }
    }
}
