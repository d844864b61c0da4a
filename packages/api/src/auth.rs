// ABOUTME: Authentication context for API requests
// ABOUTME: Verifies the bearer session token and resolves it to an internal user

use agentboard_auth::bearer_token;
use agentboard_core::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Current authenticated user, created on first sight of a new subject
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = bearer_token(header).ok_or(AppError::Unauthorized)?;

        let claims = state.verifier.verify(token).map_err(|e| {
            debug!("Rejected session token: {}", e);
            AppError::Unauthorized
        })?;

        let user = state
            .db
            .user_storage
            .resolve_identity(&claims.sub, claims.email.as_deref())
            .await?;

        Ok(CurrentUser(user))
    }
}
