// ABOUTME: Agentboard authentication library
// ABOUTME: Verifies identity-provider session tokens and yields the caller's subject and email

pub mod error;
pub mod session;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use session::{bearer_token, IdentityClaims, SessionVerifier};
