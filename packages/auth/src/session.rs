// ABOUTME: HMAC-SHA256 signed session tokens issued by the identity provider
// ABOUTME: Token layout is base64url(claims JSON) "." hex(signature)

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Identity-provider subject id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiry as unix seconds
    pub exp: i64,
}

/// Verifies (and, for local tooling, issues) session tokens with a shared secret
#[derive(Clone)]
pub struct SessionVerifier {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl SessionVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> AuthResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::Configuration(
                "identity secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    pub fn verify(&self, token: &str) -> AuthResult<IdentityClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit clock
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<IdentityClaims> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| AuthError::MalformedToken("missing signature".to_string()))?;

        let signature = hex::decode(signature)
            .map_err(|_| AuthError::MalformedToken("signature is not hex".to_string()))?;

        // Signature first so forged payloads are never parsed
        self.mac(payload.as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::MalformedToken("payload is not base64url".to_string()))?;
        let claims: IdentityClaims = serde_json::from_slice(&json)
            .map_err(|e| AuthError::MalformedToken(format!("invalid claims: {}", e)))?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::MalformedToken("empty subject".to_string()));
        }

        if claims.exp <= now.timestamp() {
            debug!("Rejected expired session for subject {}", claims.sub);
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Issue a token valid for `ttl`, as the identity provider would
    pub fn issue(&self, subject: &str, email: Option<&str>, ttl: Duration) -> AuthResult<String> {
        let claims = IdentityClaims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            exp: (Utc::now() + ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &IdentityClaims) -> AuthResult<String> {
        let json = serde_json::to_vec(claims)
            .map_err(|e| AuthError::MalformedToken(format!("invalid claims: {}", e)))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = hex::encode(self.mac(payload.as_bytes())?.finalize().into_bytes());
        Ok(format!("{}.{}", payload, signature))
    }

    fn mac(&self, payload: &[u8]) -> AuthResult<HmacSha256> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|e| AuthError::Configuration(format!("invalid identity secret: {}", e)))?;
        mac.update(payload);
        Ok(mac)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn verifier() -> SessionVerifier {
        SessionVerifier::new("test-secret").unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let verifier = verifier();
        let token = verifier
            .issue("idp|42", Some("dev@example.com"), Duration::hours(1))
            .unwrap();

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "idp|42");
        assert_eq!(claims.email.as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn test_rejects_bad_signature() {
        let token = verifier().issue("idp|42", None, Duration::hours(1)).unwrap();
        let other = SessionVerifier::new("other-secret").unwrap();

        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let verifier = verifier();
        let token = verifier.issue("idp|42", None, Duration::hours(1)).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged_claims = IdentityClaims {
            sub: "idp|admin".to_string(),
            email: None,
            exp: i64::MAX,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);

        assert_eq!(verifier.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_rejects_expired() {
        let verifier = verifier();
        let token = verifier
            .sign(&IdentityClaims {
                sub: "idp|42".to_string(),
                email: None,
                exp: 1_000,
            })
            .unwrap();

        assert_eq!(verifier.verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_rejects_malformed() {
        let verifier = verifier();
        assert_eq!(verifier.verify(""), Err(AuthError::MissingToken));
        assert!(matches!(
            verifier.verify("no-dot"),
            Err(AuthError::MalformedToken(_))
        ));
        assert!(matches!(
            verifier.verify("abc.zz"),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SessionVerifier::new(""),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let output = format!("{:?}", verifier());
        assert!(!output.contains("test-secret"));
    }
}
