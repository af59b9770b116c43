//! Credential broker.
//!
//! Turns the configured [`ConnectionRef`](crate::types::ConnectionRef) into a
//! live OAuth2 [`Credential`] by reading the vault on every call.
//!
//! ```text
//!  tool call ──▶ CredentialSource::resolve
//!                    │
//!                    ├─ GET {vault}/connection/{id}?refresh_token=true
//!                    ├─ build Credential (token endpoint + scopes)
//!                    └─ expired? ── refresh_token ──▶ POST token endpoint
//!                                └─ none ──────────▶ AuthError::Unrefreshable
//! ```
//!
//! There is no cache: each invocation re-reads the vault and drops the
//! credential when done.

pub mod broker;
pub mod credential;

pub use broker::{VaultBroker, CALENDAR_SCOPE, GOOGLE_TOKEN_ENDPOINT};
pub use credential::{Credential, TokenResponse};

use async_trait::async_trait;

use crate::error::AuthError;

/// Anything that can hand out a live credential for one call.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Resolve a credential whose expiry is in the future.
    async fn resolve(&self) -> Result<Credential, AuthError>;
}

/// Source that always returns the same credential.
///
/// Useful when the caller already holds a token.
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(credential: Credential) -> Self {
        Self(credential)
    }
}

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn resolve(&self) -> Result<Credential, AuthError> {
        if self.0.is_expired() {
            return Err(AuthError::Unrefreshable);
        }
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn credential(expiry: chrono::DateTime<Utc>) -> Credential {
        Credential::new("token", None, GOOGLE_TOKEN_ENDPOINT, None, None, Vec::new(), expiry)
    }

    #[tokio::test]
    async fn test_static_credential_resolves() {
        let source = StaticCredential::new(credential(Utc::now() + Duration::hours(1)));
        let cred = source.resolve().await.unwrap();
        assert_eq!(cred.access_token(), "token");
    }

    #[tokio::test]
    async fn test_static_credential_expired() {
        let source = StaticCredential::new(credential(Utc::now() - Duration::hours(1)));
        assert!(matches!(source.resolve().await, Err(AuthError::Unrefreshable)));
    }
}
