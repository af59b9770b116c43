//! Refreshable OAuth2 credential.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::AuthError;

/// Tokens are treated as expired this long before their real expiry.
pub const EXPIRY_SKEW_SECONDS: i64 = 10;

/// Lifetime assumed when neither the vault nor the token endpoint reports one.
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// A live OAuth2 credential for one tool invocation.
///
/// Owned by a single call: fetched, used, dropped. Refreshing consumes the
/// value and returns a new one, so a stale access token can never be reused.
#[derive(Clone)]
pub struct Credential {
    access_token: String,
    refresh_token: Option<String>,
    token_endpoint: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    scopes: Vec<String>,
    expiry: DateTime<Utc>,
}

/// Body returned by the token endpoint for a refresh grant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Credential {
    /// Create a credential from its parts.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        token_endpoint: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        scopes: Vec<String>,
        expiry: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            token_endpoint: token_endpoint.into(),
            client_id,
            client_secret,
            scopes,
            expiry,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Whether the access token must be refreshed before use at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECONDS) >= self.expiry
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Client id and secret needed for a refresh grant.
    pub fn client_credentials(&self) -> Result<(&str, &str), AuthError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
            _ => Err(AuthError::RefreshFailed(
                "vault payload has no client_id/client_secret for the refresh grant".to_string(),
            )),
        }
    }

    /// Replace the access token and expiry with the result of a refresh grant.
    ///
    /// Fails if the new token is already expired at `now`.
    pub fn refreshed(mut self, response: TokenResponse, now: DateTime<Utc>) -> Result<Self, AuthError> {
        if response.access_token.is_empty() {
            return Err(AuthError::RefreshFailed(
                "token endpoint returned an empty access_token".to_string(),
            ));
        }

        let lifetime = response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECONDS);
        self.expiry = expiry_after(now, lifetime).ok_or_else(|| {
            AuthError::RefreshFailed(format!("token lifetime out of range (expires_in={lifetime})"))
        })?;
        self.access_token = response.access_token;
        if let Some(rotated) = response.refresh_token {
            self.refresh_token = Some(rotated);
        }
        if let Some(scope) = response.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }

        if self.is_expired_at(now) {
            return Err(AuthError::RefreshFailed(format!(
                "refreshed token expires immediately (expires_in={lifetime})"
            )));
        }
        Ok(self)
    }

    /// Value of the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// `now + seconds`, or `None` when the lifetime does not fit a timestamp.
pub(crate) fn expiry_after(now: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(seconds).and_then(|lifetime| now.checked_add_signed(lifetime))
}
