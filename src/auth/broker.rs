//! Vault-backed credential broker.
//!
//! The vault stores the upstream OAuth grant. We ask it for the connection
//! with `refresh_token=true` so it rotates tokens it knows are near expiry,
//! then fall back to a direct refresh grant if what we got is still expired.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;

use super::credential::{expiry_after, Credential, TokenResponse, DEFAULT_TOKEN_LIFETIME_SECONDS};
use super::CredentialSource;
use crate::config::Config;
use crate::error::AuthError;
use crate::types::ConnectionRef;

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Scope required for reading and writing calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Longest body snippet carried into an error message.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct VaultConnection {
    credentials: Option<VaultCredentials>,
}

#[derive(Debug, Deserialize)]
struct VaultCredentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    raw: Option<VaultRawToken>,
}

#[derive(Debug, Deserialize)]
struct VaultRawToken {
    expires_in: Option<i64>,
}

/// Resolves credentials by reading the vault on every call.
pub struct VaultBroker {
    http: Client,
    connection: ConnectionRef,
    vault_base_url: String,
    vault_secret_key: String,
    token_endpoint: String,
    scopes: Vec<String>,
}

impl VaultBroker {
    /// Create a broker for a connection.
    pub fn new(
        http: Client,
        connection: ConnectionRef,
        vault_base_url: impl Into<String>,
        vault_secret_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            connection,
            vault_base_url: vault_base_url.into(),
            vault_secret_key: vault_secret_key.into(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            scopes: vec![CALENDAR_SCOPE.to_string()],
        }
    }

    /// Build a broker from the process configuration.
    pub fn from_config(config: &Config, http: Client) -> Self {
        Self::new(
            http,
            config.connection.clone(),
            config.vault.base_url.as_str(),
            config.vault.secret_key.clone(),
        )
        .with_token_endpoint(config.provider.token_endpoint.as_str())
    }

    /// Override the token endpoint used for refresh grants.
    pub fn with_token_endpoint(mut self, token_endpoint: impl Into<String>) -> Self {
        self.token_endpoint = token_endpoint.into();
        self
    }

    fn connection_url(&self) -> String {
        format!(
            "{}/connection/{}",
            self.vault_base_url.trim_end_matches('/'),
            utf8_percent_encode(&self.connection.connection_id, NON_ALPHANUMERIC)
        )
    }

    async fn fetch_connection(&self) -> Result<VaultCredentials, AuthError> {
        let url = self.connection_url();
        tracing::debug!(
            connection_id = %self.connection.connection_id,
            integration_id = %self.connection.integration_id,
            "Reading credentials from vault"
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.vault_secret_key)
            .query(&[
                ("provider_config_key", self.connection.integration_id.as_str()),
                ("refresh_token", "true"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::VaultUnavailable {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::VaultUnavailable {
                status: Some(status.as_u16()),
                message: truncate(&body),
            });
        }

        let connection: VaultConnection = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedCredential(e.to_string()))?;

        connection.credentials.ok_or_else(|| {
            AuthError::MalformedCredential("vault response has no credentials object".to_string())
        })
    }

    fn build_credential(&self, creds: VaultCredentials, now: DateTime<Utc>) -> Result<Credential, AuthError> {
        let access_token = creds
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::MalformedCredential("missing access_token".to_string()))?;

        let expiry = match (creds.expires_at, creds.raw.and_then(|raw| raw.expires_in)) {
            (Some(at), _) => at,
            (None, Some(secs)) => expiry_after(now, secs).ok_or_else(|| {
                AuthError::MalformedCredential(format!("expires_in out of range: {secs}"))
            })?,
            // The vault was asked to refresh, so an undated token is fresh.
            (None, None) => expiry_after(now, DEFAULT_TOKEN_LIFETIME_SECONDS).ok_or_else(|| {
                AuthError::MalformedCredential("clock out of range".to_string())
            })?,
        };

        Ok(Credential::new(
            access_token,
            creds.refresh_token.filter(|t| !t.is_empty()),
            self.token_endpoint.clone(),
            creds.client_id,
            creds.client_secret,
            self.scopes.clone(),
            expiry,
        ))
    }

    async fn refresh(&self, credential: Credential) -> Result<Credential, AuthError> {
        let refresh_token = credential
            .refresh_token()
            .ok_or(AuthError::Unrefreshable)?
            .to_string();
        let (client_id, client_secret) = credential.client_credentials()?;

        tracing::warn!(
            connection_id = %self.connection.connection_id,
            "Vault returned an expired access token, refreshing directly"
        );

        let response = self
            .http
            .post(credential.token_endpoint())
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshFailed(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                truncate(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("invalid token response: {e}")))?;

        credential.refreshed(token, Utc::now())
    }
}

#[async_trait]
impl CredentialSource for VaultBroker {
    async fn resolve(&self) -> Result<Credential, AuthError> {
        let creds = self.fetch_connection().await?;
        let credential = self.build_credential(creds, Utc::now())?;

        if !credential.is_expired() {
            return Ok(credential);
        }
        if credential.refresh_token().is_none() {
            tracing::error!(
                connection_id = %self.connection.connection_id,
                "Access token expired and vault holds no refresh token"
            );
            return Err(AuthError::Unrefreshable);
        }
        self.refresh(credential).await
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
