//! Process configuration.
//!
//! Built once at startup from CLI flags and the environment (a `.env` file is
//! loaded first) and passed by value into the broker, client, and registry.
//! Missing required values fail fast.

use std::fmt;
use std::time::Duration;

use clap::Args;
use reqwest::Url;

use crate::auth::GOOGLE_TOKEN_ENDPOINT;
use crate::error::ConfigError;
use crate::types::ConnectionRef;

/// Default Google Calendar v3 API root.
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Raw configuration inputs, read from flags or the environment.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Vault connection id holding the Google grant
    #[arg(long, env = "NANGO_CONNECTION_ID")]
    pub connection_id: Option<String>,

    /// Vault integration id (provider config key)
    #[arg(long, env = "NANGO_INTEGRATION_ID")]
    pub integration_id: Option<String>,

    /// Vault API base URL
    #[arg(long, env = "NANGO_BASE_URL")]
    pub vault_base_url: Option<String>,

    /// Vault secret key
    #[arg(long, env = "NANGO_SECRET_KEY", hide_env_values = true)]
    pub vault_secret_key: Option<String>,

    /// Calendar API base URL
    #[arg(long, env = "GOOGLE_CALENDAR_API_BASE")]
    pub calendar_api_base: Option<String>,

    /// OAuth2 token endpoint used for refresh grants
    #[arg(long, env = "GOOGLE_TOKEN_ENDPOINT")]
    pub token_endpoint: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "CALENDAR_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

/// Vault access settings.
#[derive(Clone)]
pub struct VaultConfig {
    pub base_url: Url,
    pub secret_key: String,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("base_url", &self.base_url.as_str())
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Calendar provider endpoints.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_base: Url,
    pub token_endpoint: Url,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionRef,
    pub vault: VaultConfig,
    pub provider: ProviderConfig,
    pub http_timeout: Duration,
}

impl Config {
    /// Validate raw inputs into a configuration.
    ///
    /// The legacy `NANGO_NANGO_BASE_URL` / `NANGO_NANGO_SECRET_KEY` names are
    /// honoured when the primary variables are absent.
    pub fn from_args(args: ConfigArgs) -> Result<Self, ConfigError> {
        let connection_id = required(args.connection_id, "NANGO_CONNECTION_ID")?;
        let integration_id = required(args.integration_id, "NANGO_INTEGRATION_ID")?;
        let vault_base_url = required(
            args.vault_base_url.or_else(|| env_var("NANGO_NANGO_BASE_URL")),
            "NANGO_BASE_URL",
        )?;
        let vault_secret_key = required(
            args.vault_secret_key.or_else(|| env_var("NANGO_NANGO_SECRET_KEY")),
            "NANGO_SECRET_KEY",
        )?;

        let api_base = args
            .calendar_api_base
            .unwrap_or_else(|| GOOGLE_CALENDAR_API_BASE.to_string());
        let token_endpoint = args
            .token_endpoint
            .unwrap_or_else(|| GOOGLE_TOKEN_ENDPOINT.to_string());

        if args.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CALENDAR_HTTP_TIMEOUT_SECS",
                reason: "Timeout must be at least one second".to_string(),
            });
        }

        Ok(Self {
            connection: ConnectionRef::new(connection_id, integration_id),
            vault: VaultConfig {
                base_url: parse_url("NANGO_BASE_URL", &vault_base_url)?,
                secret_key: vault_secret_key,
            },
            provider: ProviderConfig {
                api_base: parse_url("GOOGLE_CALENDAR_API_BASE", &api_base)?,
                token_endpoint: parse_url("GOOGLE_TOKEN_ENDPOINT", &token_endpoint)?,
            },
            http_timeout: Duration::from_secs(args.http_timeout_secs),
        })
    }

    /// Build the shared HTTP client.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CALENDAR_HTTP_TIMEOUT_SECS",
                reason: e.to_string(),
            })
    }

    /// Create a configuration for testing against local mock servers.
    pub fn for_testing(vault_base_url: &str, api_base: &str) -> Self {
        let args = ConfigArgs {
            connection_id: Some("test-connection".to_string()),
            integration_id: Some("google-calendar".to_string()),
            vault_base_url: Some(vault_base_url.to_string()),
            vault_secret_key: Some("test-secret".to_string()),
            calendar_api_base: Some(api_base.to_string()),
            token_endpoint: Some(format!("{}/oauth/token", vault_base_url.trim_end_matches('/'))),
            http_timeout_secs: 5,
        };
        match Self::from_args(args) {
            Ok(config) => config,
            Err(e) => panic!("invalid test configuration: {e}"),
        }
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingRequired(key))
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key,
            reason: format!("Unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_args() -> ConfigArgs {
        ConfigArgs {
            connection_id: Some("conn-1".to_string()),
            integration_id: Some("google-calendar".to_string()),
            vault_base_url: Some("https://api.nango.dev".to_string()),
            vault_secret_key: Some("sk-test".to_string()),
            calendar_api_base: None,
            token_endpoint: None,
            http_timeout_secs: 30,
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_args(complete_args()).unwrap();
        assert_eq!(config.connection.connection_id, "conn-1");
        assert_eq!(config.provider.api_base.as_str(), "https://www.googleapis.com/calendar/v3");
        assert_eq!(config.provider.token_endpoint.as_str(), GOOGLE_TOKEN_ENDPOINT);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_connection_id_fails_fast() {
        let args = ConfigArgs {
            connection_id: None,
            ..complete_args()
        };
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::MissingRequired("NANGO_CONNECTION_ID"))
        ));
    }

    #[test]
    fn test_blank_integration_id_is_missing() {
        let args = ConfigArgs {
            integration_id: Some("   ".to_string()),
            ..complete_args()
        };
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::MissingRequired("NANGO_INTEGRATION_ID"))
        ));
    }

    #[test]
    fn test_invalid_vault_url() {
        let args = ConfigArgs {
            vault_base_url: Some("ftp://vault".to_string()),
            ..complete_args()
        };
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::InvalidValue { key: "NANGO_BASE_URL", .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = ConfigArgs {
            http_timeout_secs: 0,
            ..complete_args()
        };
        assert!(Config::from_args(args).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::from_args(complete_args()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-test"));
    }
}
