//! Error types for calendar-mcp.
//!
//! Each layer owns its error enum. Auth and calendar errors never cross the
//! tool boundary: the registry converts them into envelopes. The top-level
//! [`Error`] covers what can still fail around it (config, dispatch, stdio).

use thiserror::Error;

/// Main error type for calendar-mcp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool dispatch errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for calendar-mcp.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning a connection reference into a live credential.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Vault unavailable{}: {message}", status_suffix(.status))]
    VaultUnavailable {
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Access token expired and no refresh token is available")]
    Unrefreshable,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Errors raised by the calendar provider client.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Calendar API returned {status}: {raw_message}")]
    Remote { status: u16, raw_message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CalendarError {
    /// HTTP status reported by the provider, if the failure came from it.
    pub fn status(&self) -> Option<u16> {
        match self {
            CalendarError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while dispatching a tool call.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

/// Errors related to configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required config: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid config value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
