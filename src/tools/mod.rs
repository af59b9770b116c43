//! Calendar tools exposed to agents.
//!
//! | Tool                 | Client operation                      |
//! |----------------------|---------------------------------------|
//! | `listCalendars`      | `CalendarClient::list_calendars`      |
//! | `listEvents`         | `CalendarClient::list_events`         |
//! | `createMeetingEvent` | `CalendarClient::create_meeting_event`|
//! | `cancelEvent`        | `CalendarClient::cancel_event`        |
//! | `getTodayEvents`     | `list_events` over the local day      |
//! | `getUpcomingEvents`  | `list_events` over the next N days    |
//!
//! Results are JSON envelopes: `{"success": true, ..., "message"}` or
//! `{"success": false, "error", "message", ...}`.

pub mod args;
pub mod definitions;
pub mod envelope;
pub mod registry;
pub mod window;

use std::sync::Arc;

pub use definitions::{ToolDefinition, ToolName};
pub use registry::ToolRegistry;

use crate::auth::{CredentialSource, VaultBroker};
use crate::calendar::CalendarClient;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::ConfigError;

/// Wire a registry against the real vault, provider and system clock.
pub fn create_registry(config: &Config) -> Result<ToolRegistry, ConfigError> {
    let http = config.http_client()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let credentials: Arc<dyn CredentialSource> = Arc::new(VaultBroker::from_config(config, http.clone()));
    let client = CalendarClient::from_config(config, http, credentials, clock.clone());

    tracing::debug!(
        connection_id = %config.connection.connection_id,
        api_base = %config.provider.api_base,
        "Tool registry ready"
    );
    Ok(ToolRegistry::new(client, clock))
}

/// Build a registry and invoke a single tool with it.
pub async fn call_once(config: &Config, tool: &str, arguments: serde_json::Value) -> crate::Result<String> {
    let registry = create_registry(config)?;
    Ok(registry.call(tool, arguments).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ToolError};

    #[test]
    fn test_create_registry_from_config() {
        let config = Config::for_testing("http://127.0.0.1:9", "http://127.0.0.1:9/calendar/v3");
        let registry = create_registry(&config).unwrap();

        assert_eq!(registry.definitions().len(), ToolName::ALL.len());
        for tool in ToolName::ALL {
            assert!(registry.has(tool.as_str()));
        }
    }

    #[tokio::test]
    async fn test_call_once_unknown_tool() {
        let config = Config::for_testing("http://127.0.0.1:9", "http://127.0.0.1:9/calendar/v3");
        let result = call_once(&config, "dropTables", serde_json::Value::Null).await;

        assert!(matches!(result, Err(Error::Tool(ToolError::UnknownTool(name))) if name == "dropTables"));
    }
}
