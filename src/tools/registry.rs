//! Tool registry - dispatches named tool calls to the calendar client.
//!
//! Every call renders to a JSON envelope. The only error surfaced to the
//! caller as `Err` is an unknown tool name; everything else, including a
//! panic inside a handler, becomes a `{success: false, ...}` envelope.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{json, Value};

use super::args::{
    self, CancelEventArgs, CreateMeetingArgs, ListEventsArgs, TodayEventsArgs,
    UpcomingEventsArgs, DERIVED_MAX_RESULTS,
};
use super::definitions::{all_definitions, ToolDefinition, ToolName};
use super::envelope;
use super::window::{TimeWindow, MAX_DAYS_AHEAD};
use crate::calendar::{CalendarClient, EventQuery, NewMeeting};
use crate::clock::Clock;
use crate::error::{CalendarError, ToolError};

/// Registry of the calendar tools.
pub struct ToolRegistry {
    client: CalendarClient,
    clock: Arc<dyn Clock>,
}

impl ToolRegistry {
    pub fn new(client: CalendarClient, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    /// Definitions of every registered tool, in listing order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        all_definitions()
    }

    /// Check if a tool exists.
    pub fn has(&self, name: &str) -> bool {
        name.parse::<ToolName>().is_ok()
    }

    /// Invoke a tool and return its rendered envelope.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        let tool: ToolName = name.parse()?;
        tracing::info!(tool = %tool, "Tool call");

        let outcome = AssertUnwindSafe(self.dispatch(tool, arguments))
            .catch_unwind()
            .await;

        let envelope = match outcome {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(e)) => {
                tracing::warn!(tool = %tool, error = %e, "Rejected tool arguments");
                envelope::failure("invalid_arguments", e.to_string(), Value::Null)
            }
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                tracing::error!(tool = %tool, panic = %detail, "Tool handler panicked");
                envelope::failure(
                    "internal_error",
                    format!("Unexpected error occurred: {detail}"),
                    Value::Null,
                )
            }
        };

        Ok(envelope::render(&envelope))
    }

    async fn dispatch(&self, tool: ToolName, arguments: Value) -> Result<Value, ToolError> {
        let name = tool.as_str();
        match tool {
            ToolName::ListCalendars => Ok(self.list_calendars().await),
            ToolName::ListEvents => {
                let args: ListEventsArgs = args::parse(name, arguments)?;
                Ok(self.list_events(EventQuery::from(args)).await)
            }
            ToolName::CreateMeetingEvent => {
                let args: CreateMeetingArgs = args::parse(name, arguments)?;
                Ok(self.create_meeting_event(NewMeeting::from(args)).await)
            }
            ToolName::CancelEvent => {
                let args: CancelEventArgs = args::parse(name, arguments)?;
                Ok(self.cancel_event(&args.calendar_id, &args.event_id).await)
            }
            ToolName::GetTodayEvents => {
                let args: TodayEventsArgs = args::parse(name, arguments)?;
                let (time_min, time_max) = TimeWindow::today(self.clock.as_ref()).bounds();
                let query = EventQuery::new(args.calendar_id, DERIVED_MAX_RESULTS).between(time_min, time_max);
                Ok(self.list_events(query).await)
            }
            ToolName::GetUpcomingEvents => {
                let args: UpcomingEventsArgs = args::parse(name, arguments)?;
                let window = TimeWindow::upcoming(self.clock.now(), args.days_ahead).ok_or_else(|| {
                    ToolError::InvalidArguments {
                        tool: name.to_string(),
                        reason: format!("daysAhead must be at most {MAX_DAYS_AHEAD}"),
                    }
                })?;
                let (time_min, time_max) = window.bounds();
                let query = EventQuery::new(args.calendar_id, DERIVED_MAX_RESULTS).between(time_min, time_max);
                Ok(self.list_events(query).await)
            }
        }
    }

    async fn list_calendars(&self) -> Value {
        match self.client.list_calendars().await {
            Ok(calendars) => {
                let message = format!("Retrieved {} calendars successfully", calendars.len());
                envelope::success(
                    json!({ "total_calendars": calendars.len(), "calendars": calendars }),
                    message,
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list calendars");
                let kind = match &e {
                    CalendarError::Auth(_) => "auth_error".to_string(),
                    other => crate::calendar::listing_error_kind(other),
                };
                envelope::failure(kind, format!("Failed to retrieve calendars: {e}"), Value::Null)
            }
        }
    }

    async fn list_events(&self, query: EventQuery) -> Value {
        let context = json!({ "calendar_id": query.calendar_id });
        envelope::from_result(self.client.list_events(&query).await, context)
    }

    async fn create_meeting_event(&self, meeting: NewMeeting) -> Value {
        match self.client.create_meeting_event(&meeting).await {
            Some(event) => envelope::success(json!({ "event": event }), "Event created successfully"),
            None => envelope::failure("create_failed", "Failed to create event", Value::Null),
        }
    }

    async fn cancel_event(&self, calendar_id: &str, event_id: &str) -> Value {
        let context = json!({ "event_id": event_id, "calendar_id": calendar_id });
        envelope::from_result(self.client.cancel_event(calendar_id, event_id).await, context)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, CredentialSource, StaticCredential, GOOGLE_TOKEN_ENDPOINT};
    use crate::clock::FixedClock;
    use crate::error::AuthError;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use reqwest::Client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credential() -> Credential {
        Credential::new(
            "test-access",
            None,
            GOOGLE_TOKEN_ENDPOINT,
            None,
            None,
            Vec::new(),
            Utc::now() + Duration::hours(1),
        )
    }

    fn registry_with(server: &MockServer, credentials: Arc<dyn CredentialSource>) -> ToolRegistry {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::parse("2025-03-14T15:09:26-07:00").unwrap());
        let client = CalendarClient::new(Client::new(), server.uri(), credentials, clock.clone());
        ToolRegistry::new(client, clock)
    }

    fn registry(server: &MockServer) -> ToolRegistry {
        registry_with(server, Arc::new(StaticCredential::new(credential())))
    }

    fn parse(rendered: &str) -> Value {
        serde_json::from_str(rendered).unwrap()
    }

    struct PanickingSource;

    #[async_trait]
    impl CredentialSource for PanickingSource {
        async fn resolve(&self) -> Result<Credential, AuthError> {
            panic!("vault exploded");
        }
    }

    struct RejectingSource;

    #[async_trait]
    impl CredentialSource for RejectingSource {
        async fn resolve(&self) -> Result<Credential, AuthError> {
            Err(AuthError::Unrefreshable)
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let server = MockServer::start().await;
        let registry = registry(&server);

        assert!(!registry.has("deleteCalendar"));
        let result = registry.call("deleteCalendar", Value::Null).await;
        assert!(matches!(result, Err(ToolError::UnknownTool(name)) if name == "deleteCalendar"));
    }

    #[tokio::test]
    async fn test_list_calendars_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "primary@example.com", "summary": "Me", "primary": true},
                    {"id": "team@example.com"}
                ]
            })))
            .mount(&server)
            .await;

        let envelope = parse(&registry(&server).call("listCalendars", json!({})).await.unwrap());

        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["total_calendars"], 2);
        assert_eq!(envelope["calendars"][1]["title"], "team@example.com");
        assert_eq!(envelope["message"], "Retrieved 2 calendars successfully");
    }

    #[tokio::test]
    async fn test_list_calendars_auth_failure() {
        let server = MockServer::start().await;
        let registry = registry_with(&server, Arc::new(RejectingSource));

        let envelope = parse(&registry.call("listCalendars", Value::Null).await.unwrap());

        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "auth_error");
        assert!(envelope["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to retrieve calendars"));
    }

    #[tokio::test]
    async fn test_list_events_failure_carries_calendar_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/work/events"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
            .mount(&server)
            .await;

        let envelope = parse(
            &registry(&server)
                .call("listEvents", json!({"calendarId": "work"}))
                .await
                .unwrap(),
        );

        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "http_error_500");
        assert_eq!(envelope["calendar_id"], "work");
    }

    #[tokio::test]
    async fn test_today_events_uses_local_day_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("timeMin", "2025-03-14T00:00:00.000-07:00"))
            .and(query_param("timeMax", "2025-03-14T23:59:59.999-07:00"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = parse(&registry(&server).call("getTodayEvents", Value::Null).await.unwrap());

        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["total_events"], 0);
        assert_eq!(envelope["calendar_id"], "primary");
    }

    #[tokio::test]
    async fn test_upcoming_events_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("timeMin", "2025-03-14T15:09:26.000-07:00"))
            .and(query_param("timeMax", "2025-03-17T15:09:26.000-07:00"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = parse(
            &registry(&server)
                .call("getUpcomingEvents", json!({"days_ahead": 3}))
                .await
                .unwrap(),
        );
        assert_eq!(envelope["success"], true);
    }

    #[tokio::test]
    async fn test_upcoming_events_rejects_out_of_range_days() {
        let server = MockServer::start().await;

        let envelope = parse(
            &registry(&server)
                .call("getUpcomingEvents", json!({"daysAhead": MAX_DAYS_AHEAD + 1}))
                .await
                .unwrap(),
        );

        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "invalid_arguments");
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let server = MockServer::start().await;

        let envelope = parse(
            &registry(&server)
                .call("createMeetingEvent", json!({"summary": "Sync"}))
                .await
                .unwrap(),
        );

        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "invalid_arguments");
    }

    #[tokio::test]
    async fn test_create_meeting_success_and_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "evt1",
                "summary": "Sync",
                "start": {"dateTime": "2025-03-20T10:00:00Z"},
                "end": {"dateTime": "2025-03-20T11:00:00Z"},
                "hangoutLink": "https://meet.google.com/abc-defg-hij"
            })))
            .mount(&server)
            .await;
        let registry = registry(&server);

        let created = parse(
            &registry
                .call(
                    "createMeetingEvent",
                    json!({"summary": "Sync", "start": "2025-03-20T10:00:00", "end": "2025-03-20T11:00:00"}),
                )
                .await
                .unwrap(),
        );
        assert_eq!(created["success"], true);
        assert_eq!(created["event"]["id"], "evt1");
        assert_eq!(created["event"]["meet_link"], "https://meet.google.com/abc-defg-hij");
        assert_eq!(created["message"], "Event created successfully");

        let blank = parse(
            &registry
                .call("createMeetingEvent", json!({"summary": "  ", "start": "a", "end": "b"}))
                .await
                .unwrap(),
        );
        assert_eq!(blank["success"], false);
        assert_eq!(blank["error"], "create_failed");
    }

    #[tokio::test]
    async fn test_cancel_twice_reports_not_found_both_times() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;
        let registry = registry(&server);
        let args = json!({"calendarId": "primary", "eventId": "gone"});

        let first = parse(&registry.call("cancelEvent", args.clone()).await.unwrap());
        let second = parse(&registry.call("cancelEvent", args).await.unwrap());

        assert_eq!(first, second);
        assert_eq!(first["success"], false);
        assert_eq!(first["error"], "event_not_found");
        assert_eq!(first["event_id"], "gone");
        assert_eq!(first["calendar_id"], "primary");
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let server = MockServer::start().await;
        let registry = registry_with(&server, Arc::new(PanickingSource));

        let envelope = parse(&registry.call("listCalendars", Value::Null).await.unwrap());

        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "internal_error");
        assert!(envelope["message"].as_str().unwrap().contains("vault exploded"));
    }
}
