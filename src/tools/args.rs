//! Typed tool arguments.
//!
//! Names are camelCase; the snake_case spellings are accepted as aliases.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::calendar::{EventQuery, NewMeeting};
use crate::error::ToolError;

/// Calendar used when the caller does not name one.
pub const PRIMARY_CALENDAR: &str = "primary";

/// Default page size of `listEvents`.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Page size used by the derived today/upcoming queries.
pub const DERIVED_MAX_RESULTS: u32 = 50;

pub const DEFAULT_DAYS_AHEAD: u32 = 7;

fn primary() -> String {
    PRIMARY_CALENDAR.to_string()
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

fn default_days_ahead() -> u32 {
    DEFAULT_DAYS_AHEAD
}

fn utc() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsArgs {
    #[serde(default = "primary", alias = "calendar_id")]
    pub calendar_id: String,
    #[serde(default, alias = "time_min")]
    pub time_min: Option<String>,
    #[serde(default, alias = "time_max")]
    pub time_max: Option<String>,
    #[serde(default = "default_max_results", alias = "max_results")]
    pub max_results: u32,
}

impl From<ListEventsArgs> for EventQuery {
    fn from(args: ListEventsArgs) -> Self {
        EventQuery {
            calendar_id: args.calendar_id,
            time_min: args.time_min.filter(|t| !t.is_empty()),
            time_max: args.time_max.filter(|t| !t.is_empty()),
            max_results: args.max_results,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingArgs {
    pub summary: String,
    #[serde(alias = "start_datetime", alias = "startDateTime")]
    pub start: String,
    #[serde(alias = "end_datetime", alias = "endDateTime")]
    pub end: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    #[serde(default = "utc")]
    pub timezone: String,
    #[serde(default = "primary", alias = "calendar_id")]
    pub calendar_id: String,
}

impl From<CreateMeetingArgs> for NewMeeting {
    fn from(args: CreateMeetingArgs) -> Self {
        NewMeeting {
            summary: args.summary,
            start: args.start,
            end: args.end,
            description: args.description.unwrap_or_default(),
            attendees: args.attendees.unwrap_or_default(),
            timezone: args.timezone,
            calendar_id: args.calendar_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelEventArgs {
    #[serde(alias = "calendar_id")]
    pub calendar_id: String,
    #[serde(alias = "event_id")]
    pub event_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayEventsArgs {
    #[serde(default = "primary", alias = "calendar_id")]
    pub calendar_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEventsArgs {
    #[serde(default = "default_days_ahead", alias = "days_ahead")]
    pub days_ahead: u32,
    #[serde(default = "primary", alias = "calendar_id")]
    pub calendar_id: String,
}

/// Parse tool arguments; a missing/null argument object means "all defaults".
pub fn parse<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_events_defaults() {
        let args: ListEventsArgs = parse("listEvents", Value::Null).unwrap();
        assert_eq!(args.calendar_id, "primary");
        assert_eq!(args.max_results, 10);
        assert!(args.time_min.is_none());
    }

    #[test]
    fn test_snake_case_aliases() {
        let args: ListEventsArgs = parse(
            "listEvents",
            json!({"calendar_id": "work", "max_results": 3, "time_min": "2025-01-01T00:00:00Z"}),
        )
        .unwrap();
        assert_eq!(args.calendar_id, "work");
        assert_eq!(args.max_results, 3);

        let query = EventQuery::from(args);
        assert_eq!(query.time_min.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_create_meeting_defaults() {
        let args: CreateMeetingArgs = parse(
            "createMeetingEvent",
            json!({"summary": "Sync", "start_datetime": "2025-01-01T10:00:00", "end": "2025-01-01T11:00:00"}),
        )
        .unwrap();
        let meeting = NewMeeting::from(args);

        assert_eq!(meeting.timezone, "UTC");
        assert_eq!(meeting.calendar_id, "primary");
        assert_eq!(meeting.description, "");
        assert!(meeting.attendees.is_empty());
    }

    #[test]
    fn test_cancel_requires_ids() {
        let result: Result<CancelEventArgs, _> = parse("cancelEvent", json!({"calendarId": "primary"}));
        match result {
            Err(ToolError::InvalidArguments { tool, reason }) => {
                assert_eq!(tool, "cancelEvent");
                assert!(reason.contains("eventId"));
            }
            other => panic!("expected invalid arguments, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_days_rejected() {
        let result: Result<UpcomingEventsArgs, _> = parse("getUpcomingEvents", json!({"daysAhead": -1}));
        assert!(result.is_err());
    }
}
