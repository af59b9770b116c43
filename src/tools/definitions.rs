//! Tool names and their published input schemas.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ToolError;

/// The callable tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListCalendars,
    ListEvents,
    CreateMeetingEvent,
    CancelEvent,
    GetTodayEvents,
    GetUpcomingEvents,
}

impl ToolName {
    /// Every tool, in listing order.
    pub const ALL: [ToolName; 6] = [
        ToolName::ListCalendars,
        ToolName::ListEvents,
        ToolName::CreateMeetingEvent,
        ToolName::CancelEvent,
        ToolName::GetTodayEvents,
        ToolName::GetUpcomingEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListCalendars => "listCalendars",
            ToolName::ListEvents => "listEvents",
            ToolName::CreateMeetingEvent => "createMeetingEvent",
            ToolName::CancelEvent => "cancelEvent",
            ToolName::GetTodayEvents => "getTodayEvents",
            ToolName::GetUpcomingEvents => "getUpcomingEvents",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// Published description of a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Definitions of every tool.
pub fn all_definitions() -> Vec<ToolDefinition> {
    ToolName::ALL.into_iter().map(definition).collect()
}

/// Definition of one tool.
pub fn definition(tool: ToolName) -> ToolDefinition {
    let calendar_id = json!({
        "type": "string",
        "description": "Calendar ID",
        "default": "primary"
    });

    let (description, input_schema) = match tool {
        ToolName::ListCalendars => (
            "Get all Google Calendars accessible to the user",
            json!({ "type": "object", "properties": {} }),
        ),
        ToolName::ListEvents => (
            "Get events from a specific Google Calendar",
            json!({
                "type": "object",
                "properties": {
                    "calendarId": calendar_id,
                    "timeMin": {
                        "type": "string",
                        "description": "Lower bound (inclusive) for event end time, RFC 3339"
                    },
                    "timeMax": {
                        "type": "string",
                        "description": "Upper bound (exclusive) for event start time, RFC 3339"
                    },
                    "maxResults": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Maximum number of events to return",
                        "default": 10
                    }
                }
            }),
        ),
        ToolName::CreateMeetingEvent => (
            "Create a new Google Calendar event with Google Meet integration",
            json!({
                "type": "object",
                "properties": {
                    "summary": { "type": "string", "description": "Event title" },
                    "start": {
                        "type": "string",
                        "description": "Start date-time, e.g. '2024-12-25T10:00:00'"
                    },
                    "end": {
                        "type": "string",
                        "description": "End date-time, e.g. '2024-12-25T11:00:00'"
                    },
                    "description": { "type": "string", "description": "Event description" },
                    "attendees": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Attendee emails"
                    },
                    "timezone": { "type": "string", "description": "IANA time zone", "default": "UTC" },
                    "calendarId": calendar_id
                },
                "required": ["summary", "start", "end"]
            }),
        ),
        ToolName::CancelEvent => (
            "Cancel (delete) a specific event from Google Calendar",
            json!({
                "type": "object",
                "properties": {
                    "calendarId": { "type": "string", "description": "Calendar ID where the event exists" },
                    "eventId": { "type": "string", "description": "Identifier of the event to cancel" }
                },
                "required": ["calendarId", "eventId"]
            }),
        ),
        ToolName::GetTodayEvents => (
            "Get today's events from a calendar",
            json!({
                "type": "object",
                "properties": { "calendarId": calendar_id }
            }),
        ),
        ToolName::GetUpcomingEvents => (
            "Get upcoming events for the next N days",
            json!({
                "type": "object",
                "properties": {
                    "daysAhead": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Number of days to look ahead",
                        "default": 7
                    },
                    "calendarId": calendar_id
                }
            }),
        ),
    };

    ToolDefinition {
        name: tool.as_str(),
        description,
        input_schema,
    }
}
