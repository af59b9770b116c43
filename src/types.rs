//! Core types for calendar-mcp.
//!
//! These are read-only projections of provider data. They are rebuilt on every
//! call and never cached, so a value is a snapshot of the calendar at the time
//! the tool ran.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a stored OAuth grant in the vault.
///
/// Built once from configuration and shared by every tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRef {
    /// Vault connection identifier.
    pub connection_id: String,
    /// Vault integration (provider config key).
    pub integration_id: String,
}

impl ConnectionRef {
    /// Create a new connection reference.
    pub fn new(connection_id: impl Into<String>, integration_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            integration_id: integration_id.into(),
        }
    }
}

/// Display colors of a calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarColors {
    pub background: Option<String>,
    pub foreground: Option<String>,
}

/// A calendar the connected account can see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_primary: bool,
    pub access_role: Option<String>,
    pub colors: CalendarColors,
    pub time_zone: Option<String>,
}

/// Start or end of an event.
///
/// All-day events carry only a date; timed events carry an offset timestamp
/// and usually an IANA zone name. The two shapes stay distinct because the
/// provider uses them to tell all-day events from timed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    /// Timed event boundary.
    Timed {
        #[serde(rename = "dateTime")]
        date_time: DateTime<FixedOffset>,
        #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    /// All-day event boundary.
    AllDay { date: NaiveDate },
}

impl EventTime {
    /// Whether this boundary belongs to an all-day event.
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::AllDay { .. })
    }

    /// Instant used for ordering. All-day dates sort at UTC midnight.
    pub fn sort_key(&self) -> DateTime<Utc> {
        match self {
            EventTime::Timed { date_time, .. } => date_time.with_timezone(&Utc),
            EventTime::AllDay { date } => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

/// A single (already expanded) calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: String,
    pub status: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub link: Option<String>,
    pub calendar_id: String,
    /// Video conference entry point, when the provider attached one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
}

impl EventRecord {
    /// Ordering key for the event start; events without a start sort first.
    pub fn start_key(&self) -> Option<DateTime<Utc>> {
        self.start.as_ref().map(EventTime::sort_key)
    }
}

/// Outcome of an operation that reports failures as data instead of errors.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<T> {
    Ok { payload: T, message: String },
    Fail { error_kind: String, message: String },
}

impl<T> OperationResult<T> {
    pub fn ok(payload: T, message: impl Into<String>) -> Self {
        OperationResult::Ok {
            payload,
            message: message.into(),
        }
    }

    pub fn fail(error_kind: impl Into<String>, message: impl Into<String>) -> Self {
        OperationResult::Fail {
            error_kind: error_kind.into(),
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, OperationResult::Ok { .. })
    }

    /// Error kind of a failed operation.
    pub fn error_kind(&self) -> Option<&str> {
        match self {
            OperationResult::Ok { .. } => None,
            OperationResult::Fail { error_kind, .. } => Some(error_kind),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OperationResult::Ok { message, .. } | OperationResult::Fail { message, .. } => message,
        }
    }

    /// Payload of a successful operation.
    pub fn payload(&self) -> Option<&T> {
        match self {
            OperationResult::Ok { payload, .. } => Some(payload),
            OperationResult::Fail { .. } => None,
        }
    }
}

/// Events returned by a single listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventList {
    pub events: Vec<EventRecord>,
    pub total_events: usize,
}

impl EventList {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self {
            total_events: events.len(),
            events,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}
