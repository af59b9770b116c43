//! Calendar client.
//!
//! Performs the four remote primitives against the Google Calendar v3 API and
//! normalizes what comes back:
//!
//! | Operation | Failure handling |
//! |-----------|------------------|
//! | [`CalendarClient::list_calendars`] | propagates [`CalendarError`] |
//! | [`CalendarClient::list_events`] | `OperationResult::Fail` with `http_error_<status>` / `unexpected_error` |
//! | [`CalendarClient::create_meeting_event`] | `None` |
//! | [`CalendarClient::cancel_event`] | `OperationResult::Fail` with `event_not_found` / `permission_denied` / `http_error` |
//!
//! Every operation resolves its own credential; no session is shared between
//! calls.

pub mod client;
pub mod wire;

pub use client::CalendarClient;

use crate::error::CalendarError;

/// Parameters of an event listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub calendar_id: String,
    /// Inclusive lower bound (RFC 3339).
    pub time_min: Option<String>,
    /// Exclusive upper bound (RFC 3339).
    pub time_max: Option<String>,
    pub max_results: u32,
}

impl EventQuery {
    /// Query with no time bounds.
    pub fn new(calendar_id: impl Into<String>, max_results: u32) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            time_min: None,
            time_max: None,
            max_results,
        }
    }

    pub fn between(mut self, time_min: impl Into<String>, time_max: impl Into<String>) -> Self {
        self.time_min = Some(time_min.into());
        self.time_max = Some(time_max.into());
        self
    }
}

/// A meeting to create, with a video conference attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub description: String,
    pub attendees: Vec<String>,
    pub timezone: String,
    pub calendar_id: String,
}

/// Error kind reported by an event listing.
pub fn listing_error_kind(err: &CalendarError) -> String {
    match err.status() {
        Some(status) => format!("http_error_{status}"),
        None => "unexpected_error".to_string(),
    }
}

/// Error kind reported by an event cancellation.
///
/// 410 means the event was already deleted, which callers see the same way as
/// a missing event.
pub fn cancel_error_kind(err: &CalendarError) -> &'static str {
    match err.status() {
        Some(404) | Some(410) => "event_not_found",
        Some(403) => "permission_denied",
        Some(_) => "http_error",
        None => "unexpected_error",
    }
}
