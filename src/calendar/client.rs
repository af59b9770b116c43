//! Google Calendar REST client.

use std::collections::HashSet;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Response};

use super::wire::{
    AttendeeBody, CalendarListPage, ConferenceDataRequest, ConferenceSolutionKey,
    CreateConferenceRequest, EventDateTimeBody, EventsPage, GoogleEvent, NewEventBody,
    CALENDAR_LIST_FIELDS, MEET_CONFERENCE_TYPE,
};
use super::{cancel_error_kind, listing_error_kind, EventQuery, NewMeeting};
use crate::auth::{Credential, CredentialSource};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::CalendarError;
use crate::types::{CalendarSummary, EventList, EventRecord, OperationResult};

/// Characters escaped in URL path segments (calendar ids contain `@` and `#`).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Upper bound on calendar list pages fetched in one listing.
const MAX_CALENDAR_PAGES: usize = 100;

/// Client for the calendar provider.
pub struct CalendarClient {
    http: Client,
    api_base: String,
    credentials: Arc<dyn CredentialSource>,
    clock: Arc<dyn Clock>,
}

impl CalendarClient {
    /// Create a client against `api_base` (e.g. `https://www.googleapis.com/calendar/v3`).
    pub fn new(
        http: Client,
        api_base: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
            clock,
        }
    }

    /// Build a client from the process configuration.
    pub fn from_config(
        config: &Config,
        http: Client,
        credentials: Arc<dyn CredentialSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(http, config.provider.api_base.as_str(), credentials, clock)
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            utf8_percent_encode(calendar_id, PATH_SEGMENT)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            utf8_percent_encode(event_id, PATH_SEGMENT)
        )
    }

    async fn credential(&self) -> Result<Credential, CalendarError> {
        Ok(self.credentials.resolve().await?)
    }

    /// List every calendar visible to the account, following pagination.
    ///
    /// Order is whatever the provider returns; the primary calendar is not
    /// guaranteed to come first.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarSummary>, CalendarError> {
        let credential = self.credential().await?;
        let url = format!("{}/users/me/calendarList", self.api_base);

        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(credential.access_token())
                .query(&[("fields", CALENDAR_LIST_FIELDS)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = check_status(request.send().await?).await?;
            let page: CalendarListPage = response
                .json()
                .await
                .map_err(|e| CalendarError::Decode(e.to_string()))?;
            pages += 1;

            calendars.extend(page.items.into_iter().map(CalendarSummary::from));

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            let Some(token) = &page_token else {
                break;
            };
            if !seen_tokens.insert(token.clone()) {
                tracing::warn!(pages, "Provider repeated a page token, stopping pagination");
                break;
            }
            if pages >= MAX_CALENDAR_PAGES {
                tracing::warn!(pages, "Calendar list page limit reached");
                break;
            }
        }

        tracing::debug!(pages, count = calendars.len(), "Fetched calendar list");
        Ok(calendars)
    }

    /// List events of one calendar, recurring events expanded, sorted by start.
    ///
    /// Never fails: provider and auth failures are reported in the result.
    pub async fn list_events(&self, query: &EventQuery) -> OperationResult<EventList> {
        if query.max_results == 0 {
            return OperationResult::ok(EventList::empty(), "Retrieved 0 events successfully");
        }

        match self.fetch_events(query).await {
            Ok(events) => {
                let message = format!("Retrieved {} events successfully", events.len());
                OperationResult::ok(EventList::new(events), message)
            }
            Err(e) => {
                tracing::error!(calendar_id = %query.calendar_id, error = %e, "Failed to list events");
                let message = match &e {
                    CalendarError::Remote { .. } => format!("HTTP error occurred: {e}"),
                    _ => format!("Unexpected error occurred: {e}"),
                };
                OperationResult::fail(listing_error_kind(&e), message)
            }
        }
    }

    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, CalendarError> {
        let credential = self.credential().await?;

        let mut params = vec![
            ("maxResults", query.max_results.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(time_min) = &query.time_min {
            params.push(("timeMin", time_min.clone()));
        }
        if let Some(time_max) = &query.time_max {
            params.push(("timeMax", time_max.clone()));
        }

        let url = self.events_url(&query.calendar_id);
        tracing::debug!(calendar_id = %query.calendar_id, ?params, "Fetching events");

        let response = self
            .http
            .get(&url)
            .bearer_auth(credential.access_token())
            .query(&params)
            .send()
            .await?;
        let page: EventsPage = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Decode(e.to_string()))?;

        let mut events: Vec<EventRecord> = page
            .items
            .into_iter()
            .map(|event| event.into_record(&query.calendar_id))
            .collect();
        // Stable, so provider order is kept for equal starts.
        events.sort_by_key(EventRecord::start_key);
        Ok(events)
    }

    /// Create a meeting with an auto-generated video conference.
    ///
    /// Returns `None` on any failure, local or remote; the cause is logged.
    /// An empty summary is rejected before any remote call.
    pub async fn create_meeting_event(&self, meeting: &NewMeeting) -> Option<EventRecord> {
        if meeting.summary.trim().is_empty() {
            tracing::warn!("Refusing to create an event without a summary");
            return None;
        }

        match self.insert_meeting(meeting).await {
            Ok(event) => {
                tracing::info!(event_id = %event.id, calendar_id = %meeting.calendar_id, "Created meeting");
                Some(event)
            }
            Err(e) => {
                tracing::error!(calendar_id = %meeting.calendar_id, error = %e, "Failed to create meeting");
                None
            }
        }
    }

    /// Conference request id. Stable for one insert call so provider-side
    /// retries of that call do not create a second conference.
    fn conference_request_id(&self) -> String {
        format!("meet-{}", self.clock.now().format("%Y%m%d%H%M%S"))
    }

    fn meeting_body(&self, meeting: &NewMeeting) -> NewEventBody {
        let attendees: Vec<AttendeeBody> = meeting
            .attendees
            .iter()
            .map(|email| email.trim())
            .filter(|email| !email.is_empty())
            .map(|email| AttendeeBody {
                email: email.to_string(),
            })
            .collect();

        NewEventBody {
            summary: meeting.summary.clone(),
            description: meeting.description.clone(),
            start: EventDateTimeBody {
                date_time: meeting.start.clone(),
                time_zone: meeting.timezone.clone(),
            },
            end: EventDateTimeBody {
                date_time: meeting.end.clone(),
                time_zone: meeting.timezone.clone(),
            },
            attendees: (!attendees.is_empty()).then_some(attendees),
            conference_data: ConferenceDataRequest {
                create_request: CreateConferenceRequest {
                    request_id: self.conference_request_id(),
                    conference_solution_key: ConferenceSolutionKey {
                        kind: MEET_CONFERENCE_TYPE.to_string(),
                    },
                },
            },
        }
    }

    async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<EventRecord, CalendarError> {
        let credential = self.credential().await?;
        let body = self.meeting_body(meeting);

        let response = self
            .http
            .post(self.events_url(&meeting.calendar_id))
            .bearer_auth(credential.access_token())
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .json(&body)
            .send()
            .await?;
        let created: GoogleEvent = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Decode(e.to_string()))?;

        Ok(created.into_record(&meeting.calendar_id))
    }

    /// Delete an event, notifying attendees.
    ///
    /// Cancelling an event that is already gone reports `event_not_found`
    /// every time, so the failure shape is the same on repeat.
    pub async fn cancel_event(&self, calendar_id: &str, event_id: &str) -> OperationResult<()> {
        if event_id.trim().is_empty() {
            return OperationResult::fail("invalid_event_id", "Event id is required");
        }

        match self.delete_event(calendar_id, event_id).await {
            Ok(()) => {
                tracing::info!(event_id, calendar_id, "Cancelled event");
                OperationResult::ok((), format!("Event {event_id} successfully cancelled"))
            }
            Err(e) => {
                let kind = cancel_error_kind(&e);
                tracing::error!(event_id, calendar_id, error = %e, kind, "Failed to cancel event");
                let message = match kind {
                    "event_not_found" => format!("Event not found: {event_id}"),
                    "permission_denied" => "Insufficient permissions to cancel this event".to_string(),
                    "http_error" => format!("HTTP error occurred: {e}"),
                    _ => format!("Unexpected error occurred: {e}"),
                };
                OperationResult::fail(kind, message)
            }
        }
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), CalendarError> {
        let credential = self.credential().await?;

        let response = self
            .http
            .delete(self.event_url(calendar_id, event_id))
            .bearer_auth(credential.access_token())
            .query(&[("sendUpdates", "all")])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`CalendarError::Remote`].
async fn check_status(response: Response) -> Result<Response, CalendarError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let raw_message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(CalendarError::Remote {
        status: status.as_u16(),
        raw_message,
    })
}
