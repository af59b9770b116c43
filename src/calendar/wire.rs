//! Google Calendar v3 wire types and their mapping onto domain records.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CalendarColors, CalendarSummary, EventRecord, EventTime};

/// Field selection for calendar list pages: exactly what [`CalendarSummary`] needs.
pub const CALENDAR_LIST_FIELDS: &str =
    "nextPageToken,items(id,summary,description,primary,accessRole,backgroundColor,foregroundColor,timeZone)";

/// Conference solution requested for new meetings.
pub const MEET_CONFERENCE_TYPE: &str = "hangoutsMeet";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListPage {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub primary: Option<bool>,
    pub access_role: Option<String>,
    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    pub time_zone: Option<String>,
}

impl From<CalendarListEntry> for CalendarSummary {
    fn from(entry: CalendarListEntry) -> Self {
        let title = entry.summary.unwrap_or_else(|| entry.id.clone());
        Self {
            id: entry.id,
            title,
            description: entry.description,
            is_primary: entry.primary.unwrap_or(false),
            access_role: entry.access_role,
            colors: CalendarColors {
                background: entry.background_color,
                foreground: entry.foreground_color,
            },
            time_zone: entry.time_zone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_event_time")]
    pub start: Option<EventTime>,
    #[serde(default, deserialize_with = "lenient_event_time")]
    pub end: Option<EventTime>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub html_link: Option<String>,
    pub hangout_link: Option<String>,
    pub conference_data: Option<ConferenceData>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub entry_point_type: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Attendee {
    pub email: Option<String>,
}

impl GoogleEvent {
    /// Normalize into an [`EventRecord`] tagged with the calendar it came from.
    pub fn into_record(self, calendar_id: &str) -> EventRecord {
        let meet_link = self.hangout_link.or_else(|| {
            self.conference_data.and_then(|data| {
                data.entry_points
                    .into_iter()
                    .find(|ep| ep.entry_point_type.as_deref() == Some("video"))
                    .and_then(|ep| ep.uri)
            })
        });

        EventRecord {
            id: self.id,
            title: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "No Title".to_string()),
            description: self.description.unwrap_or_default(),
            start: self.start,
            end: self.end,
            location: self.location.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            created_at: self.created,
            updated_at: self.updated,
            link: self.html_link,
            calendar_id: calendar_id.to_string(),
            meet_link,
            attendees: self
                .attendees
                .into_iter()
                .filter_map(|a| a.email)
                .filter(|e| !e.trim().is_empty())
                .collect(),
        }
    }
}

/// Boundaries the provider sends as `{}` (or not at all) become `None`
/// instead of failing the whole page.
fn lenient_event_time<'de, D>(deserializer: D) -> Result<Option<EventTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Body of an events-insert request for a meeting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventBody {
    pub summary: String,
    pub description: String,
    pub start: EventDateTimeBody,
    pub end: EventDateTimeBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<AttendeeBody>>,
    pub conference_data: ConferenceDataRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTimeBody {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Serialize)]
pub struct AttendeeBody {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceDataRequest {
    pub create_request: CreateConferenceRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
    pub request_id: String,
    pub conference_solution_key: ConferenceSolutionKey,
}

#[derive(Debug, Serialize)]
pub struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_calendar_entry_mapping() {
        let entry: CalendarListEntry = serde_json::from_value(json!({
            "id": "team@group.calendar.google.com",
            "summary": "Team",
            "accessRole": "writer",
            "backgroundColor": "#9fe1e7",
            "foregroundColor": "#000000",
            "timeZone": "Europe/Oslo"
        }))
        .unwrap();

        let summary = CalendarSummary::from(entry);
        assert_eq!(summary.title, "Team");
        assert!(!summary.is_primary);
        assert_eq!(summary.access_role.as_deref(), Some("writer"));
        assert_eq!(summary.colors.background.as_deref(), Some("#9fe1e7"));
    }

    #[test]
    fn test_event_defaults_and_meet_link() {
        let event: GoogleEvent = serde_json::from_value(json!({
            "id": "evt1",
            "start": {"date": "2025-01-02"},
            "end": {},
            "conferenceData": {
                "entryPoints": [
                    {"entryPointType": "phone", "uri": "tel:+1-555"},
                    {"entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij"}
                ]
            },
            "attendees": [{"email": "a@example.com"}, {"displayName": "No Email"}]
        }))
        .unwrap();

        let record = event.into_record("primary");
        assert_eq!(record.title, "No Title");
        assert_eq!(record.description, "");
        assert!(record.start.as_ref().unwrap().is_all_day());
        assert!(record.end.is_none());
        assert_eq!(record.meet_link.as_deref(), Some("https://meet.google.com/abc-defg-hij"));
        assert_eq!(record.attendees, vec!["a@example.com".to_string()]);
        assert_eq!(record.calendar_id, "primary");
    }

    #[test]
    fn test_new_event_body_shape() {
        let body = NewEventBody {
            summary: "Sync".to_string(),
            description: String::new(),
            start: EventDateTimeBody {
                date_time: "2024-12-25T10:00:00".to_string(),
                time_zone: "UTC".to_string(),
            },
            end: EventDateTimeBody {
                date_time: "2024-12-25T11:00:00".to_string(),
                time_zone: "UTC".to_string(),
            },
            attendees: None,
            conference_data: ConferenceDataRequest {
                create_request: CreateConferenceRequest {
                    request_id: "meet-20241201120000".to_string(),
                    conference_solution_key: ConferenceSolutionKey {
                        kind: MEET_CONFERENCE_TYPE.to_string(),
                    },
                },
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["start"]["dateTime"], "2024-12-25T10:00:00");
        assert_eq!(value["start"]["timeZone"], "UTC");
        assert_eq!(value["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"], "hangoutsMeet");
        assert!(value.get("attendees").is_none());
    }
}
