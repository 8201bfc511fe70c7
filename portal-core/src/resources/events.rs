use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::info;

use super::{check_success, take_item, take_list};
use crate::client::ApiClient;
use crate::endpoints;
use crate::error::PortalError;
use crate::http::Transport;
use crate::session::SessionStorage;
use crate::validation::{check_time_range, is_blank, is_blank_opt, parse_time};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Meeting,
    Lecture,
    Exam,
    Assignment,
    Deadline,
    #[default]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Meeting,
        EventType::Lecture,
        EventType::Exam,
        EventType::Assignment,
        EventType::Deadline,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Meeting => "meeting",
            EventType::Lecture => "lecture",
            EventType::Exam => "exam",
            EventType::Assignment => "assignment",
            EventType::Deadline => "deadline",
            EventType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Meeting => "Meeting",
            EventType::Lecture => "Lecture",
            EventType::Exam => "Exam",
            EventType::Assignment => "Assignment",
            EventType::Deadline => "Deadline",
            EventType::Other => "Other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl EventPriority {
    pub const ALL: [EventPriority; 4] = [
        EventPriority::Low,
        EventPriority::Medium,
        EventPriority::High,
        EventPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventPriority::Low => "low",
            EventPriority::Medium => "medium",
            EventPriority::High => "high",
            EventPriority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventPriority::Low => "Low",
            EventPriority::Medium => "Medium",
            EventPriority::High => "High",
            EventPriority::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCreator {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

/// A calendar entry. Create and update responses only carry id, title and
/// date, so everything else defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creator: Option<EventCreator>,
    pub assigned_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub priority: EventPriority,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Event {
    pub fn start(&self) -> Option<NaiveTime> {
        self.start_time.as_deref().and_then(parse_time)
    }

    pub fn end(&self) -> Option<NaiveTime> {
        self.end_time.as_deref().and_then(parse_time)
    }

    /// "09:00", "09:00 - 10:30" or "All day".
    pub fn time_label(&self) -> String {
        if self.is_all_day {
            return "All day".to_string();
        }
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => {
                format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            (Some(start), None) => start.format("%H:%M").to_string(),
            _ => "All day".to_string(),
        }
    }

    pub fn is_created_by(&self, user_id: i64) -> bool {
        self.creator.as_ref().is_some_and(|c| c.id == user_id)
    }
}

/// Body for event create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub assigned_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub event_type: EventType,
    pub priority: EventPriority,
    pub location: String,
    pub is_all_day: bool,
    pub is_recurring: bool,
}

impl EventDraft {
    pub fn from_event(event: &Event) -> Self {
        let hhmm = |t: Option<NaiveTime>| t.map(|t| t.format("%H:%M").to_string());
        Self {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            assigned_date: event.assigned_date.format("%Y-%m-%d").to_string(),
            start_time: hhmm(event.start()),
            end_time: hhmm(event.end()),
            event_type: event.event_type,
            priority: event.priority,
            location: event.location.clone().unwrap_or_default(),
            is_all_day: event.is_all_day,
            is_recurring: event.is_recurring,
        }
    }

    /// Blank times become absent, and all-day events carry no times.
    pub fn normalized(&self) -> Self {
        let keep = |t: &Option<String>| {
            if self.is_all_day || is_blank_opt(t.as_deref()) {
                None
            } else {
                t.as_ref().map(|t| t.trim().to_string())
            }
        };
        Self {
            title: self.title.trim().to_string(),
            start_time: keep(&self.start_time),
            end_time: keep(&self.end_time),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        if is_blank(&self.title) || is_blank(&self.assigned_date) {
            return Err(PortalError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        NaiveDate::parse_from_str(self.assigned_date.trim(), "%Y-%m-%d").map_err(|_| {
            PortalError::Validation("Invalid date format. Use YYYY-MM-DD".to_string())
        })?;
        if self.is_all_day {
            return Ok(());
        }
        check_time_range(self.start_time.as_deref(), self.end_time.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventController {
    events: Vec<Event>,
}

impl EventController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn set_events(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    pub fn find(&self, id: i64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub async fn load<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
    ) -> Result<&[Event], PortalError> {
        let value: Value = client.get(endpoints::EVENTS).await?;
        self.events = take_list(value, &["events", "results"], "Failed to load events")?;
        info!("Loaded {} events", self.events.len());
        Ok(&self.events)
    }

    pub async fn fetch<T: Transport, S: SessionStorage>(
        &self,
        client: &ApiClient<T, S>,
        id: i64,
    ) -> Result<Event, PortalError> {
        let value: Value = client.get(&endpoints::event_detail(id)).await?;
        take_item(value, "event", "Failed to load event")
    }

    /// Create an event, then reload the list since the reply is abbreviated.
    pub async fn create<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        draft: &EventDraft,
    ) -> Result<i64, PortalError> {
        let draft = draft.normalized();
        draft.validate()?;
        let value: Value = client.post(endpoints::EVENT_CREATE, &draft).await?;
        let created: Event = take_item(value, "event", "Failed to save event")?;
        info!("Created event '{}' ({})", created.title, created.id);
        self.load(client).await?;
        Ok(created.id)
    }

    pub async fn update<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
        draft: &EventDraft,
    ) -> Result<(), PortalError> {
        let draft = draft.normalized();
        draft.validate()?;
        let value: Value = client.put(&endpoints::event_update(id), &draft).await?;
        check_success(&value, "Failed to save event")?;
        self.load(client).await?;
        Ok(())
    }

    pub async fn delete<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
    ) -> Result<(), PortalError> {
        let value: Value = client.delete(&endpoints::event_delete(id)).await?;
        check_success(&value, "Failed to delete event")?;
        self.events.retain(|e| e.id != id);
        info!("Deleted event {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_draft() -> EventDraft {
        EventDraft {
            title: "Midterm".into(),
            assigned_date: "2024-05-14".into(),
            start_time: Some("10:00".into()),
            end_time: Some("12:00".into()),
            event_type: EventType::Exam,
            ..EventDraft::default()
        }
    }

    #[test]
    fn test_abbreviated_event_deserializes() {
        let event: Event = serde_json::from_value(json!({
            "id": 9,
            "title": "Midterm",
            "assigned_date": "2024-05-14"
        }))
        .unwrap();
        assert_eq!(event.event_type, EventType::Other);
        assert_eq!(event.priority, EventPriority::Medium);
        assert_eq!(event.time_label(), "All day");
    }

    #[test]
    fn test_time_label() {
        let event: Event = serde_json::from_value(json!({
            "id": 1,
            "title": "Lecture",
            "assigned_date": "2024-05-01",
            "start_time": "09:00:00",
            "end_time": "10:30:00",
            "creator": {"id": 4, "email": "p@uni.edu", "full_name": "P Q"}
        }))
        .unwrap();
        assert_eq!(event.time_label(), "09:00 - 10:30");
        assert!(event.is_created_by(4));
        assert!(!event.is_created_by(5));
    }

    #[test]
    fn test_draft_validation() {
        assert!(make_draft().validate().is_ok());

        let mut draft = make_draft();
        draft.end_time = Some("09:00".into());
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "End time must be after start time");

        let mut draft = make_draft();
        draft.assigned_date = "14/05/2024".into();
        assert!(matches!(draft.validate(), Err(PortalError::Validation(_))));

        let mut draft = make_draft();
        draft.title = " ".into();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_all_day_drops_times() {
        let mut draft = make_draft();
        draft.is_all_day = true;
        draft.end_time = Some("09:00".into());
        let normalized = draft.normalized();
        assert!(normalized.start_time.is_none());
        assert!(normalized.end_time.is_none());
        assert!(normalized.validate().is_ok());

        let body = serde_json::to_value(&normalized).unwrap();
        assert!(body["start_time"].is_null());
        assert_eq!(body["event_type"], "exam");
    }

    #[test]
    fn test_blank_times_are_absent() {
        let mut draft = make_draft();
        draft.start_time = Some("".into());
        draft.end_time = Some(" ".into());
        let normalized = draft.normalized();
        assert!(normalized.start_time.is_none());
        assert!(normalized.end_time.is_none());
    }
}
