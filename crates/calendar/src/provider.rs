use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Normalized calendar-creation request.
///
/// Callers validate before constructing: non-empty person, resolved start
/// time, positive duration. Only schedule intents ever produce one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub person: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// Provider-side result. `event_id` is a stable opaque identifier, present
/// only on success, sufficient for later reference or cancellation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl EventOutcome {
    pub fn created(event_id: String, message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), event_id: Some(event_id) }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), event_id: None }
    }
}

/// Boundary to the platform calendar integration.
///
/// Implementations may fail for provider-side reasons (permissions,
/// availability, conflicts) and report that through the outcome; they
/// never panic or error across this boundary.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn create_event(&self, request: &EventRequest) -> EventOutcome;
}

/// In-process provider used when no native integration is configured.
/// Always accepts the event and hands back a fresh identifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalCalendarProvider;

#[async_trait]
impl CalendarProvider for LocalCalendarProvider {
    async fn create_event(&self, request: &EventRequest) -> EventOutcome {
        let event_id = Uuid::new_v4().to_string();
        info!(
            event_name = "egress.calendar.event_created",
            event_id = %event_id,
            person = %request.person,
            start_time = %request.start_time.to_rfc3339(),
            duration_minutes = request.duration_minutes,
            "calendar event created"
        );

        EventOutcome::created(
            event_id,
            format!(
                "Scheduled {} minutes with {} at {}",
                request.duration_minutes,
                request.person,
                request.start_time.to_rfc3339()
            ),
        )
    }
}
