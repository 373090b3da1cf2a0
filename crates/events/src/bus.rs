//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Share one [`EventBus`] via `Arc<EventBus>`; every subscriber sees every
//! published [`SurveyEvent`].

use chrono::Utc;
use quickvote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const SURVEY_CREATED: &str = "survey.created";
pub const SURVEY_CLOSED: &str = "survey.closed";
pub const RESPONSE_RECORDED: &str = "survey.response_recorded";
pub const THRESHOLD_REACHED: &str = "survey.threshold_reached";
pub const CLOSING_SOON: &str = "survey.closing_soon";

// ---------------------------------------------------------------------------
// SurveyEvent
// ---------------------------------------------------------------------------

/// Something that happened to a survey.
///
/// Built with [`SurveyEvent::new`] and the `with_*` builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyEvent {
    /// Dot-separated event name, e.g. `"survey.threshold_reached"`.
    pub event_type: String,

    pub survey_id: DbId,

    /// User that triggered the event, when known.
    pub actor_user_id: Option<DbId>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl SurveyEvent {
    pub fn new(event_type: impl Into<String>, survey_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            survey_id,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<SurveyEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers that fall more than `capacity` events behind observe
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped if nobody listens.
    pub fn publish(&self, event: SurveyEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SurveyEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
