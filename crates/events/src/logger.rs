//! Background subscriber that writes alert events to the log.
//!
//! Email delivery lives outside this service; a mail relay tails these log
//! lines (or subscribes to the bus directly).

use tokio::sync::broadcast;

use crate::bus::{SurveyEvent, CLOSING_SOON, THRESHOLD_REACHED};

pub struct EventLogger;

impl EventLogger {
    /// Run until the [`EventBus`](crate::bus::EventBus) is dropped.
    pub async fn run(mut receiver: broadcast::Receiver<SurveyEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => Self::log(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged, some events were skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
    }

    fn log(event: &SurveyEvent) {
        match event.event_type.as_str() {
            THRESHOLD_REACHED => tracing::info!(
                survey_id = event.survey_id,
                recipient = %event.payload["recipient_email"],
                message = %event.payload["message"],
                "Threshold notification ready for delivery",
            ),
            CLOSING_SOON => tracing::info!(
                survey_id = event.survey_id,
                owner_id = ?event.actor_user_id,
                ends_at = %event.payload["ends_at"],
                "Survey closing soon",
            ),
            other => tracing::debug!(survey_id = event.survey_id, event_type = other, "Event"),
        }
    }
}
