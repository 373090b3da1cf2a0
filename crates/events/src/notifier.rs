//! Threshold and closing-soon alerts raised after each committed response.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use quickvote_core::error::CoreError;
use quickvote_core::notify::{closing_soon, threshold_message, thresholds_reached, ResponseNotifier};
use quickvote_core::types::DbId;
use quickvote_db::repositories::{NotificationRuleRepo, SurveyRepo};
use quickvote_db::DbPool;

use crate::bus::{EventBus, SurveyEvent, CLOSING_SOON, RESPONSE_RECORDED, THRESHOLD_REACHED};

/// Evaluates a survey's notification rules against its new response total.
///
/// A rule whose threshold has been reached gets a `notifications` row and a
/// [`THRESHOLD_REACHED`] event; the row's unique key on the rule keeps it
/// from firing twice. A survey ending within the next 12 hours raises
/// [`CLOSING_SOON`] on every response.
pub struct ThresholdNotifier {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl ThresholdNotifier {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }
}

#[async_trait]
impl ResponseNotifier for ThresholdNotifier {
    async fn response_recorded(
        &self,
        survey_id: DbId,
        total_responses: i64,
    ) -> Result<(), CoreError> {
        let survey = SurveyRepo::find_by_id(&self.pool, survey_id)
            .await
            .map_err(internal)?
            .ok_or(CoreError::NotFound {
                entity: "Survey",
                id: survey_id,
            })?;

        self.bus.publish(
            SurveyEvent::new(RESPONSE_RECORDED, survey_id)
                .with_payload(serde_json::json!({ "total_responses": total_responses })),
        );

        let rules = NotificationRuleRepo::list_for_survey(&self.pool, survey_id)
            .await
            .map_err(internal)?;
        let candidates: Vec<_> = rules.iter().map(|r| r.as_threshold_rule()).collect();

        for fired in thresholds_reached(&candidates, total_responses) {
            let message = threshold_message(&survey.title, total_responses);
            let recorded = NotificationRuleRepo::record_firing(
                &self.pool,
                fired.id,
                total_responses,
                &message,
            )
            .await
            .map_err(internal)?;

            // Lost the race to a concurrent submission.
            let Some(notification) = recorded else {
                continue;
            };
            let recipient = rules
                .iter()
                .find(|r| r.id == fired.id)
                .map(|r| r.recipient_email.clone())
                .unwrap_or_default();

            tracing::info!(
                survey_id,
                rule_id = fired.id,
                threshold = fired.threshold,
                total_responses,
                "Response threshold reached",
            );
            self.bus.publish(
                SurveyEvent::new(THRESHOLD_REACHED, survey_id).with_payload(serde_json::json!({
                    "notification_id": notification.id,
                    "rule_id": fired.id,
                    "threshold": fired.threshold,
                    "recipient_email": recipient,
                    "total_responses": total_responses,
                    "message": message,
                })),
            );
        }

        if closing_soon(survey.ends_at, Utc::now()) {
            self.bus.publish(
                SurveyEvent::new(CLOSING_SOON, survey_id)
                    .with_actor(Some(survey.owner_id))
                    .with_payload(serde_json::json!({
                        "title": survey.title,
                        "ends_at": survey.ends_at,
                    })),
            );
        }

        Ok(())
    }
}

fn internal(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("Notification lookup failed: {e}"))
}
