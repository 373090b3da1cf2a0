//! Notification rule and fired-notification models.

use quickvote_core::notify::ThresholdRule;
use quickvote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `notification_rules` table, with whether it has fired.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationRule {
    pub id: DbId,
    pub survey_id: DbId,
    pub threshold: i32,
    pub recipient_email: String,
    pub created_at: Timestamp,
    pub has_fired: bool,
}

impl NotificationRule {
    pub fn as_threshold_rule(&self) -> ThresholdRule {
        ThresholdRule {
            id: self.id,
            threshold: self.threshold,
            already_fired: self.has_fired,
        }
    }
}

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub rule_id: DbId,
    pub total_responses: i64,
    pub message: String,
    pub sent_at: Timestamp,
}

/// DTO for creating a notification rule.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNotificationRule {
    #[validate(range(min = 1))]
    pub threshold: i32,
    #[validate(email)]
    pub recipient_email: String,
}
