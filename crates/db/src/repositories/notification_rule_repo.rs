//! Repository for the `notification_rules` and `notifications` tables.

use quickvote_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{CreateNotificationRule, Notification, NotificationRule};

/// Column list for `notification_rules`, with the computed `has_fired` flag.
const COLUMNS: &str = "r.id, r.survey_id, r.threshold, r.recipient_email, r.created_at, \
    EXISTS(SELECT 1 FROM notifications n WHERE n.rule_id = r.id) AS has_fired";

/// Column list for the `notifications` table.
const NOTIFICATION_COLUMNS: &str = "id, rule_id, total_responses, message, sent_at";

/// Provides CRUD operations for notification rules and their firings.
pub struct NotificationRuleRepo;

impl NotificationRuleRepo {
    /// Insert a new rule for a survey.
    pub async fn create(
        pool: &PgPool,
        survey_id: DbId,
        input: &CreateNotificationRule,
    ) -> Result<NotificationRule, sqlx::Error> {
        let query = format!(
            "WITH r AS ( \
                INSERT INTO notification_rules (survey_id, threshold, recipient_email) \
                VALUES ($1, $2, $3) \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM r"
        );
        sqlx::query_as::<_, NotificationRule>(&query)
            .bind(survey_id)
            .bind(input.threshold)
            .bind(&input.recipient_email)
            .fetch_one(pool)
            .await
    }

    /// List a survey's rules, lowest threshold first.
    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<NotificationRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_rules r \
             WHERE r.survey_id = $1 \
             ORDER BY r.threshold, r.id"
        );
        sqlx::query_as::<_, NotificationRule>(&query)
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a rule belonging to `survey_id`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, survey_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notification_rules WHERE id = $1 AND survey_id = $2")
            .bind(id)
            .bind(survey_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record that a rule fired.
    ///
    /// Returns `None` when the rule had already fired, so concurrent callers
    /// cannot fire the same rule twice.
    pub async fn record_firing(
        pool: &PgPool,
        rule_id: DbId,
        total_responses: i64,
        message: &str,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (rule_id, total_responses, message) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (rule_id) DO NOTHING \
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(rule_id)
            .bind(total_responses)
            .bind(message)
            .fetch_optional(pool)
            .await
    }

    /// List notifications fired for a survey's rules, oldest first.
    pub async fn list_notifications_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "SELECT n.id, n.rule_id, n.total_responses, n.message, n.sent_at \
             FROM notifications n \
             JOIN notification_rules r ON r.id = n.rule_id \
             WHERE r.survey_id = $1 \
             ORDER BY n.sent_at, n.id",
        )
        .bind(survey_id)
        .fetch_all(pool)
        .await
    }
}
