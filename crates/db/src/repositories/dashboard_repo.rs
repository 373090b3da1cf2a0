//! Read-only aggregate queries for the dashboard.
//!
//! "Active" here matches `Survey::is_active`: status active and the expiry,
//! if any, still ahead.

use quickvote_core::status::SurveyStatus;
use quickvote_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{OwnerSummary, RecentResponse, SystemSummary, TopSurvey};

/// Provides dashboard aggregates.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Counts across every survey owned by `owner_id`.
    pub async fn owner_summary(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<OwnerSummary, sqlx::Error> {
        sqlx::query_as::<_, OwnerSummary>(
            "SELECT \
                 (SELECT COUNT(*) FROM surveys \
                  WHERE owner_id = $1 AND status_id = $2 \
                    AND (ends_at IS NULL OR ends_at > NOW())) AS active_surveys, \
                 COUNT(r.id) AS responses_count, \
                 COUNT(DISTINCT r.respondent_id) AS participants \
             FROM responses r \
             JOIN surveys s ON s.id = r.survey_id \
             WHERE s.owner_id = $1",
        )
        .bind(owner_id)
        .bind(SurveyStatus::Active.id())
        .fetch_one(pool)
        .await
    }

    /// The newest responses to the owner's surveys.
    pub async fn recent_responses(
        pool: &PgPool,
        owner_id: DbId,
        limit: i64,
    ) -> Result<Vec<RecentResponse>, sqlx::Error> {
        sqlx::query_as::<_, RecentResponse>(
            "SELECT r.id AS response_id, s.slug AS survey_slug, s.title AS survey_title, \
                    CASE WHEN r.is_anonymous THEN NULL ELSE r.respondent_id END AS respondent_id, \
                    r.is_anonymous, r.submitted_at \
             FROM responses r \
             JOIN surveys s ON s.id = r.survey_id \
             WHERE s.owner_id = $1 \
             ORDER BY r.submitted_at DESC, r.id DESC \
             LIMIT $2",
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Active surveys and last-week responses across all owners.
    pub async fn system_summary(pool: &PgPool) -> Result<SystemSummary, sqlx::Error> {
        sqlx::query_as::<_, SystemSummary>(
            "SELECT \
                 (SELECT COUNT(*) FROM surveys \
                  WHERE status_id = $1 AND (ends_at IS NULL OR ends_at > NOW())) \
                     AS active_surveys, \
                 (SELECT COUNT(*) FROM responses \
                  WHERE submitted_at >= NOW() - INTERVAL '7 days') \
                     AS responses_last_7_days",
        )
        .bind(SurveyStatus::Active.id())
        .fetch_one(pool)
        .await
    }

    /// Surveys with the most responses, ties broken by newest survey.
    pub async fn top_surveys(pool: &PgPool, limit: i64) -> Result<Vec<TopSurvey>, sqlx::Error> {
        sqlx::query_as::<_, TopSurvey>(
            "SELECT s.slug, s.title, s.owner_id, COUNT(r.id) AS responses \
             FROM surveys s \
             LEFT JOIN responses r ON r.survey_id = s.id \
             GROUP BY s.id \
             ORDER BY responses DESC, s.id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
