//! Aggregate rows behind the owner dashboard and the admin monitor.

use quickvote_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Headline counts across one owner's surveys.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct OwnerSummary {
    /// Surveys currently accepting responses.
    pub active_surveys: i64,
    pub responses_count: i64,
    /// Distinct identified respondents.
    pub participants: i64,
}

/// A recent response to one of the owner's surveys.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentResponse {
    pub response_id: DbId,
    pub survey_slug: Uuid,
    pub survey_title: String,
    /// Hidden for anonymous responses.
    pub respondent_id: Option<DbId>,
    pub is_anonymous: bool,
    pub submitted_at: Timestamp,
}

/// System-wide counts for administrators.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct SystemSummary {
    pub active_surveys: i64,
    pub responses_last_7_days: i64,
}

/// A survey ranked by its number of responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopSurvey {
    pub slug: Uuid,
    pub title: String,
    pub owner_id: DbId,
    pub responses: i64,
}
