//! Response and answer models.

use std::collections::HashMap;

use quickvote_core::answers::{AnswerValue, ValidatedAnswer};
use quickvote_core::error::RejectionReason;
use quickvote_core::statistics::AnswerRecord;
use quickvote_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// User agents longer than this many characters are truncated before storage.
pub const USER_AGENT_MAX_CHARS: usize = 500;

/// A row from the `responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Response {
    pub id: DbId,
    pub survey_id: DbId,
    pub respondent_id: Option<DbId>,
    pub is_anonymous: bool,
    pub submitted_at: Timestamp,
    pub duration_seconds: i32,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

/// Everything needed to insert a `responses` row.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub survey_id: DbId,
    /// `None` for anonymous submissions; those are never deduplicated.
    pub respondent_id: Option<DbId>,
    pub is_anonymous: bool,
    pub duration_seconds: i32,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl NewResponse {
    /// Build the row, truncating the user agent. A missing duration is
    /// stored as zero; negative durations are refused before this point.
    pub fn new(
        survey_id: DbId,
        respondent_id: Option<DbId>,
        is_anonymous: bool,
        duration_seconds: Option<i32>,
        ip_address: Option<String>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            survey_id,
            respondent_id,
            is_anonymous,
            duration_seconds: duration_seconds.unwrap_or(0),
            ip_address,
            user_agent: truncate_user_agent(user_agent.unwrap_or_default()),
        }
    }
}

/// Keep at most [`USER_AGENT_MAX_CHARS`] characters.
pub fn truncate_user_agent(user_agent: &str) -> String {
    user_agent.chars().take(USER_AGENT_MAX_CHARS).collect()
}

/// Result of recording a response.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Created(Response),
    /// The respondent already has a response for this survey; nothing was written.
    Duplicate,
    /// The answers no longer match the stored structure; nothing was written.
    Rejected(RejectionReason),
}

/// Check validated answers against the survey's current structure, given as
/// question id to choice ids.
pub fn structure_mismatch(
    answers: &[ValidatedAnswer],
    structure: &HashMap<DbId, Vec<DbId>>,
) -> Option<RejectionReason> {
    for answer in answers {
        let Some(choice_ids) = structure.get(&answer.question_id) else {
            return Some(RejectionReason::ForeignQuestion);
        };
        if let AnswerValue::Choices(selected) = &answer.value {
            if selected.iter().any(|id| !choice_ids.contains(id)) {
                return Some(RejectionReason::InvalidChoice);
            }
        }
    }
    None
}

/// One answer with its selected choice ids, as read for aggregation.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerRow {
    pub id: DbId,
    pub question_id: DbId,
    pub text_answer: Option<String>,
    pub rating_value: Option<i16>,
    pub choice_ids: Vec<DbId>,
}

impl From<AnswerRow> for AnswerRecord {
    fn from(row: AnswerRow) -> Self {
        AnswerRecord {
            id: row.id,
            question_id: row.question_id,
            text_answer: row.text_answer,
            rating_value: row.rating_value,
            choice_ids: row.choice_ids,
        }
    }
}
