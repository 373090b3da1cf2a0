//! Survey lifecycle rules: activity, anonymity, structure checks, and the
//! freeze that applies once a survey has responses.

use crate::error::CoreError;
use crate::status::{QuestionType, SurveyStatus, SurveyVisibility};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default maximum length (in characters) of a free-text answer.
pub const DEFAULT_MAX_TEXT_LENGTH: i32 = 1000;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// A survey accepts responses when its status is active and its expiry (if
/// any) has not passed yet.
pub fn is_active(status: SurveyStatus, ends_at: Option<Timestamp>, now: Timestamp) -> bool {
    if status != SurveyStatus::Active {
        return false;
    }
    match ends_at {
        Some(ends_at) => ends_at > now,
        None => true,
    }
}

/// Whether a new response is recorded as anonymous.
///
/// Anonymous-visibility surveys always produce anonymous responses; public
/// surveys only when nobody is signed in.
pub fn is_anonymous_response(visibility: SurveyVisibility, has_identity: bool) -> bool {
    visibility == SurveyVisibility::Anonymous || !has_identity
}

/// Once any response exists the question and choice structure is frozen.
pub fn is_structurally_frozen(response_count: i64) -> bool {
    response_count > 0
}

// ---------------------------------------------------------------------------
// Structure validation
// ---------------------------------------------------------------------------

/// Minimal view of a question being created, enough to check structure.
#[derive(Debug, Clone, Copy)]
pub struct QuestionOutline<'a> {
    pub text: &'a str,
    pub question_type: QuestionType,
    pub choice_count: usize,
    pub max_text_length: Option<i32>,
}

/// Validate the question list of a new (or fully replaced) survey.
///
/// At least one question is required, and every choice-type question must
/// offer at least one choice.
pub fn validate_questions(questions: &[QuestionOutline<'_>]) -> Result<(), CoreError> {
    if questions.is_empty() {
        return Err(CoreError::Validation(
            "A survey needs at least one question".to_string(),
        ));
    }

    for (index, question) in questions.iter().enumerate() {
        if question.question_type.has_choices() && question.choice_count == 0 {
            let label = if question.text.trim().is_empty() {
                format!("Question {}", index + 1)
            } else {
                question.text.to_string()
            };
            return Err(CoreError::Validation(format!(
                "Question '{label}' must offer at least one choice"
            )));
        }
        if let Some(max) = question.max_text_length {
            if max < 1 {
                return Err(CoreError::Validation(format!(
                    "max_text_length must be positive, got {max}"
                )));
            }
        }
    }

    Ok(())
}

/// An expiry supplied on create or update must lie in the future.
pub fn validate_ends_at(ends_at: Option<Timestamp>, now: Timestamp) -> Result<(), CoreError> {
    match ends_at {
        Some(ends_at) if ends_at <= now => Err(CoreError::Validation(
            "ends_at must be in the future".to_string(),
        )),
        _ => Ok(()),
    }
}
