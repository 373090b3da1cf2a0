//! Response validator: pure logic, no database access.
//!
//! Takes the question rules of one survey plus the answers a respondent
//! proposed, and either produces the normalized answer set to store or the
//! first [`RejectionReason`] encountered. Running it twice on the same input
//! gives the same result.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::RejectionReason;
use crate::status::QuestionType;
use crate::types::DbId;

/// Inclusive bounds of a rating answer.
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the validator needs to know about one question.
#[derive(Debug, Clone)]
pub struct QuestionRules {
    pub id: DbId,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub max_text_length: i32,
    /// IDs of the question's current choices (empty for text/rating).
    pub choice_ids: Vec<DbId>,
}

/// One answer as submitted by a respondent.
///
/// Only the field matching the question's type is looked at; the others are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposedAnswer {
    #[serde(rename = "question")]
    pub question_id: DbId,
    #[serde(default)]
    pub selected_choices: Option<Vec<DbId>>,
    #[serde(default)]
    pub text_answer: Option<String>,
    #[serde(default)]
    pub rating_value: Option<i64>,
}

/// The single populated value of a stored answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// Selected choice IDs, de-duplicated, in submission order.
    Choices(Vec<DbId>),
    Text(String),
    Rating(i16),
}

/// An accepted answer ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAnswer {
    pub question_id: DbId,
    pub value: AnswerValue,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a proposed answer set against a survey's questions.
///
/// Checks run in this order:
///
/// 1. every required question has an answer with a non-empty value
/// 2. per proposed answer, in submission order: the question belongs to the
///    survey, it is not answered twice, then the type-specific checks
///
/// Optional questions answered with an empty value produce no answer.
pub fn validate_submission(
    questions: &[QuestionRules],
    proposed: &[ProposedAnswer],
) -> Result<Vec<ValidatedAnswer>, RejectionReason> {
    let by_id: HashMap<DbId, &QuestionRules> = questions.iter().map(|q| (q.id, q)).collect();

    for question in questions.iter().filter(|q| q.is_required) {
        let answered = proposed
            .iter()
            .any(|a| a.question_id == question.id && has_value(question.question_type, a));
        if !answered {
            return Err(RejectionReason::MissingRequiredQuestion);
        }
    }

    let mut seen = HashSet::with_capacity(proposed.len());
    let mut accepted = Vec::with_capacity(proposed.len());

    for answer in proposed {
        let question = by_id
            .get(&answer.question_id)
            .ok_or(RejectionReason::ForeignQuestion)?;
        if !seen.insert(answer.question_id) {
            return Err(RejectionReason::DuplicateAnswer);
        }
        if let Some(value) = normalize(question, answer)? {
            accepted.push(ValidatedAnswer {
                question_id: question.id,
                value,
            });
        }
    }

    Ok(accepted)
}

/// Whether the proposed answer carries a non-empty value for `question_type`.
fn has_value(question_type: QuestionType, answer: &ProposedAnswer) -> bool {
    match question_type {
        QuestionType::Single | QuestionType::Multiple => answer
            .selected_choices
            .as_ref()
            .is_some_and(|ids| !ids.is_empty()),
        QuestionType::Text => answer
            .text_answer
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty()),
        QuestionType::Rating => answer.rating_value.is_some(),
    }
}

fn normalize(
    question: &QuestionRules,
    answer: &ProposedAnswer,
) -> Result<Option<AnswerValue>, RejectionReason> {
    match question.question_type {
        QuestionType::Single | QuestionType::Multiple => normalize_choices(question, answer),
        QuestionType::Text => normalize_text(question, answer),
        QuestionType::Rating => normalize_rating(answer),
    }
}

fn normalize_choices(
    question: &QuestionRules,
    answer: &ProposedAnswer,
) -> Result<Option<AnswerValue>, RejectionReason> {
    let Some(selected) = answer.selected_choices.as_ref() else {
        return Ok(None);
    };

    if selected.iter().any(|id| !question.choice_ids.contains(id)) {
        return Err(RejectionReason::InvalidChoice);
    }

    if question.question_type == QuestionType::Single && selected.len() != 1 {
        return Err(RejectionReason::WrongChoiceCount);
    }

    if selected.is_empty() {
        return Ok(None);
    }

    let mut seen = HashSet::with_capacity(selected.len());
    let ids: Vec<DbId> = selected.iter().copied().filter(|id| seen.insert(*id)).collect();
    Ok(Some(AnswerValue::Choices(ids)))
}

fn normalize_text(
    question: &QuestionRules,
    answer: &ProposedAnswer,
) -> Result<Option<AnswerValue>, RejectionReason> {
    let Some(text) = answer.text_answer.as_deref() else {
        return Ok(None);
    };

    let max = usize::try_from(question.max_text_length).unwrap_or(0);
    if text.chars().count() > max {
        return Err(RejectionReason::TextTooLong);
    }

    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(AnswerValue::Text(text.to_string())))
}

fn normalize_rating(answer: &ProposedAnswer) -> Result<Option<AnswerValue>, RejectionReason> {
    let Some(rating) = answer.rating_value else {
        return Ok(None);
    };
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(RejectionReason::RatingOutOfRange);
    }
    // In range, so the narrowing cannot truncate.
    Ok(Some(AnswerValue::Rating(rating as i16)))
}
