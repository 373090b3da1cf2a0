use serde::Serialize;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} with key {key}")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Submission rejected: {0}")]
    Rejected(RejectionReason),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RejectionReason> for CoreError {
    fn from(reason: RejectionReason) -> Self {
        CoreError::Rejected(reason)
    }
}

/// Broad class of a submission rejection.
///
/// Validation rejections depend only on the submitted input; state conflicts
/// depend on what is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    Validation,
    StateConflict,
}

/// Why a response submission was refused. Nothing is written when any of
/// these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    #[error("a required question was not answered")]
    MissingRequiredQuestion,
    #[error("a selected choice does not belong to its question")]
    InvalidChoice,
    #[error("a single-choice question needs exactly one selected choice")]
    WrongChoiceCount,
    #[error("text answer exceeds the question's maximum length")]
    TextTooLong,
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
    #[error("answer refers to a question outside this survey")]
    ForeignQuestion,
    #[error("the same question was answered more than once")]
    DuplicateAnswer,
    #[error("survey is not accepting responses")]
    SurveyInactive,
    #[error("a response from this respondent already exists")]
    DuplicateResponse,
}

impl RejectionReason {
    /// Stable machine-readable code, e.g. `"missing-required-question"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingRequiredQuestion => "missing-required-question",
            Self::InvalidChoice => "invalid-choice",
            Self::WrongChoiceCount => "wrong-choice-count",
            Self::TextTooLong => "text-too-long",
            Self::RatingOutOfRange => "rating-out-of-range",
            Self::ForeignQuestion => "foreign-question",
            Self::DuplicateAnswer => "duplicate-answer",
            Self::SurveyInactive => "survey-inactive",
            Self::DuplicateResponse => "duplicate-response",
        }
    }

    pub fn kind(self) -> RejectionKind {
        match self {
            Self::SurveyInactive | Self::DuplicateResponse => RejectionKind::StateConflict,
            _ => RejectionKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_conflicts_are_distinct_from_validation() {
        assert_eq!(
            RejectionReason::DuplicateResponse.kind(),
            RejectionKind::StateConflict
        );
        assert_eq!(
            RejectionReason::SurveyInactive.kind(),
            RejectionKind::StateConflict
        );
        assert_eq!(
            RejectionReason::InvalidChoice.kind(),
            RejectionKind::Validation
        );
        assert_eq!(
            RejectionReason::ForeignQuestion.kind(),
            RejectionKind::Validation
        );
    }

    #[test]
    fn serialized_reason_matches_code() {
        let reasons = [
            RejectionReason::MissingRequiredQuestion,
            RejectionReason::InvalidChoice,
            RejectionReason::WrongChoiceCount,
            RejectionReason::TextTooLong,
            RejectionReason::RatingOutOfRange,
            RejectionReason::ForeignQuestion,
            RejectionReason::DuplicateAnswer,
            RejectionReason::SurveyInactive,
            RejectionReason::DuplicateResponse,
        ];
        for reason in reasons {
            let json = serde_json::to_value(reason).unwrap();
            assert_eq!(json, reason.code());
        }
    }

    #[test]
    fn rejection_converts_into_core_error() {
        let err: CoreError = RejectionReason::TextTooLong.into();
        assert!(matches!(
            err,
            CoreError::Rejected(RejectionReason::TextTooLong)
        ));
        assert!(err.to_string().contains("maximum length"));
    }
}
