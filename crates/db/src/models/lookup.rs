//! Serialize SMALLINT lookup ids by their API name.
//!
//! Rows keep the raw id so they map straight onto the table; responses show
//! `"active"` rather than `2`. Unknown ids fall back to the number.

use quickvote_core::status::{QuestionType, StatusId, SurveyStatus, SurveyVisibility};
use serde::{Serialize, Serializer};

pub fn survey_status<S: Serializer>(id: &StatusId, s: S) -> Result<S::Ok, S::Error> {
    match SurveyStatus::from_id(*id) {
        Some(status) => status.serialize(s),
        None => s.serialize_i16(*id),
    }
}

pub fn survey_visibility<S: Serializer>(id: &StatusId, s: S) -> Result<S::Ok, S::Error> {
    match SurveyVisibility::from_id(*id) {
        Some(visibility) => visibility.serialize(s),
        None => s.serialize_i16(*id),
    }
}

pub fn question_type<S: Serializer>(id: &StatusId, s: S) -> Result<S::Ok, S::Error> {
    match QuestionType::from_id(*id) {
        Some(question_type) => question_type.serialize(s),
        None => s.serialize_i16(*id),
    }
}

/// Map an unknown lookup id to a decode error.
pub(crate) fn unknown_id(table: &str, id: StatusId) -> sqlx::Error {
    sqlx::Error::Decode(format!("unknown {table} id {id}").into())
}
