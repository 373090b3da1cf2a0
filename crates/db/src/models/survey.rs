//! Survey entity model and DTOs.

use quickvote_core::status::{StatusId, SurveyStatus, SurveyVisibility};
use quickvote_core::survey::{self, QuestionOutline};
use quickvote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::lookup;
use super::question::CreateQuestion;

/// A row from the `surveys` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Survey {
    pub id: DbId,
    pub slug: Uuid,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    #[serde(rename = "visibility", serialize_with = "lookup::survey_visibility")]
    pub visibility_id: StatusId,
    #[serde(rename = "status", serialize_with = "lookup::survey_status")]
    pub status_id: StatusId,
    pub ends_at: Option<Timestamp>,
    pub welcome_message: String,
    pub thank_you_message: String,
    /// Created from a survey template.
    pub is_template_based: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Survey {
    /// Lifecycle status. The foreign key guarantees a known id; anything else
    /// is treated as closed.
    pub fn status(&self) -> SurveyStatus {
        SurveyStatus::from_id(self.status_id).unwrap_or(SurveyStatus::Closed)
    }

    /// Respondent visibility. Unknown ids are treated as anonymous.
    pub fn visibility(&self) -> SurveyVisibility {
        SurveyVisibility::from_id(self.visibility_id).unwrap_or(SurveyVisibility::Anonymous)
    }

    /// Whether the survey accepts responses at `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        survey::is_active(self.status(), self.ends_at, now)
    }
}

/// DTO for creating a survey together with its questions and choices.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSurvey {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Defaults to anonymous.
    pub visibility: Option<SurveyVisibility>,
    /// Defaults to active.
    pub status: Option<SurveyStatus>,
    pub ends_at: Option<Timestamp>,
    #[validate(length(max = 255))]
    pub welcome_message: Option<String>,
    #[validate(length(max = 255))]
    pub thank_you_message: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub questions: Vec<CreateQuestion>,
}

impl CreateSurvey {
    pub fn outlines(&self) -> Vec<QuestionOutline<'_>> {
        question_outlines(&self.questions)
    }
}

/// DTO for updating a survey. All fields are optional.
///
/// `questions`, when present, replaces the whole question/choice structure.
/// `ends_at` distinguishes absent (keep) from `null` (clear).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSurvey {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub visibility: Option<SurveyVisibility>,
    pub status: Option<SurveyStatus>,
    #[serde(default, deserialize_with = "present")]
    pub ends_at: Option<Option<Timestamp>>,
    #[validate(length(max = 255))]
    pub welcome_message: Option<String>,
    #[validate(length(max = 255))]
    pub thank_you_message: Option<String>,
    #[validate(nested)]
    pub questions: Option<Vec<CreateQuestion>>,
}

impl UpdateSurvey {
    /// Keep only the fields that stay editable once responses exist
    /// (description, `ends_at`, status); everything else is dropped.
    pub fn restricted_to_frozen(&self) -> UpdateSurvey {
        UpdateSurvey {
            description: self.description.clone(),
            ends_at: self.ends_at,
            status: self.status,
            ..Default::default()
        }
    }

    /// Whether the update touches anything besides the frozen-editable fields.
    pub fn touches_structure(&self) -> bool {
        self.title.is_some()
            || self.visibility.is_some()
            || self.welcome_message.is_some()
            || self.thank_you_message.is_some()
            || self.questions.is_some()
    }
}

/// Wrap any present value, `null` included, in `Some`. Paired with
/// `#[serde(default)]` so an absent field stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Structural outline of each question, for the core structure checks.
pub fn question_outlines(questions: &[CreateQuestion]) -> Vec<QuestionOutline<'_>> {
    questions
        .iter()
        .map(|q| QuestionOutline {
            text: &q.text,
            question_type: q.question_type,
            choice_count: q.choices.len(),
            max_text_length: q.max_text_length,
        })
        .collect()
}

/// A survey as shown to respondents: structure plus participation count.
#[derive(Debug, Clone, Serialize)]
pub struct PublicSurvey {
    pub slug: Uuid,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "lookup::survey_visibility")]
    pub visibility: StatusId,
    pub ends_at: Option<Timestamp>,
    pub welcome_message: String,
    pub is_active: bool,
    pub participants_count: i64,
    pub questions: Vec<super::question::QuestionWithChoices>,
}
