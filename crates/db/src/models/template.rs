//! Survey template model.

use quickvote_core::status::SurveyVisibility;
use quickvote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::question::CreateQuestion;
use super::survey::CreateSurvey;

/// A row from the `survey_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyTemplate {
    pub id: DbId,
    pub title: String,
    /// One of `satisfaction`, `marketing`, `education`, `feedback`.
    pub category: String,
    pub description: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// The stored blueprint. Everything is optional; title and description fall
/// back to the template's own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<SurveyVisibility>,
    pub welcome_message: Option<String>,
    pub thank_you_message: Option<String>,
    #[serde(default)]
    pub questions: Vec<CreateQuestion>,
}

impl SurveyTemplate {
    /// The create body for a new active survey built from this template.
    pub fn to_create_survey(&self) -> Result<CreateSurvey, serde_json::Error> {
        let payload: TemplatePayload = serde_json::from_value(self.payload.clone())?;
        Ok(CreateSurvey {
            title: payload.title.unwrap_or_else(|| self.title.clone()),
            description: Some(payload.description.unwrap_or_else(|| self.description.clone())),
            visibility: payload.visibility,
            status: None,
            ends_at: None,
            welcome_message: payload.welcome_message,
            thank_you_message: payload.thank_you_message,
            questions: payload.questions,
        })
    }
}
