//! Question and choice models.

use quickvote_core::answers::QuestionRules;
use quickvote_core::statistics::{ChoiceInfo, QuestionInfo};
use quickvote_core::status::{QuestionType, StatusId};
use quickvote_core::survey::DEFAULT_MAX_TEXT_LENGTH;
use quickvote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::lookup;

/// A row from the `questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: DbId,
    pub survey_id: DbId,
    pub text: String,
    #[serde(rename = "type", serialize_with = "lookup::question_type")]
    pub type_id: StatusId,
    pub is_required: bool,
    pub sort_order: i32,
    pub max_text_length: i32,
    pub created_at: Timestamp,
}

/// A row from the `choices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Choice {
    pub id: DbId,
    pub question_id: DbId,
    pub label: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// A question with its choices in display order.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionWithChoices {
    #[serde(flatten)]
    pub question: Question,
    #[serde(skip)]
    pub question_type: QuestionType,
    pub choices: Vec<Choice>,
}

impl QuestionWithChoices {
    /// Resolve the lookup id; fails on an id the enum does not know.
    pub fn new(question: Question, choices: Vec<Choice>) -> Result<Self, sqlx::Error> {
        let question_type = QuestionType::from_id(question.type_id)
            .ok_or_else(|| lookup::unknown_id("question_types", question.type_id))?;
        Ok(Self {
            question,
            question_type,
            choices,
        })
    }

    /// The rules the response validator checks answers against.
    pub fn rules(&self) -> QuestionRules {
        QuestionRules {
            id: self.question.id,
            question_type: self.question_type,
            is_required: self.question.is_required,
            max_text_length: self.question.max_text_length,
            choice_ids: self.choices.iter().map(|c| c.id).collect(),
        }
    }

    /// The shape the statistics aggregator and exporter consume.
    pub fn info(&self) -> QuestionInfo {
        QuestionInfo {
            id: self.question.id,
            text: self.question.text.clone(),
            question_type: self.question_type,
            sort_order: self.question.sort_order,
            choices: self
                .choices
                .iter()
                .map(|c| ChoiceInfo {
                    id: c.id,
                    label: c.label.clone(),
                    sort_order: c.sort_order,
                })
                .collect(),
        }
    }
}

/// DTO for one question of a new or replaced survey structure.
///
/// `sort_order` comes from the position in the list.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestion {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Defaults to true.
    pub is_required: Option<bool>,
    /// Defaults to 1000 characters. Only meaningful for text questions.
    pub max_text_length: Option<i32>,
    #[validate(nested)]
    #[serde(default)]
    pub choices: Vec<CreateChoice>,
}

impl CreateQuestion {
    pub fn max_text_length_or_default(&self) -> i32 {
        self.max_text_length.unwrap_or(DEFAULT_MAX_TEXT_LENGTH)
    }
}

/// DTO for one choice; `sort_order` comes from the position in the list.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChoice {
    #[validate(length(min = 1, max = 200))]
    pub label: String,
}
