//! Repository for reading the `questions` and `choices` of a survey.

use std::collections::HashMap;

use quickvote_core::types::DbId;
use sqlx::PgPool;

use crate::models::question::{Choice, Question, QuestionWithChoices};

/// Column list for the `questions` table.
const COLUMNS: &str =
    "id, survey_id, text, type_id, is_required, sort_order, max_text_length, created_at";

/// Column list for the `choices` table.
const CHOICE_COLUMNS: &str = "id, question_id, label, sort_order, created_at";

/// Read access to survey structure. Writes go through `SurveyRepo`, which
/// owns the transactional create/replace.
pub struct QuestionRepo;

impl QuestionRepo {
    /// List a survey's questions in display order.
    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions WHERE survey_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    /// List a survey's questions in display order, each with its choices in
    /// display order.
    pub async fn list_with_choices(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<QuestionWithChoices>, sqlx::Error> {
        let questions = Self::list_for_survey(pool, survey_id).await?;
        let question_ids: Vec<DbId> = questions.iter().map(|q| q.id).collect();

        let query = format!(
            "SELECT {CHOICE_COLUMNS} FROM choices \
             WHERE question_id = ANY($1) \
             ORDER BY sort_order, id"
        );
        let choices = sqlx::query_as::<_, Choice>(&query)
            .bind(&question_ids)
            .fetch_all(pool)
            .await?;

        let mut by_question: HashMap<DbId, Vec<Choice>> = HashMap::new();
        for choice in choices {
            by_question.entry(choice.question_id).or_default().push(choice);
        }

        questions
            .into_iter()
            .map(|question| {
                let choices = by_question.remove(&question.id).unwrap_or_default();
                QuestionWithChoices::new(question, choices)
            })
            .collect()
    }
}
