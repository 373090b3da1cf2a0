//! Repository for the `responses`, `answers`, and `answer_choices` tables.

use std::collections::HashMap;

use quickvote_core::answers::{AnswerValue, ValidatedAnswer};
use quickvote_core::statistics::AnswerRecord;
use quickvote_core::types::DbId;
use sqlx::PgPool;

use crate::is_unique_violation;
use crate::models::response::{
    structure_mismatch, AnswerRow, NewResponse, RecordOutcome, Response,
};

/// Column list for the `responses` table.
const COLUMNS: &str = "id, survey_id, respondent_id, is_anonymous, submitted_at, \
    duration_seconds, ip_address, user_agent";

/// Unique constraint guarding one response per identified respondent.
pub const UQ_SURVEY_RESPONDENT: &str = "uq_responses_survey_respondent";

/// Records and reads survey responses.
pub struct ResponseRepo;

impl ResponseRepo {
    /// Whether the respondent already has a response for the survey.
    pub async fn exists_for_respondent(
        pool: &PgPool,
        survey_id: DbId,
        respondent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM responses WHERE survey_id = $1 AND respondent_id = $2)",
        )
        .bind(survey_id)
        .bind(respondent_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Insert a response with all of its answers and choice links in one
    /// transaction.
    ///
    /// A unique violation on [`UQ_SURVEY_RESPONDENT`] means another
    /// submission from the same respondent won the race; the transaction is
    /// rolled back and [`RecordOutcome::Duplicate`] is returned.
    ///
    /// The survey row is share-locked first, so a structure replacement
    /// cannot interleave. Answers validated against a structure that was
    /// replaced since come back as [`RecordOutcome::Rejected`] with nothing
    /// written. A survey deleted in between yields `RowNotFound`.
    pub async fn record(
        pool: &PgPool,
        response: &NewResponse,
        answers: &[ValidatedAnswer],
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM surveys WHERE id = $1 FOR SHARE")
                .bind(response.survey_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(sqlx::Error::RowNotFound);
        }

        let structure: HashMap<DbId, Vec<DbId>> = sqlx::query_as::<_, (DbId, Vec<DbId>)>(
            "SELECT q.id, \
                    COALESCE( \
                        ARRAY_AGG(c.id) FILTER (WHERE c.id IS NOT NULL), \
                        ARRAY[]::BIGINT[] \
                    ) \
             FROM questions q \
             LEFT JOIN choices c ON c.question_id = q.id \
             WHERE q.survey_id = $1 \
             GROUP BY q.id",
        )
        .bind(response.survey_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        if let Some(reason) = structure_mismatch(answers, &structure) {
            tracing::debug!(
                survey_id = response.survey_id,
                reason = reason.code(),
                "Survey structure changed after validation",
            );
            return Ok(RecordOutcome::Rejected(reason));
        }

        let query = format!(
            "INSERT INTO responses \
                (survey_id, respondent_id, is_anonymous, duration_seconds, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Response>(&query)
            .bind(response.survey_id)
            .bind(response.respondent_id)
            .bind(response.is_anonymous)
            .bind(response.duration_seconds)
            .bind(&response.ip_address)
            .bind(&response.user_agent)
            .fetch_one(&mut *tx)
            .await;

        let created = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e, UQ_SURVEY_RESPONDENT) => {
                tracing::debug!(
                    survey_id = response.survey_id,
                    respondent_id = ?response.respondent_id,
                    "Concurrent duplicate response rejected by constraint",
                );
                return Ok(RecordOutcome::Duplicate);
            }
            Err(e) => return Err(e),
        };

        for answer in answers {
            let (text, rating, choice_ids): (Option<&str>, Option<i16>, &[DbId]) =
                match &answer.value {
                    AnswerValue::Choices(ids) => (None, None, ids.as_slice()),
                    AnswerValue::Text(text) => (Some(text.as_str()), None, &[][..]),
                    AnswerValue::Rating(value) => (None, Some(*value), &[][..]),
                };

            let (answer_id,): (DbId,) = sqlx::query_as(
                "INSERT INTO answers (response_id, question_id, text_answer, rating_value) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id",
            )
            .bind(created.id)
            .bind(answer.question_id)
            .bind(text)
            .bind(rating)
            .fetch_one(&mut *tx)
            .await?;

            if !choice_ids.is_empty() {
                sqlx::query(
                    "INSERT INTO answer_choices (answer_id, choice_id) \
                     SELECT $1, UNNEST($2::BIGINT[])",
                )
                .bind(answer_id)
                .bind(choice_ids)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(RecordOutcome::Created(created))
    }

    /// Number of committed responses for a survey.
    pub async fn count_for_survey(pool: &PgPool, survey_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM responses WHERE survey_id = $1")
            .bind(survey_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Every answer of a survey with its selected choice ids, in creation order.
    pub async fn list_answers_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<AnswerRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AnswerRow>(
            "SELECT a.id, a.question_id, a.text_answer, a.rating_value, \
                    COALESCE( \
                        ARRAY_AGG(ac.choice_id ORDER BY ac.choice_id) \
                            FILTER (WHERE ac.choice_id IS NOT NULL), \
                        ARRAY[]::BIGINT[] \
                    ) AS choice_ids \
             FROM answers a \
             JOIN responses r ON r.id = a.response_id \
             LEFT JOIN answer_choices ac ON ac.answer_id = a.id \
             WHERE r.survey_id = $1 \
             GROUP BY a.id \
             ORDER BY a.id",
        )
        .bind(survey_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(AnswerRecord::from).collect())
    }
}
