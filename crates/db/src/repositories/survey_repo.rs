//! Repository for the `surveys`, `questions`, and `choices` tables.

use quickvote_core::status::SurveyStatus;
use quickvote_core::survey::is_structurally_frozen;
use quickvote_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::question::CreateQuestion;
use crate::models::survey::{CreateSurvey, Survey, UpdateSurvey};

/// Column list for the `surveys` table.
const COLUMNS: &str = "id, slug, owner_id, title, description, visibility_id, status_id, \
    ends_at, welcome_message, thank_you_message, is_template_based, created_at, updated_at";

/// Result of [`SurveyRepo::update`].
#[derive(Debug, Clone)]
pub struct SurveyUpdate {
    pub survey: Survey,
    /// Responses existed, so only the frozen-editable fields were applied.
    pub frozen: bool,
}

/// Provides CRUD operations for surveys and their question structure.
pub struct SurveyRepo;

impl SurveyRepo {
    /// Insert a survey and its questions and choices in one transaction.
    ///
    /// Question and choice `sort_order` values are their list positions.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateSurvey,
    ) -> Result<Survey, sqlx::Error> {
        Self::insert(pool, owner_id, input, false).await
    }

    /// Like [`SurveyRepo::create`], marking the survey as template-based.
    pub async fn create_from_template(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateSurvey,
    ) -> Result<Survey, sqlx::Error> {
        Self::insert(pool, owner_id, input, true).await
    }

    async fn insert(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateSurvey,
        is_template_based: bool,
    ) -> Result<Survey, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO surveys \
                (slug, owner_id, title, description, visibility_id, status_id, ends_at, \
                 welcome_message, thank_you_message, is_template_based) \
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, 1), COALESCE($6, 2), $7, \
                     COALESCE($8, ''), COALESCE($9, ''), $10) \
             RETURNING {COLUMNS}"
        );
        let survey = sqlx::query_as::<_, Survey>(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.visibility.map(|v| v.id()))
            .bind(input.status.map(|s| s.id()))
            .bind(input.ends_at)
            .bind(&input.welcome_message)
            .bind(&input.thank_you_message)
            .bind(is_template_based)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_questions_inner(&mut tx, survey.id, &input.questions).await?;

        tx.commit().await?;
        tracing::debug!(survey_id = survey.id, slug = %survey.slug, "Survey created");
        Ok(survey)
    }

    /// Find a survey by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE id = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a survey by its public slug.
    pub async fn find_by_slug(pool: &PgPool, slug: Uuid) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE slug = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List surveys owned by a user, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM surveys WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List every survey, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Survey>(&query).fetch_all(pool).await
    }

    /// Update a survey. Only non-`None` fields in `input` are applied.
    ///
    /// The survey row is locked for the duration of the transaction, which
    /// also blocks concurrent response inserts (they take a key-share lock
    /// through the foreign key). If any response exists, `input` is cut down
    /// to the frozen-editable fields before anything is written. Otherwise a
    /// supplied question list replaces the structure wholesale.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSurvey,
    ) -> Result<Option<SurveyUpdate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM surveys WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let (response_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM responses WHERE survey_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        let frozen = is_structurally_frozen(response_count);
        let restricted;
        let effective = if frozen {
            restricted = input.restricted_to_frozen();
            &restricted
        } else {
            input
        };

        // `ends_at` may be cleared: $6 says whether it was supplied at all.
        let query = format!(
            "UPDATE surveys SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                visibility_id = COALESCE($4, visibility_id), \
                status_id = COALESCE($5, status_id), \
                ends_at = CASE WHEN $6 THEN $7 ELSE ends_at END, \
                welcome_message = COALESCE($8, welcome_message), \
                thank_you_message = COALESCE($9, thank_you_message) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let survey = sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(&effective.title)
            .bind(&effective.description)
            .bind(effective.visibility.map(|v| v.id()))
            .bind(effective.status.map(|s| s.id()))
            .bind(effective.ends_at.is_some())
            .bind(effective.ends_at.flatten())
            .bind(&effective.welcome_message)
            .bind(&effective.thank_you_message)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(questions) = &effective.questions {
            sqlx::query("DELETE FROM questions WHERE survey_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_questions_inner(&mut tx, id, questions).await?;
        }

        tx.commit().await?;
        Ok(Some(SurveyUpdate { survey, frozen }))
    }

    /// Set the status to closed. Returns `None` if no row exists.
    pub async fn close(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("UPDATE surveys SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(SurveyStatus::Closed.id())
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a survey and, by cascade, everything under it.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Insert questions and their choices within an existing transaction.
    async fn insert_questions_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
        questions: &[CreateQuestion],
    ) -> Result<(), sqlx::Error> {
        for (position, question) in questions.iter().enumerate() {
            let (question_id,): (DbId,) = sqlx::query_as(
                "INSERT INTO questions \
                    (survey_id, text, type_id, is_required, sort_order, max_text_length) \
                 VALUES ($1, $2, $3, COALESCE($4, true), $5, $6) \
                 RETURNING id",
            )
            .bind(survey_id)
            .bind(&question.text)
            .bind(question.question_type.id())
            .bind(question.is_required)
            .bind(position as i32)
            .bind(question.max_text_length_or_default())
            .fetch_one(&mut **tx)
            .await?;

            if !question.question_type.has_choices() {
                continue;
            }
            for (choice_position, choice) in question.choices.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO choices (question_id, label, sort_order) VALUES ($1, $2, $3)",
                )
                .bind(question_id)
                .bind(&choice.label)
                .bind(choice_position as i32)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}
