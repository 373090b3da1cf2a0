//! Repository for the `survey_templates` table.

use quickvote_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::SurveyTemplate;

/// Column list for the `survey_templates` table.
const COLUMNS: &str = "id, title, category, description, payload, created_at";

/// Read-only access to the seeded templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Every template, grouped by category.
    pub async fn list(pool: &PgPool) -> Result<Vec<SurveyTemplate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM survey_templates ORDER BY category ASC, id ASC");
        sqlx::query_as::<_, SurveyTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SurveyTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM survey_templates WHERE id = $1");
        sqlx::query_as::<_, SurveyTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
