//! Request handlers.
//!
//! Handlers resolve the survey from its slug, apply the access policy, and
//! delegate to the repositories in `quickvote_db` (or the submission service).
//! Callers who may not see a survey get the same 404 as for a missing one.

pub mod dashboard;
pub mod notification_rules;
pub mod responses;
pub mod surveys;
pub mod templates;

use quickvote_core::access::can_manage_survey;
use quickvote_core::error::CoreError;
use quickvote_db::models::survey::Survey;
use quickvote_db::repositories::SurveyRepo;
use quickvote_db::DbPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

pub(crate) fn survey_not_found(slug: &str) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "Survey",
        key: slug.to_string(),
    })
}

/// Look up a survey by its slug. A malformed slug is simply not found.
pub(crate) async fn find_survey(pool: &DbPool, slug: &str) -> AppResult<Survey> {
    let parsed = Uuid::parse_str(slug).map_err(|_| survey_not_found(slug))?;
    SurveyRepo::find_by_slug(pool, parsed)
        .await?
        .ok_or_else(|| survey_not_found(slug))
}

/// Look up a survey the caller owns (or administers).
pub(crate) async fn find_managed_survey(
    pool: &DbPool,
    slug: &str,
    user: &AuthUser,
) -> AppResult<Survey> {
    let survey = find_survey(pool, slug).await?;
    if !can_manage_survey(user.viewer(), survey.owner_id) {
        return Err(survey_not_found(slug));
    }
    Ok(survey)
}
