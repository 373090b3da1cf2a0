//! Handlers for the `/surveys` resource: authoring and the public view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use quickvote_core::error::CoreError;
use quickvote_core::roles::is_admin;
use quickvote_core::status::SurveyStatus;
use quickvote_core::survey::{is_structurally_frozen, validate_ends_at, validate_questions};
use quickvote_db::models::question::QuestionWithChoices;
use quickvote_db::models::survey::{
    question_outlines, CreateSurvey, PublicSurvey, Survey, UpdateSurvey,
};
use quickvote_db::repositories::{QuestionRepo, ResponseRepo, SurveyRepo};
use quickvote_db::DbPool;
use quickvote_events::bus::{SURVEY_CLOSED, SURVEY_CREATED};
use quickvote_events::SurveyEvent;
use serde::Serialize;
use validator::Validate;

use super::{find_managed_survey, find_survey};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A survey as its owner sees it.
#[derive(Debug, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: Survey,
    pub is_active: bool,
    /// Questions and choices can no longer change.
    pub is_frozen: bool,
    pub response_count: i64,
    pub questions: Vec<QuestionWithChoices>,
}

pub(crate) async fn load_detail(pool: &DbPool, survey: Survey) -> AppResult<SurveyDetail> {
    let response_count = ResponseRepo::count_for_survey(pool, survey.id).await?;
    let questions = QuestionRepo::list_with_choices(pool, survey.id).await?;
    Ok(SurveyDetail {
        is_active: survey.is_active(Utc::now()),
        is_frozen: is_structurally_frozen(response_count),
        response_count,
        questions,
        survey,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/surveys
///
/// The caller's own surveys; admins see every survey.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let surveys = if is_admin(&user.role) {
        SurveyRepo::list_all(&state.pool).await?
    } else {
        SurveyRepo::list_by_owner(&state.pool, user.user_id).await?
    };
    Ok(Json(DataResponse { data: surveys }))
}

/// POST /api/v1/surveys
///
/// Create a survey with its questions and choices.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateSurvey>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_questions(&input.outlines())?;
    validate_ends_at(input.ends_at, Utc::now())?;

    let survey = SurveyRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(survey_id = survey.id, owner_id = user.user_id, "Survey created");
    state.event_bus.publish(
        SurveyEvent::new(SURVEY_CREATED, survey.id)
            .with_actor(Some(user.user_id))
            .with_payload(serde_json::json!({ "slug": survey.slug, "title": survey.title })),
    );

    let detail = load_detail(&state.pool, survey).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/surveys/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;
    let detail = load_detail(&state.pool, survey).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/surveys/{slug}
///
/// Without responses every field may change and `questions` replaces the
/// structure. Once responses exist only `description`, `ends_at`, and
/// `status` are applied; other fields are ignored. `"ends_at": null`
/// removes the deadline.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(input): Json<UpdateSurvey>,
) -> AppResult<impl IntoResponse> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;
    input.validate()?;
    validate_ends_at(input.ends_at.flatten(), Utc::now())?;

    let response_count = ResponseRepo::count_for_survey(&state.pool, survey.id).await?;
    if let Some(questions) = &input.questions {
        if !is_structurally_frozen(response_count) {
            validate_questions(&question_outlines(questions))?;
        }
    }

    let updated = SurveyRepo::update(&state.pool, survey.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id: survey.id,
        }))?;
    if updated.frozen && input.touches_structure() {
        tracing::debug!(
            survey_id = survey.id,
            "Survey has responses; structural fields were ignored",
        );
    }

    let detail = load_detail(&state.pool, updated.survey).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/surveys/{slug}
///
/// Removes the survey with its questions, responses, and notification rules.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;
    if SurveyRepo::delete(&state.pool, survey.id).await? {
        tracing::info!(survey_id = survey.id, "Survey deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id: survey.id,
        }))
    }
}

/// POST /api/v1/surveys/{slug}/close
pub async fn close(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;
    let closed = SurveyRepo::close(&state.pool, survey.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id: survey.id,
        }))?;
    state.event_bus.publish(
        SurveyEvent::new(SURVEY_CLOSED, closed.id).with_actor(Some(user.user_id)),
    );

    let detail = load_detail(&state.pool, closed).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/surveys/{slug}/public
///
/// What a respondent sees before answering. Drafts are not visible.
pub async fn public_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let survey = find_survey(&state.pool, &slug).await?;
    if survey.status() == SurveyStatus::Draft {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Survey",
            key: slug,
        }));
    }

    let participants_count = ResponseRepo::count_for_survey(&state.pool, survey.id).await?;
    let questions = QuestionRepo::list_with_choices(&state.pool, survey.id).await?;
    let view = PublicSurvey {
        is_active: survey.is_active(Utc::now()),
        slug: survey.slug,
        title: survey.title,
        description: survey.description,
        visibility: survey.visibility_id,
        ends_at: survey.ends_at,
        welcome_message: survey.welcome_message,
        participants_count,
        questions,
    };
    Ok(Json(DataResponse { data: view }))
}
