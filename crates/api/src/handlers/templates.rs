//! Handlers for survey templates: browse, then create a survey from one.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quickvote_core::error::CoreError;
use quickvote_core::survey::validate_questions;
use quickvote_core::types::DbId;
use quickvote_db::models::template::SurveyTemplate;
use quickvote_db::repositories::{SurveyRepo, TemplateRepo};
use quickvote_db::DbPool;
use quickvote_events::bus::SURVEY_CREATED;
use quickvote_events::SurveyEvent;
use validator::Validate;

use super::surveys::load_detail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_template(pool: &DbPool, id: DbId) -> AppResult<SurveyTemplate> {
    TemplateRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SurveyTemplate",
            id,
        }))
}

/// GET /api/v1/templates
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = find_template(&state.pool, id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/templates/{id}/instantiate
///
/// Creates an active survey owned by the caller from the template's payload.
/// The payload goes through the same checks as a hand-written create body.
pub async fn instantiate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = find_template(&state.pool, id).await?;
    let input = template.to_create_survey().map_err(|e| {
        AppError::InternalError(format!("Template {id} has an unreadable payload: {e}"))
    })?;
    input.validate()?;
    validate_questions(&input.outlines())?;

    let survey = SurveyRepo::create_from_template(&state.pool, user.user_id, &input).await?;
    tracing::info!(
        survey_id = survey.id,
        template_id = id,
        owner_id = user.user_id,
        "Survey created from template",
    );
    state.event_bus.publish(
        SurveyEvent::new(SURVEY_CREATED, survey.id)
            .with_actor(Some(user.user_id))
            .with_payload(serde_json::json!({
                "slug": survey.slug,
                "title": survey.title,
                "template_id": id,
            })),
    );

    let detail = load_detail(&state.pool, survey).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}
