//! Handlers for a survey's response-count notification rules.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quickvote_core::error::CoreError;
use quickvote_core::notify::validate_threshold;
use quickvote_core::types::DbId;
use quickvote_db::models::notification::{
    CreateNotificationRule, Notification, NotificationRule,
};
use quickvote_db::repositories::NotificationRuleRepo;
use serde::Serialize;
use validator::Validate;

use super::find_managed_survey;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Rules together with the notifications they have produced.
#[derive(Debug, Serialize)]
pub struct RuleOverview {
    pub rules: Vec<NotificationRule>,
    pub notifications: Vec<Notification>,
}

/// GET /api/v1/surveys/{slug}/notification-rules
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;
    let rules = NotificationRuleRepo::list_for_survey(&state.pool, survey.id).await?;
    let notifications =
        NotificationRuleRepo::list_notifications_for_survey(&state.pool, survey.id).await?;
    Ok(Json(DataResponse {
        data: RuleOverview {
            rules,
            notifications,
        },
    }))
}

/// POST /api/v1/surveys/{slug}/notification-rules
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(input): Json<CreateNotificationRule>,
) -> AppResult<impl IntoResponse> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;
    validate_threshold(input.threshold)?;
    input.validate()?;

    let rule = NotificationRuleRepo::create(&state.pool, survey.id, &input).await?;
    tracing::info!(
        survey_id = survey.id,
        rule_id = rule.id,
        threshold = rule.threshold,
        "Notification rule created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// DELETE /api/v1/surveys/{slug}/notification-rules/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((slug, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;
    if NotificationRuleRepo::delete(&state.pool, survey.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "NotificationRule",
            id,
        }))
    }
}
