//! Handlers for submitting responses and reading their aggregates.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quickvote_core::access::can_view_statistics;
use quickvote_core::export::{export_rows, rows_to_csv};
use quickvote_core::statistics::{build_statistics, QuestionInfo, SurveyStatistics};
use quickvote_db::models::survey::Survey;
use quickvote_db::repositories::{QuestionRepo, ResponseRepo};
use quickvote_db::DbPool;

use super::{find_managed_survey, find_survey, survey_not_found};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::submission::{submit_response, ClientMeta, SubmissionRequest};

async fn load_statistics(pool: &DbPool, survey: &Survey) -> AppResult<SurveyStatistics> {
    let total = ResponseRepo::count_for_survey(pool, survey.id).await?;
    let questions: Vec<QuestionInfo> = QuestionRepo::list_with_choices(pool, survey.id)
        .await?
        .iter()
        .map(|q| q.info())
        .collect();
    let answers = ResponseRepo::list_answers_for_survey(pool, survey.id).await?;
    Ok(build_statistics(total, &questions, &answers))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/surveys/{slug}/responses
///
/// Open to anonymous callers. A signed-in caller may respond once per survey.
pub async fn submit(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(slug): Path<String>,
    meta: ClientMeta,
    Json(request): Json<SubmissionRequest>,
) -> AppResult<impl IntoResponse> {
    let survey = find_survey(&state.pool, &slug).await?;
    let receipt = submit_response(
        &state.pool,
        state.notifier.as_ref(),
        &survey,
        caller.user_id(),
        &request,
        meta,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: receipt })))
}

/// GET /api/v1/surveys/{slug}/statistics
///
/// Owners and admins always; participants only on anonymous surveys.
pub async fn statistics(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let survey = find_survey(&state.pool, &slug).await?;

    let has_responded = match caller.user_id() {
        Some(user_id) => {
            ResponseRepo::exists_for_respondent(&state.pool, survey.id, user_id).await?
        }
        None => false,
    };
    if !can_view_statistics(
        caller.viewer(),
        survey.owner_id,
        survey.visibility(),
        has_responded,
    ) {
        return Err(survey_not_found(&slug));
    }

    let stats = load_statistics(&state.pool, &survey).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/surveys/{slug}/export/{fmt}
///
/// `json` returns the statistics payload, `csv` one row per answer.
pub async fn export(
    State(state): State<AppState>,
    user: AuthUser,
    Path((slug, fmt)): Path<(String, String)>,
) -> AppResult<Response> {
    let survey = find_managed_survey(&state.pool, &slug, &user).await?;

    match fmt.as_str() {
        "json" => {
            let stats = load_statistics(&state.pool, &survey).await?;
            Ok(Json(DataResponse { data: stats }).into_response())
        }
        "csv" => {
            let questions: Vec<QuestionInfo> =
                QuestionRepo::list_with_choices(&state.pool, survey.id)
                    .await?
                    .iter()
                    .map(|q| q.info())
                    .collect();
            let answers = ResponseRepo::list_answers_for_survey(&state.pool, survey.id).await?;
            let csv = rows_to_csv(&export_rows(&questions, &answers));

            tracing::info!(survey_id = survey.id, user_id = user.user_id, "Survey exported as CSV");
            let disposition = format!("attachment; filename=\"survey_{}.csv\"", survey.slug);
            Ok((
                [
                    (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        other => Err(AppError::BadRequest(format!(
            "Unsupported export format '{other}'. Expected 'json' or 'csv'"
        ))),
    }
}
