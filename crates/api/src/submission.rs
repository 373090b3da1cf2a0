//! Response submission: validate, record, then notify.
//!
//! The order matters. Inactive surveys and known duplicates are turned away
//! before the answers are even looked at; the storage constraint catches the
//! duplicates the pre-check races past; the notifier only ever sees
//! committed responses and cannot fail the submission.

use chrono::Utc;
use quickvote_core::answers::{validate_submission, ProposedAnswer, QuestionRules};
use quickvote_core::error::{CoreError, RejectionReason};
use quickvote_core::notify::ResponseNotifier;
use quickvote_core::survey::is_anonymous_response;
use quickvote_core::types::DbId;
use quickvote_db::models::response::{NewResponse, RecordOutcome};
use quickvote_db::models::survey::Survey;
use quickvote_db::repositories::{QuestionRepo, ResponseRepo};
use quickvote_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;

/// Body of `POST /surveys/{slug}/responses`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub answers: Vec<ProposedAnswer>,
    /// Time spent answering. Omitted means zero; negative is refused.
    #[validate(range(min = 0))]
    pub duration_seconds: Option<i32>,
}

/// Request metadata captured with the response.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// What the respondent gets back.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub response_id: DbId,
    pub is_anonymous: bool,
    pub thank_you: String,
}

/// Validate and record one response to `survey`.
///
/// `respondent_id` is the signed-in caller, if any. It is stored even on
/// anonymous-visibility surveys so the one-response-per-user rule holds;
/// `is_anonymous` governs whether it is ever shown.
pub async fn submit_response(
    pool: &DbPool,
    notifier: &dyn ResponseNotifier,
    survey: &Survey,
    respondent_id: Option<DbId>,
    request: &SubmissionRequest,
    meta: ClientMeta,
) -> AppResult<SubmissionReceipt> {
    request.validate()?;

    if !survey.is_active(Utc::now()) {
        return Err(CoreError::from(RejectionReason::SurveyInactive).into());
    }

    if let Some(respondent_id) = respondent_id {
        if ResponseRepo::exists_for_respondent(pool, survey.id, respondent_id).await? {
            return Err(CoreError::from(RejectionReason::DuplicateResponse).into());
        }
    }

    let questions = QuestionRepo::list_with_choices(pool, survey.id).await?;
    let rules: Vec<QuestionRules> = questions.iter().map(|q| q.rules()).collect();
    let answers = validate_submission(&rules, &request.answers).map_err(CoreError::from)?;

    let is_anonymous = is_anonymous_response(survey.visibility(), respondent_id.is_some());
    let new_response = NewResponse::new(
        survey.id,
        respondent_id,
        is_anonymous,
        request.duration_seconds,
        meta.ip_address,
        meta.user_agent.as_deref(),
    );

    let response = match ResponseRepo::record(pool, &new_response, &answers).await? {
        RecordOutcome::Created(response) => response,
        RecordOutcome::Duplicate => {
            return Err(CoreError::from(RejectionReason::DuplicateResponse).into());
        }
        RecordOutcome::Rejected(reason) => return Err(CoreError::from(reason).into()),
    };

    tracing::info!(
        survey_id = survey.id,
        response_id = response.id,
        is_anonymous,
        answers = answers.len(),
        "Response recorded",
    );

    notify_after_commit(pool, notifier, survey.id).await;

    Ok(SubmissionReceipt {
        response_id: response.id,
        is_anonymous: response.is_anonymous,
        thank_you: survey.thank_you_message.clone(),
    })
}

/// Run the notifier for a committed response. Failures are logged only.
async fn notify_after_commit(pool: &DbPool, notifier: &dyn ResponseNotifier, survey_id: DbId) {
    let total = match ResponseRepo::count_for_survey(pool, survey_id).await {
        Ok(total) => total,
        Err(e) => {
            tracing::warn!(survey_id, error = %e, "Could not count responses for notification");
            return;
        }
    };
    if let Err(e) = notifier.response_recorded(survey_id, total).await {
        tracing::warn!(survey_id, total, error = %e, "Response notifier failed");
    }
}
