//! Handler for the survey owner's dashboard.
//!
//! Administrators additionally get a system-wide monitor section.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use quickvote_core::roles::is_admin;
use quickvote_db::models::dashboard::{RecentResponse, SystemSummary, TopSurvey};
use quickvote_db::repositories::DashboardRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// How many recent responses the dashboard lists.
pub const RECENT_RESPONSES_LIMIT: i64 = 10;

/// How many surveys the admin monitor ranks.
pub const TOP_SURVEYS_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub active_surveys: i64,
    pub responses_count: i64,
    pub participants: i64,
    pub recent_responses: Vec<RecentResponse>,
    /// Present for administrators only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<AdminMonitor>,
}

#[derive(Debug, Serialize)]
pub struct AdminMonitor {
    #[serde(flatten)]
    pub summary: SystemSummary,
    pub top_surveys: Vec<TopSurvey>,
}

/// GET /api/v1/dashboard
pub async fn overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let summary = DashboardRepo::owner_summary(&state.pool, user.user_id).await?;
    let recent_responses =
        DashboardRepo::recent_responses(&state.pool, user.user_id, RECENT_RESPONSES_LIMIT)
            .await?;

    let monitor = if is_admin(&user.role) {
        Some(AdminMonitor {
            summary: DashboardRepo::system_summary(&state.pool).await?,
            top_surveys: DashboardRepo::top_surveys(&state.pool, TOP_SURVEYS_LIMIT).await?,
        })
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: Dashboard {
            active_surveys: summary.active_surveys,
            responses_count: summary.responses_count,
            participants: summary.participants,
            recent_responses,
            monitor,
        },
    }))
}
