//! Route definitions for the `/surveys` resource.
//!
//! Authoring endpoints require authentication; the public view, submission,
//! and statistics also serve anonymous callers.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{notification_rules, responses, surveys};
use crate::state::AppState;

/// Routes mounted at `/surveys`.
///
/// ```text
/// GET    /                                   -> surveys::list
/// POST   /                                   -> surveys::create
/// GET    /{slug}                             -> surveys::get_by_slug
/// PUT    /{slug}                             -> surveys::update
/// DELETE /{slug}                             -> surveys::delete
/// POST   /{slug}/close                       -> surveys::close
/// GET    /{slug}/public                      -> surveys::public_view
///
/// POST   /{slug}/responses                   -> responses::submit
/// GET    /{slug}/statistics                  -> responses::statistics
/// GET    /{slug}/export/{fmt}                -> responses::export
///
/// GET    /{slug}/notification-rules          -> notification_rules::list
/// POST   /{slug}/notification-rules          -> notification_rules::create
/// DELETE /{slug}/notification-rules/{id}     -> notification_rules::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(surveys::list).post(surveys::create))
        .route(
            "/{slug}",
            get(surveys::get_by_slug)
                .put(surveys::update)
                .delete(surveys::delete),
        )
        .route("/{slug}/close", post(surveys::close))
        .route("/{slug}/public", get(surveys::public_view))
        // Responses and their aggregates
        .route("/{slug}/responses", post(responses::submit))
        .route("/{slug}/statistics", get(responses::statistics))
        .route("/{slug}/export/{fmt}", get(responses::export))
        // Notification rules
        .route(
            "/{slug}/notification-rules",
            get(notification_rules::list).post(notification_rules::create),
        )
        .route(
            "/{slug}/notification-rules/{id}",
            delete(notification_rules::delete),
        )
}
