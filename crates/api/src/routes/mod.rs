pub mod dashboard;
pub mod health;
pub mod surveys;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /surveys                                          list, create (auth)
/// /surveys/{slug}                                   get, update, delete (owner/admin)
/// /surveys/{slug}/close                             close (POST, owner/admin)
/// /surveys/{slug}/public                            public view (optional auth)
/// /surveys/{slug}/responses                         submit (POST, optional auth)
/// /surveys/{slug}/statistics                        aggregates (optional auth)
/// /surveys/{slug}/export/{fmt}                      json or csv (owner/admin)
/// /surveys/{slug}/notification-rules                list, create (owner/admin)
/// /surveys/{slug}/notification-rules/{id}           delete (owner/admin)
///
/// /templates                                        list (public)
/// /templates/{id}                                   get (public)
/// /templates/{id}/instantiate                       create survey (POST, auth)
///
/// /dashboard                                        owner overview (auth, admin monitor)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/surveys", surveys::router())
        .nest("/templates", templates::router())
        .nest("/dashboard", dashboard::router())
}
