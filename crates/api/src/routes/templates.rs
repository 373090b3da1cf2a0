//! Route definitions for `/templates`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/templates`. Browsing is open; instantiating needs a
/// signed-in caller.
///
/// ```text
/// GET    /                    -> list
/// GET    /{id}                -> get_by_id
/// POST   /{id}/instantiate    -> instantiate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates::list))
        .route("/{id}", get(templates::get_by_id))
        .route("/{id}/instantiate", post(templates::instantiate))
}
