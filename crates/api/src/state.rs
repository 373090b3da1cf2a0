use std::sync::Arc;

use quickvote_core::notify::ResponseNotifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: quickvote_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Event bus for survey lifecycle events.
    pub event_bus: Arc<quickvote_events::EventBus>,
    /// Called after each committed response.
    pub notifier: Arc<dyn ResponseNotifier>,
}
