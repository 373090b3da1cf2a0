//! QuickVote event bus and response notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`SurveyEvent`]: the event envelope published on it.
//! - [`ThresholdNotifier`]: the [`ResponseNotifier`](quickvote_core::notify::ResponseNotifier)
//!   that fires per-survey response-count rules and closing-soon alerts.
//! - [`EventLogger`]: background subscriber that hands alerts to the log.

pub mod bus;
pub mod logger;
pub mod notifier;

pub use bus::{EventBus, SurveyEvent};
pub use logger::EventLogger;
pub use notifier::ThresholdNotifier;
