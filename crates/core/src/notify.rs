//! Post-submission notification hooks.
//!
//! The submission flow calls a [`ResponseNotifier`] after the response has
//! been committed. Implementations decide what to alert on; the threshold
//! and closing-soon rules below are shared by all of them.

use async_trait::async_trait;
use chrono::Duration;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// How far ahead of `ends_at` a survey counts as closing soon.
pub const CLOSING_SOON_WINDOW_HOURS: i64 = 12;

/// Called once per committed response with the survey's new response total.
///
/// Errors are logged by the caller and never affect the submission.
#[async_trait]
pub trait ResponseNotifier: Send + Sync {
    async fn response_recorded(&self, survey_id: DbId, total_responses: i64)
        -> Result<(), CoreError>;
}

/// Notifier that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl ResponseNotifier for NoopNotifier {
    async fn response_recorded(&self, _survey_id: DbId, _total: i64) -> Result<(), CoreError> {
        Ok(())
    }
}

/// A threshold rule as the notifier sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdRule {
    pub id: DbId,
    pub threshold: i32,
    pub already_fired: bool,
}

/// Rules that fire now: threshold reached and not fired before.
pub fn thresholds_reached(rules: &[ThresholdRule], total_responses: i64) -> Vec<ThresholdRule> {
    rules
        .iter()
        .filter(|r| !r.already_fired && i64::from(r.threshold) <= total_responses)
        .copied()
        .collect()
}

/// Whether `ends_at` lies in `(now, now + 12h]`.
pub fn closing_soon(ends_at: Option<Timestamp>, now: Timestamp) -> bool {
    match ends_at {
        Some(ends_at) => {
            let remaining = ends_at - now;
            remaining > Duration::zero()
                && remaining <= Duration::hours(CLOSING_SOON_WINDOW_HOURS)
        }
        None => false,
    }
}

/// Message body stored with a fired threshold notification.
pub fn threshold_message(survey_title: &str, total_responses: i64) -> String {
    format!("Survey \"{survey_title}\" has reached {total_responses} responses")
}

/// Validate a threshold value for a new rule.
pub fn validate_threshold(threshold: i32) -> Result<(), CoreError> {
    if threshold < 1 {
        return Err(CoreError::Validation(format!(
            "threshold must be at least 1, got {threshold}"
        )));
    }
    Ok(())
}
