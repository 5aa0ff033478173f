//! User-facing output descriptions.
//!
//! These types tell the host boundary what to render; none of them
//! carry literal matched values, only categories and counts.

use sentinel_core::{PiiCategory, RuleMatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visual highlight state for a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightState {
    /// No detection on this field
    Clear,
    /// The field's last scan produced matches
    Flagged,
}

/// Outcome of a form-submission scan, consumed at the observation
/// boundary before the submission leaves the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Nothing detected (or notifications below threshold); let the
    /// submission proceed untouched.
    Allow,
    /// Detections at or above the threshold; the boundary must ask the
    /// user and cancel the in-flight submission if they decline.
    Confirm {
        /// Category → match count summary to show the user
        summary: BTreeMap<PiiCategory, u32>,
    },
}

/// Action buttons on a fire-and-forget system notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationAction {
    /// Open the detection details view
    ViewDetails,
    /// Dismiss the notification
    Dismiss,
}

/// A system notification the boundary should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Notification title
    pub title: String,
    /// Category summary line
    pub body: String,
    /// Available actions, in display order
    pub actions: Vec<NotificationAction>,
}

impl NotificationRequest {
    /// Build a notification from a match set's category summary.
    #[must_use]
    pub fn from_matches(matches: &[RuleMatch]) -> Self {
        let summary = categorize(matches);
        let body = summary
            .iter()
            .map(|(category, count)| format!("{} ×{count}", category.display_name()))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            title: "Personal information detected".to_string(),
            body,
            actions: vec![NotificationAction::ViewDetails, NotificationAction::Dismiss],
        }
    }
}

/// Receiver for fire-and-forget system notifications.
///
/// Deferred scans (debounced field input, throttled mutations) resolve
/// after their triggering call returns, so the coordinator pushes
/// notification requests here instead of returning them. The default
/// is a no-op.
pub trait NotificationSink: Send + Sync {
    /// Surface a notification to the user.
    fn notify(&self, request: NotificationRequest);
}

/// Notification sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationSink for NoopNotifier {
    fn notify(&self, _request: NotificationRequest) {}
}

/// Count matches per category.
#[must_use]
pub fn categorize(matches: &[RuleMatch]) -> BTreeMap<PiiCategory, u32> {
    let mut summary = BTreeMap::new();
    for m in matches {
        *summary.entry(m.category).or_insert(0) += 1;
    }
    summary
}
