//! The notification threshold policy.

use sentinel_core::{NotificationConfig, RuleMatch};

/// Decide whether a match set warrants interrupting the user.
///
/// Pure function: fires iff notifications are enabled and at least one
/// match's severity ordinal is at or above the configured threshold's
/// ordinal. The caller surfaces the actual interruption.
#[must_use]
pub fn should_notify(matches: &[RuleMatch], config: &NotificationConfig) -> bool {
    if !config.enabled {
        return false;
    }
    let threshold = config.threshold.ordinal();
    matches.iter().any(|m| m.severity.ordinal() >= threshold)
}
