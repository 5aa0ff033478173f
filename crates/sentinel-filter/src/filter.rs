//! The Quick Filter scanner.

use crate::rules::{default_rules, PatternRule};
use sentinel_core::RuleMatch;

/// Cheap, synchronous local pattern matcher over the fixed rule set.
///
/// Shared read-only across all scan invocations; cloning is free since
/// the rule set lives in static storage.
#[derive(Clone, Copy)]
pub struct QuickFilter {
    rules: &'static [PatternRule],
}

impl Default for QuickFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickFilter {
    /// Create a filter over the built-in rule set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Create a filter over a custom static rule set.
    #[must_use]
    pub fn from_rules(rules: &'static [PatternRule]) -> Self {
        Self { rules }
    }

    /// Scan `text` against every rule and return the accepted matches.
    ///
    /// Deterministic and free of I/O. Matches are ordered by rule
    /// declaration, not by text position; the same span may satisfy
    /// multiple rules and contribute one match per rule hit. A rule
    /// with a validator only accepts spans the validator approves.
    #[must_use]
    pub fn scan(&self, text: &str) -> Vec<RuleMatch> {
        let mut matches = Vec::new();

        for rule in self.rules {
            for m in rule.regex.find_iter(text) {
                if let Some(validator) = rule.validator {
                    if !validator(m.as_str()) {
                        continue;
                    }
                }
                matches.push(RuleMatch {
                    category: rule.category,
                    severity: rule.severity,
                    rule_id: rule.id.to_string(),
                    span_len: m.len(),
                    verified: false,
                });
            }
        }

        matches
    }

    /// Boolean-only variant of [`scan`](Self::scan): short-circuits on
    /// the first accepted hit without building match objects.
    ///
    /// Consistent with `scan`: returns `true` exactly when `scan`
    /// would return a non-empty sequence.
    #[must_use]
    pub fn contains_pii(&self, text: &str) -> bool {
        for rule in self.rules {
            for m in rule.regex.find_iter(text) {
                match rule.validator {
                    Some(validator) if !validator(m.as_str()) => {}
                    _ => return true,
                }
            }
        }
        false
    }

    /// Number of rules in this filter.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
