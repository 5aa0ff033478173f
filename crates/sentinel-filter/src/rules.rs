//! The fixed pattern rule set.
//!
//! Rules are compiled once at startup and never mutated at runtime.
//! Declaration order here is the order matches are reported in, so
//! callers must not assume positional order within the scanned text.

use crate::validators;
use once_cell::sync::Lazy;
use regex::Regex;
use sentinel_core::{PiiCategory, Severity};

/// One immutable detection rule: a compiled matcher plus the category
/// and severity it assigns, with an optional post-match validator.
pub struct PatternRule {
    /// Stable rule identifier, reported in matches
    pub id: &'static str,
    /// Compiled matcher
    pub regex: Regex,
    /// Category assigned to accepted matches
    pub category: PiiCategory,
    /// Severity assigned to accepted matches
    pub severity: Severity,
    /// Plausibility predicate applied to the raw matched span
    pub validator: Option<fn(&str) -> bool>,
}

impl PatternRule {
    fn new(
        id: &'static str,
        pattern: &str,
        category: PiiCategory,
        severity: Severity,
        validator: Option<fn(&str) -> bool>,
    ) -> Self {
        Self {
            id,
            regex: Regex::new(pattern).expect("built-in rule pattern must compile"),
            category,
            severity,
            validator,
        }
    }
}

static DEFAULT_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "email",
            r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
            PiiCategory::Email,
            Severity::Medium,
            None,
        ),
        PatternRule::new(
            "phone-us",
            r"(?:\+1[-.\s]?)?\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{4}\b",
            PiiCategory::Phone,
            Severity::Medium,
            None,
        ),
        PatternRule::new(
            "ssn-us",
            r"\b\d{3}-\d{2}-\d{4}\b",
            PiiCategory::Ssn,
            Severity::Critical,
            Some(validators::ssn_valid),
        ),
        PatternRule::new(
            "credit-card",
            r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{1,4}\b",
            PiiCategory::CreditCard,
            Severity::Critical,
            Some(validators::luhn_valid),
        ),
        PatternRule::new(
            "ipv4",
            r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
            PiiCategory::IpAddress,
            Severity::Low,
            None,
        ),
        PatternRule::new(
            "passport-us",
            r"\b[A-Z]\d{8}\b",
            PiiCategory::Passport,
            Severity::High,
            None,
        ),
        PatternRule::new(
            "generic-token",
            r"\b[A-Za-z0-9]{32,64}\b",
            PiiCategory::Token,
            Severity::High,
            Some(validators::mixed_alphanumeric),
        ),
        PatternRule::new(
            "zip-us",
            r"\b\d{5}(?:-\d{4})?\b",
            PiiCategory::ZipCode,
            Severity::Low,
            None,
        ),
    ]
});

/// The built-in rule set, compiled on first use.
#[must_use]
pub fn default_rules() -> &'static [PatternRule] {
    &DEFAULT_RULES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_compile_once() {
        let rules = default_rules();
        assert!(rules.len() >= 8);
        // Declaration order is part of the contract
        assert_eq!(rules[0].id, "email");
        assert_eq!(rules[1].id, "phone-us");
    }

    #[test]
    fn test_email_rule_matches() {
        let rule = &default_rules()[0];
        assert!(rule.regex.is_match("jane@example.com"));
        assert!(!rule.regex.is_match("jane at example dot com"));
    }

    #[test]
    fn test_phone_rule_ignores_card_digit_runs() {
        let phone = &default_rules()[1];
        assert!(phone.regex.is_match("call 555-123-4567 today"));
        assert!(!phone.regex.is_match("4111 1111 1111 1111"));
    }
}
