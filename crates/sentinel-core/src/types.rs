//! Shared types used across the Sentinel pipeline.
//!
//! This module defines the common enums and records that provide type
//! safety and clear domain modeling. `PiiCategory` is the single
//! category table every surface consumes; nothing here ever holds a
//! literal matched value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Severity of a detected PII category.
///
/// Ordering is by ordinal: `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational findings (e.g. ZIP codes)
    Low,
    /// Findings worth surfacing in statistics
    Medium,
    /// Findings that warrant user attention by default
    High,
    /// Findings that should almost always interrupt the user
    Critical,
}

impl Severity {
    /// Numeric rank used for threshold comparison: low=1 .. critical=4.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Categories of personally identifiable information the pipeline detects.
///
/// This is the one category enumeration shared by the filter, the
/// verification client, statistics, and notification summaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Social Security Number
    Ssn,
    /// Payment card number
    CreditCard,
    /// IP address
    IpAddress,
    /// Passport number
    Passport,
    /// Generic secret-looking token (API key, bearer token)
    Token,
    /// ZIP/postal code
    ZipCode,
}

impl PiiCategory {
    /// Get a human-readable display name for the category.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Email => "Email Address",
            Self::Phone => "Phone Number",
            Self::Ssn => "Social Security Number",
            Self::CreditCard => "Payment Card Number",
            Self::IpAddress => "IP Address",
            Self::Passport => "Passport Number",
            Self::Token => "Secret Token",
            Self::ZipCode => "ZIP Code",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Ssn => "ssn",
            Self::CreditCard => "credit_card",
            Self::IpAddress => "ip_address",
            Self::Passport => "passport",
            Self::Token => "token",
            Self::ZipCode => "zip_code",
        };
        write!(f, "{s}")
    }
}

/// Observation channel a scan originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanSource {
    /// Live form-field input
    Form,
    /// Initial full-page content pass
    DomInitial,
    /// Mutated DOM subtree content
    DomMutation,
    /// Outbound network request body
    Network,
}

/// How a match set was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMode {
    /// The remote verification service confirmed the matches
    ApiVerified,
    /// Verification was unavailable; matches come from the local filter only
    ClientOnly,
}

/// A single detection produced by the Quick Filter or the Verification Client.
///
/// Carries the matched span's *length*, never its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    /// Category of PII detected
    pub category: PiiCategory,
    /// Severity assigned by the matching rule
    pub severity: Severity,
    /// Identifier of the rule that matched
    pub rule_id: String,
    /// Length in bytes of the matched span
    pub span_len: usize,
    /// Whether the remote service confirmed this match
    pub verified: bool,
}

/// An immutable record of one completed scan that yielded at least one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// When the scan completed
    pub timestamp: DateTime<Utc>,
    /// Observation channel the scan came from
    pub source: ScanSource,
    /// SHA-256 fingerprint of the page origin (scheme + host + path, no query)
    pub url_fingerprint: String,
    /// Number of matches the scan produced
    pub match_count: u32,
    /// Distinct categories present in the match set
    pub categories: BTreeSet<PiiCategory>,
    /// Whether the matches were API-verified or client-only
    pub mode: DetectionMode,
}

impl DetectionEvent {
    /// Build an event from a completed scan's match set.
    ///
    /// Returns `None` when the match set is empty; events exist only for
    /// scans that found something.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_matches(
        source: ScanSource,
        url: &str,
        matches: &[RuleMatch],
        mode: DetectionMode,
    ) -> Option<Self> {
        if matches.is_empty() {
            return None;
        }
        Some(Self {
            timestamp: Utc::now(),
            source,
            url_fingerprint: url_fingerprint(url),
            match_count: matches.len() as u32,
            categories: matches.iter().map(|m| m.category).collect(),
            mode,
        })
    }
}

/// Hash a URL down to a stable fingerprint, dropping the query string
/// and fragment so sensitive parameters never reach the event log.
#[must_use]
pub fn url_fingerprint(url: &str) -> String {
    let end = url
        .find(['?', '#'])
        .unwrap_or(url.len());
    let trimmed = &url[..end];

    let mut hasher = Sha256::new();
    hasher.update(trimmed.as_bytes());
    let digest = hasher.finalize();
    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
