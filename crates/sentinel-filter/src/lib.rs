//! Sentinel Filter - the local Quick Filter.
//!
//! A cheap, synchronous pattern matcher over a fixed rule set. It is
//! the gate in front of every more expensive pipeline stage: the
//! coordinator calls [`QuickFilter::contains_pii`] on every debounced
//! keystroke batch, so scans must stay in low single-digit milliseconds
//! for inputs up to ~10KB.
//!
//! # Example
//!
//! ```rust
//! use sentinel_filter::QuickFilter;
//!
//! let filter = QuickFilter::new();
//! let matches = filter.scan("reach me at jane@example.com");
//! assert_eq!(matches.len(), 1);
//! assert!(filter.contains_pii("reach me at jane@example.com"));
//! assert!(!filter.contains_pii("nothing interesting here"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod filter;
pub mod rules;
pub mod validators;

// Re-export commonly used types
pub use filter::QuickFilter;
pub use rules::{default_rules, PatternRule};
