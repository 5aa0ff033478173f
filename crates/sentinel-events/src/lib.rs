//! Sentinel Events - the Detection Aggregator.
//!
//! Receives verified and unverified match sets from every observation
//! source, deduplicates within a session window, maintains the
//! append-only detection event log (with a retention cap), and computes
//! rolling statistics on demand. The aggregator is the sole writer to
//! the event log.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aggregator;
pub mod stats;

// Re-export commonly used types
pub use aggregator::{DetectionAggregator, IndicatorSink, NoopIndicator};
pub use stats::StatsSnapshot;
