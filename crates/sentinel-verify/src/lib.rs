//! Sentinel Verify - remote verification client.
//!
//! Escalates candidate text to the remote verification service over a
//! narrow HTTP contract (`POST /find`, `GET /health`) with a bounded
//! timeout and a fingerprinted response cache. Any transport failure,
//! timeout, or non-2xx response surfaces as
//! [`VerifyError::ServiceUnavailable`]; the coordinator recovers by
//! falling back to Quick-Filter matches tagged client-only.
//!
//! Requests carry `include_matched_text: false` so the service never
//! echoes literal PII back.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cache;
pub mod client;
pub mod error;

// Re-export commonly used types
pub use cache::ResponseCache;
pub use client::{HealthStatus, HttpVerifier, Verifier};
pub use error::{Result, VerifyError};
