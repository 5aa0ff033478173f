//! Sentinel Coordinator - scan scheduling across observation sources.
//!
//! Three independently-triggered observation channels (form input, DOM
//! mutations, outbound requests) funnel into one pipeline here: a cheap
//! Quick Filter gate, a per-invocation whitelist check, verification
//! with graceful client-only fallback, aggregation, and the
//! notification decision. The coordinator's job is to not scan more
//! than necessary without missing high-value events — per-field
//! debounce for typed input, a single throttle window per page for
//! mutation bursts, and deterministic sampling for oversized pages.
//!
//! All scans run as deferred tasks off the triggering event; a
//! `destroyed` flag is checked before any deferred callback touches
//! shared state, so teardown leaves no late side effects.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod coordinator;
pub mod observation;
pub mod sample;
pub mod supervisor;
pub mod throttle;

// Re-export commonly used types
pub use coordinator::{ScanCoordinator, ScanOutcome};
pub use observation::{
    FieldInput, FieldKind, FormSubmission, MutationBatch, Observation, ObservationSource,
    OutboundRequest, RequestBody, TextNode,
};
pub use supervisor::CoordinatorSupervisor;
pub use throttle::ThrottleGate;
