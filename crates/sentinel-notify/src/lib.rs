//! Sentinel Notify - notification policy and user-facing output types.
//!
//! [`should_notify`] is the pure decision function the coordinator
//! consults after a scan resolves; the surface types describe what the
//! boundary layer then renders (field highlight, submit confirmation,
//! system notification). This crate has no side effects — surfacing is
//! the host boundary's job.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod policy;
pub mod surface;

// Re-export commonly used types
pub use policy::should_notify;
pub use surface::{
    categorize, HighlightState, NoopNotifier, NotificationAction, NotificationRequest,
    NotificationSink, SubmitDecision,
};
