//! Sentinel Core - Foundation crate for the Sentinel PII monitor.
//!
//! This crate provides shared types, error handling, configuration
//! management, and the storage capability trait that all other Sentinel
//! crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared enums and records (`PiiCategory`, `Severity`, `DetectionEvent`)
//! - [`store`] - Key-value storage capability with an in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use sentinel_core::{MonitorConfig, Severity};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::default();
//! assert_eq!(config.notifications.threshold, Severity::High);
//! assert!(!config.monitoring.network);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{
    MonitorConfig, MonitoringConfig, NotificationConfig, VerificationConfig,
};
pub use error::{ConfigError, ConfigResult, Result, SentinelError};
pub use store::{MemoryStore, Store};
pub use types::{
    url_fingerprint, DetectionEvent, DetectionMode, PiiCategory, RuleMatch, ScanSource, Severity,
};
