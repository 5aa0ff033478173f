//! Configuration management for the Sentinel pipeline.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. A malformed stored configuration is
//! recovered by falling back to defaults rather than failing
//! initialization; coordinators treat a loaded config as an immutable
//! snapshot for the lifetime of a scan.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Severity;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Main pipeline configuration.
///
/// This is loaded from `~/.config/sentinel/config.toml` (or platform
/// equivalent). If the file doesn't exist or is malformed, default
/// values are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Remote verification service settings
    pub verification: VerificationConfig,
    /// Per-source monitoring toggles
    pub monitoring: MonitoringConfig,
    /// Notification policy settings
    pub notifications: NotificationConfig,
    /// Domains excluded from scanning (exact host or subdomain suffix)
    pub whitelist: BTreeSet<String>,
}

impl MonitorConfig {
    /// Load configuration from disk, falling back to defaults if the
    /// file is missing or unparseable.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            match toml::from_str(&contents) {
                Ok(config) => Ok(config),
                Err(e) => {
                    tracing::warn!("Stored config is invalid ({e}), using defaults");
                    Ok(Self::default())
                }
            }
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SENTINEL_ENDPOINT`: Override the verification endpoint URL
    /// - `SENTINEL_NOTIFICATIONS`: Override notifications enabled (true/false)
    /// - `SENTINEL_NETWORK_MONITORING`: Override network monitoring (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("SENTINEL_ENDPOINT") {
            if !val.is_empty() {
                tracing::debug!("Override verification.endpoint from env: {}", val);
                config.verification.endpoint = val;
            }
        }

        if let Ok(val) = std::env::var("SENTINEL_NOTIFICATIONS") {
            if let Ok(enabled) = val.parse() {
                tracing::debug!("Override notifications.enabled from env: {}", enabled);
                config.notifications.enabled = enabled;
            }
        }

        if let Ok(val) = std::env::var("SENTINEL_NETWORK_MONITORING") {
            if let Ok(enabled) = val.parse() {
                tracing::debug!("Override monitoring.network from env: {}", enabled);
                config.monitoring.network = enabled;
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Restore defaults and persist them.
    pub fn reset() -> ConfigResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/sentinel/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "sentinel", "sentinel").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Check whether a host is covered by the whitelist.
    ///
    /// An entry matches on exact host equality or as a suffix at a
    /// `.`-prefixed boundary, so `example.com` covers
    /// `sub.example.com` but not `notexample.com`.
    #[must_use]
    pub fn is_whitelisted(&self, host: &str) -> bool {
        self.whitelist.iter().any(|entry| {
            host == entry
                || (host.len() > entry.len()
                    && host.ends_with(entry)
                    && host.as_bytes()[host.len() - entry.len() - 1] == b'.')
        })
    }
}

/// Remote verification service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Base URL of the verification service
    pub endpoint: String,
    /// Pattern namespaces to request matches from
    pub namespaces: BTreeSet<String>,
    /// Inline scan timeout in seconds
    pub timeout_secs: u64,
    /// Maximum matches to request per verification call
    pub max_matches: u32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            namespaces: ["comm".to_string(), "us".to_string()].into_iter().collect(),
            timeout_secs: 3,
            max_matches: 50,
        }
    }
}

/// Per-source monitoring toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Scan live form-field input
    pub forms: bool,
    /// Scan page content and DOM mutations
    pub dom: bool,
    /// Scan outbound request bodies
    pub network: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            forms: true,
            dom: true,
            network: false,
        }
    }
}

/// Notification policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Whether user-facing notifications are enabled at all
    pub enabled: bool,
    /// Minimum severity that triggers an interruption
    pub threshold: Severity,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: Severity::High,
        }
    }
}
