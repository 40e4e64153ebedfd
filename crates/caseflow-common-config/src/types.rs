//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseflowConfig {
    /// Where the authorization policy comes from.
    pub policy: PolicyConfig,
    /// Request gate settings.
    pub gate: GateConfig,
    /// Logging settings.
    pub log: LogSettings,
}

/// Policy source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Policy YAML file. Relative paths resolve against the config directory.
    pub path: Option<PathBuf>,
    /// Refuse to start on the built-in policy when no path is set.
    pub strict: bool,
}

/// Request gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Upper bound for a single resource lookup (ms).
    pub resolver_timeout_ms: u64,
    /// Log granted decisions at info level, not only denials.
    pub audit_grants: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            resolver_timeout_ms: 5000,
            audit_grants: false,
        }
    }
}

/// Logging configuration as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// `pretty`, `compact` or `json`.
    pub format: String,
    /// Also append logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];
pub const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];
