//! Environment variable handling.

use crate::types::CaseflowConfig;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    pub const CASEFLOW_CONFIG: &str = "CASEFLOW_CONFIG";
    pub const CASEFLOW_POLICY: &str = "CASEFLOW_POLICY";
    pub const CASEFLOW_RESOLVER_TIMEOUT_MS: &str = "CASEFLOW_RESOLVER_TIMEOUT_MS";

    pub const CASEFLOW_LOG_LEVEL: &str = "CASEFLOW_LOG_LEVEL";
    pub const CASEFLOW_LOG_FORMAT: &str = "CASEFLOW_LOG_FORMAT";
    pub const CASEFLOW_LOG_FILE: &str = "CASEFLOW_LOG_FILE";
    pub const CASEFLOW_LOG_SOURCE: &str = "CASEFLOW_LOG_SOURCE";

    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Load `.env` then `.env.local` from `dir`; missing files are ignored.
pub fn load_dotenv(dir: &Path) -> Result<(), EnvError> {
    for name in [".env", ".env.local"] {
        match dotenvy::from_path(dir.join(name)) {
            Ok(()) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Policy file named by `CASEFLOW_POLICY`, if set.
pub fn policy_path() -> Option<PathBuf> {
    env::var_os(vars::CASEFLOW_POLICY).map(PathBuf::from)
}

/// Resolver timeout override from `CASEFLOW_RESOLVER_TIMEOUT_MS`.
pub fn resolver_timeout_ms() -> Result<Option<u64>, EnvError> {
    match env::var(vars::CASEFLOW_RESOLVER_TIMEOUT_MS) {
        Ok(v) => match v.parse::<u64>() {
            Ok(0) | Err(_) => Err(EnvError::InvalidValue {
                var: vars::CASEFLOW_RESOLVER_TIMEOUT_MS.to_string(),
                message: "expected a positive integer".to_string(),
            }),
            Ok(ms) => Ok(Some(ms)),
        },
        Err(_) => Ok(None),
    }
}

/// Apply `CASEFLOW_POLICY` and `CASEFLOW_RESOLVER_TIMEOUT_MS` on top of a
/// loaded config.
pub fn apply_overrides(config: &mut CaseflowConfig) -> Result<(), EnvError> {
    if let Some(path) = policy_path() {
        config.policy.path = Some(path);
    }
    if let Some(ms) = resolver_timeout_ms()? {
        config.gate.resolver_timeout_ms = ms;
    }
    Ok(())
}

/// Interpret a flag value (`true`, `1`, `yes`).
pub fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}
