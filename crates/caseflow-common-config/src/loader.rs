//! Configuration file loading and parsing.

use crate::types::{CaseflowConfig, LOG_FORMATS, LOG_LEVELS};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("invalid variable pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Directory, relative to the base path, holding `config.yaml`.
    pub const CONFIG_DIR: &'static str = ".caseflow";

    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the config file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(Self::CONFIG_DIR).join("config.yaml")
    }

    /// Load configuration from `.caseflow/config.yaml`, falling back to
    /// defaults when the file does not exist.
    pub fn load(&self) -> Result<CaseflowConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(CaseflowConfig::default());
        }

        self.load_from(&config_path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(&self, path: &Path) -> Result<CaseflowConfig, ConfigError> {
        let mut config: CaseflowConfig = Self::load_yaml(path)?;

        // A relative policy path is relative to the directory holding the
        // config file, not to the process working directory.
        if let (Some(policy), Some(dir)) = (config.policy.path.as_mut(), path.parent()) {
            if policy.is_relative() {
                *policy = dir.join(&*policy);
            }
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Read any YAML document, expanding `${VAR}` and `${VAR:-default}`
    /// first.
    pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse_yaml(&contents)
    }

    /// Parse YAML text with variable expansion.
    pub fn parse_yaml<T: DeserializeOwned>(contents: &str) -> Result<T, ConfigError> {
        let expanded = Self::expand_env_vars(contents)?;

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")?;

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    fn validate(config: &CaseflowConfig) -> Result<(), ConfigError> {
        if config.gate.resolver_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "gate.resolver_timeout_ms must be greater than 0".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&config.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!("log.level `{}` is not a known level", config.log.level),
            });
        }

        if !LOG_FORMATS.contains(&config.log.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!("log.format `{}` is not a known format", config.log.format),
            });
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
