//! CLI error handling.

use std::io;

use caseflow_authz::PolicyError;
use caseflow_common_config::{env::EnvError, ConfigError};
use caseflow_common_log::LogError;
use thiserror::Error;

use crate::Exit;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error("{0}")]
    Policy(#[from] PolicyError),

    #[error("policy has {problems} problem(s)")]
    InvalidPolicy { problems: usize },

    #[error("policy.strict is set but no policy file was given")]
    StrictPolicy,

    #[error("invalid argument {argument}: {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Log(#[from] LogError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::Policy(PolicyError::Invalid { .. }) | Self::InvalidPolicy { .. } => {
                Exit::InvalidPolicy
            }
            // A policy file that is not YAML of the right shape is as invalid
            // as one that fails validation; a file we cannot read is not.
            Self::Policy(PolicyError::Load(source)) => match source {
                ConfigError::ParseError { .. } => Exit::InvalidPolicy,
                ConfigError::NotFound { .. } | ConfigError::ReadError { .. } => Exit::IoError,
                _ => Exit::ConfigError,
            },
            Self::Config(_) | Self::Env(_) | Self::Log(_) | Self::StrictPolicy => {
                Exit::ConfigError
            }
            Self::InvalidArgument { .. } => Exit::UsageError,
            Self::Io(_) => Exit::IoError,
            Self::Other(_) => Exit::GeneralError,
        }
    }
}
