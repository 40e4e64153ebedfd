//! CLI argument definitions using clap derive macros.

use std::io::Write;
use std::path::PathBuf;

use caseflow_authz::Policy;
use caseflow_common_config::{env, CaseflowConfig, ConfigLoader};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use tracing::{debug, info};

use crate::commands;
use crate::error::CliError;

/// caseflow-policy - inspect Caseflow authorization policies
///
/// Validates policy files and explains what the engine decides for a given
/// role, resource and action.
#[derive(Debug, Parser)]
#[command(
    name = "caseflow-policy",
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "CASEFLOW_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Policy file; the built-in policy is used when neither this nor the
    /// config names one
    #[arg(
        short,
        long,
        global = true,
        env = "CASEFLOW_POLICY",
        value_hint = ValueHint::FilePath
    )]
    pub policy: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a policy file and list every problem found
    Check(CheckArgs),

    /// Show the decision and query filter for one request
    Explain(ExplainArgs),

    /// Print the declared permission matrix
    Matrix(MatrixArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Policy file to validate (defaults to the configured policy)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// Role of the acting user
    #[arg(long)]
    pub role: String,

    /// Resource being accessed
    #[arg(long)]
    pub resource: String,

    /// Action being performed
    #[arg(long)]
    pub action: String,

    /// Identifier of the acting user
    #[arg(long, default_value = "1")]
    pub actor_id: String,

    /// Target instance as JSON, e.g. '{"createdBy": 1}'
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Debug, Args)]
pub struct MatrixArgs {
    /// Only show this role's cells
    #[arg(long)]
    pub role: Option<String>,
}

/// Shared state for command execution
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub config: CaseflowConfig,
    pub policy_path: Option<PathBuf>,
}

impl CommandContext {
    /// Load the policy this invocation works on.
    pub fn load_policy(&self) -> Result<Policy, CliError> {
        if self.policy_path.is_none() && self.config.policy.strict {
            return Err(CliError::StrictPolicy);
        }
        Ok(Policy::load_or_builtin(self.policy_path.as_deref())?)
    }
}

impl Cli {
    /// Load configuration from `--config`, or `.caseflow/config.yaml` in the
    /// working directory, then apply environment overrides.
    pub fn load_config(&self) -> Result<CaseflowConfig, CliError> {
        let loader = ConfigLoader::default();
        let mut config = match &self.config {
            Some(path) => loader.load_from(path)?,
            None => loader.load()?,
        };
        env::apply_overrides(&mut config)?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Run the selected command, writing results to `out`.
    pub fn execute(self, config: CaseflowConfig, out: &mut impl Write) -> Result<(), CliError> {
        let policy_path = self.policy.clone().or_else(|| config.policy.path.clone());
        if let Some(path) = &policy_path {
            info!(path = %path.display(), "using policy file");
        }

        let ctx = CommandContext {
            format: self.format,
            config,
            policy_path,
        };

        match self.command {
            Command::Check(args) => commands::check(&ctx, args, out),
            Command::Explain(args) => commands::explain(&ctx, args, out),
            Command::Matrix(args) => commands::matrix(&ctx, args, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_explain() {
        let cli = Cli::try_parse_from([
            "caseflow-policy",
            "explain",
            "--role",
            "user",
            "--resource",
            "feedback",
            "--action",
            "read",
            "--target",
            r#"{"createdBy": 1}"#,
        ])
        .unwrap();

        match cli.command {
            Command::Explain(args) => {
                assert_eq!(args.role, "user");
                assert_eq!(args.actor_id, "1");
                assert!(args.target.is_some());
            }
            other => panic!("Expected explain, got {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["caseflow-policy", "-q", "-v", "matrix"]).is_err());
    }

    #[test]
    fn test_strict_policy_requires_path() {
        let mut config = CaseflowConfig::default();
        config.policy.strict = true;
        let ctx = CommandContext {
            format: OutputFormat::Text,
            config,
            policy_path: None,
        };
        assert!(matches!(ctx.load_policy(), Err(CliError::StrictPolicy)));
    }
}
