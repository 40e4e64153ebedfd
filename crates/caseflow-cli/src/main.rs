//! Caseflow policy CLI
//!
//! Main entry point for the `caseflow-policy` binary.

use std::io::{self, Write};
use std::process::ExitCode;

use caseflow_common_config::{env, LogSettings};
use caseflow_common_log::{LogConfig, LogLevel};
use clap::Parser;
use tracing::{error, warn};

mod cli;
mod commands;
mod error;
mod output;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    InvalidPolicy = 2,
    ConfigError = 3,
    IoError = 4,
    UsageError = 64,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    // Before parsing, so `.env` can supply CASEFLOW_* defaults.
    let dotenv = std::env::current_dir()
        .ok()
        .map(|dir| env::load_dotenv(&dir));
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&cli, &LogSettings::default());
            error!("{e}");
            return e.exit_code().into();
        }
    };
    init_logging(&cli, &config.log);
    if let Some(Err(e)) = dotenv {
        warn!("{e}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = cli
        .execute(config, &mut out)
        .and_then(|()| out.flush().map_err(CliError::from));

    match result {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            e.exit_code().into()
        }
    }
}

/// Log settings from the config file, with verbosity flags taking over the
/// level and `CASEFLOW_LOG_*` variables taking over everything.
fn init_logging(cli: &Cli, settings: &LogSettings) {
    let mut config = LogConfig::from_settings(settings);
    config.level = match cli.verbose {
        0 if cli.quiet => LogLevel::Error,
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    config.source_location = cli.verbose >= 3;

    if let Err(e) = caseflow_common_log::init(config.with_env_overrides()) {
        eprintln!("warning: {}", CliError::from(e));
    }
}
