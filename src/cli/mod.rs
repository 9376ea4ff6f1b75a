//! Command-line interface for pmsup.
//!
//! Each subcommand lives in its own module with its own argument struct
//! and an async `execute`. The root [`Cli`] carries the global flags and
//! dispatches after applying them to the process environment.
//!
//! # Commands
//!
//! - `run` - the full upgrade workflow (fetch, decide, download,
//!   install, archive, notify)
//! - `check` - fetch and decide only; nothing is downloaded
//! - `status` - show current and available versions with the changelog
//!
//! # Global options
//!
//! - `--verbose` / `--quiet` - log verbosity (mutually exclusive)
//! - `--config <PATH>` - configuration file location
//! - `--no-progress` - disable progress bars for scripts and cron

mod check;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::constants::{CONFIG_ENV_VAR, NO_PROGRESS_ENV_VAR};

/// Runtime configuration for CLI execution.
///
/// Holds the settings that are otherwise communicated through
/// environment variables, so tests and programmatic callers can inject
/// them without mutating global state up front.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level for the `RUST_LOG` environment variable. `None`
    /// preserves whatever is already set.
    pub log_level: Option<String>,
    /// Whether to disable progress indicators.
    pub no_progress: bool,
    /// Custom path to the configuration file.
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Called exactly once at the start of execution, before any
    /// component reads the affected variables.
    pub fn apply_to_env(&self) {
        if let Some(ref level) = self.log_level {
            if std::env::var("RUST_LOG").is_err() {
                std::env::set_var("RUST_LOG", level);
            }
        }

        if self.no_progress {
            std::env::set_var(NO_PROGRESS_ENV_VAR, "1");
        }

        if let Some(ref path) = self.config_path {
            std::env::set_var(CONFIG_ENV_VAR, path);
        }
    }
}

/// Main CLI structure for pmsup.
#[derive(Parser)]
#[command(
    name = "pmsup",
    about = "Checks a running media server against the vendor release feed and installs updates",
    version,
    long_about = "pmsup queries the local media server for its running version, compares it \
                  against the vendor release feed, and downloads, verifies, and installs the \
                  update when one is available. Superseded packages are archived and the \
                  outcome is pushed to Prowl."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Equivalent to setting `RUST_LOG=debug`. Mutually exclusive with
    /// `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Overrides the `PMSUP_CONFIG` environment variable and the default
    /// location (`~/.config/pmsup/config.toml`).
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable progress bars.
    ///
    /// Useful for cron jobs and CI where animated output just clutters
    /// the captured log.
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run the full upgrade workflow.
    ///
    /// Fetches server state and the release feed, and when the versions
    /// differ downloads and verifies the artifact, installs it (when
    /// running with elevated privileges), archives superseded packages,
    /// and sends an outcome notification.
    Run(run::RunCommand),

    /// Check whether an upgrade is available, without downloading.
    Check(check::CheckCommand),

    /// Show the current and available versions and the changelog.
    Status(check::StatusCommand),
}

impl Cli {
    /// Execute the CLI with configuration built from the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an injected configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        // Apply configuration to environment once at the start
        config.apply_to_env();
        init_logging();

        match self.command {
            Commands::Run(cmd) => cmd.execute().await,
            Commands::Check(cmd) => cmd.execute().await,
            Commands::Status(cmd) => cmd.execute().await,
        }
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays
/// clean for the status lines the commands print.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
