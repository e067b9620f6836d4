//! Command-line interface for modsync.
//!
//! Each command lives in its own module with its own argument structure and
//! execution logic:
//!
//! - `init` - create a starter manifest
//! - `sync` - reconcile the cache directory with the manifest
//! - `plan` - print the changeset a sync would apply
//! - `status` - report drift between state file and cache directory
//! - `validate` - parse and validate the manifest only
//!
//! # Example
//!
//! ```bash
//! modsync init
//! modsync sync --source-url https://artifacts.example.com
//! modsync plan
//! modsync status --verify
//! ```
//!
//! Global flags control output: `--verbose` enables debug logging, `--quiet`
//! restricts logging to errors, and `--no-progress` disables the download
//! progress bar for CI and non-TTY environments.

pub mod common;

mod init;
mod plan;
mod status;
mod sync;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Top-level CLI for modsync.
#[derive(Parser)]
#[command(
    name = "modsync",
    about = "Keep a local mod cache in sync with a declarative manifest",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars (for CI and non-TTY environments)
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Create a starter manifest file
    Init(init::InitCommand),

    /// Reconcile the cache directory with the manifest
    Sync(sync::SyncCommand),

    /// Show what a sync would do without applying it
    Plan(plan::PlanCommand),

    /// Report drift between the state file and the cache directory
    Status(status::StatusCommand),

    /// Parse and validate the manifest
    Validate(validate::ValidateCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        self.init_tracing();

        match self.command {
            Commands::Init(cmd) => cmd.execute().await,
            Commands::Sync(cmd) => cmd.execute(self.no_progress).await,
            Commands::Plan(cmd) => cmd.execute().await,
            Commands::Status(cmd) => cmd.execute().await,
            Commands::Validate(cmd) => cmd.execute().await,
        }
    }

    /// Configure logging from the global flags.
    ///
    /// `--verbose` forces debug level and `--quiet` errors only; otherwise
    /// `RUST_LOG` is honored with a warn-level default so normal runs stay
    /// quiet apart from the command's own output.
    fn init_tracing(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_sync_with_flags() {
        let cli = Cli::parse_from([
            "modsync",
            "--no-progress",
            "sync",
            "--manifest",
            "m.toml",
            "--source-dir",
            "/tmp/mirror",
            "--max-parallel",
            "2",
        ]);
        assert!(cli.no_progress);
        assert!(matches!(cli.command, Commands::Sync(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["modsync", "--verbose", "--quiet", "plan"]);
        assert!(result.is_err());
    }
}
