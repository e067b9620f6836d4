//! modsync CLI entry point
//!
//! Parses command-line arguments, executes the selected command, and renders
//! failures through the user-friendly error formatter before exiting non-zero.

use anyhow::Result;
use clap::Parser;
use modsync::cli;
use modsync::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let ctx = user_friendly_error(e);
            ctx.display();
            std::process::exit(1);
        }
    }
}
