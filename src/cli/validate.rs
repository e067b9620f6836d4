//! Validate the manifest without touching network or cache.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::manifest::Manifest;

/// Parse and validate the manifest.
#[derive(Args)]
pub struct ValidateCommand {
    /// Path to the manifest file
    #[arg(long, default_value = "modsync.toml")]
    manifest: PathBuf,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub async fn execute(self) -> Result<()> {
        let manifest = Manifest::load(&self.manifest)?;
        let optional = manifest.entries.iter().filter(|e| !e.required).count();
        println!(
            "{} manifest is valid: {} entries ({} optional)",
            "✓".green(),
            manifest.len(),
            optional
        );
        Ok(())
    }
}
