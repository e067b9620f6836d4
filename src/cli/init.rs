//! Initialize a new modsync project with a manifest file.
//!
//! Creates a starter `modsync.toml` in the target directory. Safe by default:
//! refuses to overwrite an existing manifest unless `--force` is given.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

const MANIFEST_TEMPLATE: &str = r#"# modsync manifest - the desired contents of the mod cache.
#
# Each entry names an artifact id and the version to keep on disk.
# Identifiers may be integers or numeric strings.
#
# [[mods]]
# id = 247560
# version = 3361988
# name = "Just Enough Items"
# required = true
"#;

/// Create a starter manifest file.
#[derive(Args)]
pub struct InitCommand {
    /// Directory to create the manifest in
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Overwrite an existing manifest
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    /// Execute the init command.
    pub async fn execute(self) -> Result<()> {
        let manifest_path = self.path.join("modsync.toml");

        if manifest_path.exists() && !self.force {
            return Err(anyhow!(
                "manifest already exists at {} (use --force to overwrite)",
                manifest_path.display()
            ));
        }

        if !self.path.exists() {
            fs::create_dir_all(&self.path)?;
        }

        fs::write(&manifest_path, MANIFEST_TEMPLATE)?;
        println!("{} created {}", "✓".green(), manifest_path.display());
        Ok(())
    }
}
