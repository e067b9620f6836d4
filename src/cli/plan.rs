//! Print the changeset a sync would apply, without applying it.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::diff::{Changeset, RemovalReason, diff};
use crate::manifest::Manifest;
use crate::state::CacheState;

use super::common::PathArgs;

/// Show what `sync` would do.
#[derive(Args)]
pub struct PlanCommand {
    #[command(flatten)]
    paths: PathArgs,
}

impl PlanCommand {
    /// Execute the plan command.
    pub async fn execute(self) -> Result<()> {
        let manifest = Manifest::load(&self.paths.manifest)?;
        let state = CacheState::load(&self.paths.state)?;
        let changeset = diff(&manifest.entries, &state);

        if changeset.is_empty() {
            println!("{} nothing to do ({} artifacts cached)", "✓".green(), changeset.unchanged.len());
            return Ok(());
        }

        print_changeset(&changeset);
        Ok(())
    }
}

/// Render a changeset in human-readable form.
pub(super) fn print_changeset(changeset: &Changeset) {
    for removal in &changeset.to_remove {
        let reason = match removal.reason {
            RemovalReason::Dropped => "dropped from manifest",
            RemovalReason::VersionChanged => "version changed",
        };
        let file = removal.file_name.as_deref().unwrap_or("<no file>");
        println!("  {} {} {} ({})", "-".red(), removal.id, file, reason);
    }
    for fetch in &changeset.to_fetch {
        let required = if fetch.required { "" } else { " [optional]" };
        println!("  {} {}@{}{}", "+".green(), fetch.id, fetch.version, required);
    }
    println!(
        "{} to fetch, {} to remove, {} unchanged",
        changeset.to_fetch.len(),
        changeset.to_remove.len(),
        changeset.unchanged.len()
    );
}
