//! Synchronize the cache directory with the manifest.
//!
//! The core command: loads manifest and cache state, computes the changeset,
//! applies it (removals first, then bounded-parallel downloads), and persists
//! the new state atomically. Per-artifact failures do not abort the run;
//! successes are committed to the state file and the command exits non-zero
//! listing every failed artifact.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::diff::diff;
use crate::manifest::Manifest;
use crate::reconcile;
use crate::source::ArtifactSource;
use crate::state::CacheState;

use super::common::{PathArgs, SourceArgs, UnconfiguredSource};

/// Bring the cache directory in line with the manifest.
#[derive(Args)]
pub struct SyncCommand {
    #[command(flatten)]
    paths: PathArgs,

    #[command(flatten)]
    source: SourceArgs,

    /// Maximum number of concurrent downloads
    #[arg(long, default_value_t = 4)]
    max_parallel: usize,

    /// Compute and print the changeset without applying it
    #[arg(long)]
    dry_run: bool,
}

impl SyncCommand {
    /// Execute the sync command.
    pub async fn execute(self, no_progress: bool) -> Result<()> {
        let manifest = Manifest::load(&self.paths.manifest)?;
        let old_state = CacheState::load(&self.paths.state)?;
        let changeset = diff(&manifest.entries, &old_state);

        tracing::info!(
            "changeset: {} to fetch, {} to remove, {} unchanged",
            changeset.to_fetch.len(),
            changeset.to_remove.len(),
            changeset.unchanged.len()
        );

        if changeset.is_empty() {
            println!("{} cache is up to date ({} artifacts)", "✓".green(), changeset.unchanged.len());
            return Ok(());
        }

        if self.dry_run {
            super::plan::print_changeset(&changeset);
            return Ok(());
        }

        // Removal-only changesets run without any source configuration.
        let source: Box<dyn ArtifactSource> = if changeset.to_fetch.is_empty() {
            Box::new(UnconfiguredSource)
        } else {
            self.source.build()?
        };

        let progress = if no_progress || changeset.to_fetch.is_empty() {
            None
        } else {
            let pb = ProgressBar::new(changeset.to_fetch.len() as u64);
            pb.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.set_message("fetching artifacts");
            Some(pb)
        };

        let outcome = reconcile::execute(
            changeset,
            &old_state,
            &self.paths.cache_dir,
            source.as_ref(),
            self.max_parallel,
            progress.as_ref(),
        )
        .await?;

        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }

        // Report the outcome before persisting: a state save failure must not
        // swallow what the run actually did to the cache directory.
        println!(
            "{} synced: {} fetched, {} removed, {} cached",
            if outcome.is_success() { "✓".green() } else { "!".yellow() },
            outcome.fetched,
            outcome.removed,
            outcome.state.len(),
        );

        if !outcome.is_success() {
            eprintln!();
            eprintln!("{}:", "failed artifacts".red().bold());
            for failure in &outcome.failures {
                eprintln!("  {failure}");
            }
        }

        // Persist everything that succeeded even when siblings failed.
        outcome.state.save(&self.paths.state)?;

        if !outcome.is_success() {
            let ids: Vec<&str> = outcome.failures.iter().map(|f| f.id.as_str()).collect();
            return Err(anyhow!(
                "failed to reconcile {} artifact(s): {}",
                outcome.failures.len(),
                ids.join(", ")
            ));
        }

        Ok(())
    }
}
