//! Report the cache state against the cache directory.
//!
//! Detects the ways disk and state can drift apart: recorded files that are
//! missing, files on disk no state entry references (orphans), and records
//! whose fetch never completed. With `--verify` the recorded SHA-256
//! checksums are recomputed; with `--metadata` display metadata is fetched
//! from the configured source.

use std::collections::BTreeSet;
use std::fs;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sha2::{Digest, Sha256};

use crate::state::CacheState;

use super::common::{PathArgs, SourceArgs};

/// Inspect the cache for drift between state and disk.
#[derive(Args)]
pub struct StatusCommand {
    #[command(flatten)]
    paths: PathArgs,

    #[command(flatten)]
    source: SourceArgs,

    /// Recompute checksums of cached files
    #[arg(long)]
    verify: bool,

    /// Fetch and show display metadata for each artifact
    #[arg(long)]
    metadata: bool,
}

impl StatusCommand {
    /// Execute the status command.
    pub async fn execute(self) -> Result<()> {
        let state = CacheState::load(&self.paths.state)?;

        if state.is_empty() {
            println!("cache state is empty (no artifacts recorded)");
        }

        let source = if self.metadata { Some(self.source.build()?) } else { None };

        let mut referenced = BTreeSet::new();
        let mut problems = 0usize;

        for (id, record) in &state.artifacts {
            let mut line = format!("{id}@{}", record.version);

            if let Some(source) = &source {
                match source.fetch_metadata(id).await {
                    Ok(meta) => {
                        line = format!("{} ({line})", meta.display_name);
                        if let Some(author) = &meta.author {
                            line.push_str(&format!(" by {author}"));
                        }
                        if let Some(url) = &meta.homepage_url {
                            line.push_str(&format!(" - {url}"));
                        }
                    }
                    Err(e) => tracing::warn!("metadata lookup failed for {id}: {e:#}"),
                }
            }

            match &record.file_name {
                None => {
                    println!("{} {line}: fetch never completed", "!".yellow());
                    problems += 1;
                }
                Some(file_name) => {
                    referenced.insert(file_name.clone());
                    let path = self.paths.cache_dir.join(file_name);
                    if !path.is_file() {
                        println!("{} {line}: missing file {file_name}", "✗".red());
                        problems += 1;
                    } else if self.verify {
                        match &record.checksum {
                            None => {
                                println!(
                                    "{} {line}: no checksum recorded for {file_name}",
                                    "!".yellow()
                                );
                            }
                            Some(expected) => {
                                let bytes = fs::read(&path)?;
                                let actual = hex::encode(Sha256::digest(&bytes));
                                if *expected == actual {
                                    println!("{} {line}: {file_name} verified", "✓".green());
                                } else {
                                    println!(
                                        "{} {line}: checksum mismatch for {file_name}",
                                        "✗".red()
                                    );
                                    problems += 1;
                                }
                            }
                        }
                    } else {
                        println!("{} {line}: {file_name}", "✓".green());
                    }
                }
            }
        }

        if self.paths.cache_dir.is_dir() {
            for entry in fs::read_dir(&self.paths.cache_dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type()?.is_file() && !referenced.contains(&name) {
                    println!("{} orphan file not referenced by state: {name}", "!".yellow());
                    problems += 1;
                }
            }
        }

        if problems > 0 {
            println!(
                "{} {problems} inconsistencies found; run 'modsync sync' to repair",
                "!".yellow()
            );
        }

        Ok(())
    }
}
