//! Shared argument structures and helpers for CLI commands.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use crate::core::{ErrorContext, ModsyncError};
use crate::source::{ArtifactMetadata, ArtifactSource, DirSource, HttpSource, ResolvedArtifact};

/// File locations shared by every command that touches the project.
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Path to the manifest file
    #[arg(long, default_value = "modsync.toml")]
    pub manifest: PathBuf,

    /// Path to the cache state file
    #[arg(long, default_value = "modsync.lock")]
    pub state: PathBuf,

    /// Directory holding the cached mod files
    #[arg(long, default_value = "mods")]
    pub cache_dir: PathBuf,
}

/// Artifact source selection. A local directory takes precedence over a URL.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Base URL of the artifact API
    #[arg(long, env = "MODSYNC_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Local directory tree to resolve artifacts from (overrides --source-url)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,
}

impl SourceArgs {
    /// Build the configured artifact source.
    ///
    /// Fails with a suggestion when neither `--source-dir` nor `--source-url`
    /// (or `MODSYNC_SOURCE_URL`) is set.
    pub fn build(&self) -> Result<Box<dyn ArtifactSource>> {
        if let Some(dir) = &self.source_dir {
            return Ok(Box::new(DirSource::new(dir.clone())));
        }
        if let Some(url) = &self.source_url {
            return Ok(Box::new(HttpSource::new(url.clone())));
        }
        Err(anyhow::Error::new(
            ErrorContext::new(ModsyncError::Other {
                message: "no artifact source configured".to_string(),
            })
            .with_suggestion(
                "Pass --source-url (or set MODSYNC_SOURCE_URL), or --source-dir for a local mirror",
            ),
        ))
    }
}

/// Placeholder source for runs whose changeset needs no downloads.
///
/// Lets removal-only syncs proceed without any source configuration; every
/// call is a bug and reports itself as such.
pub struct UnconfiguredSource;

#[async_trait]
impl ArtifactSource for UnconfiguredSource {
    async fn resolve(&self, id: &str, version: &str) -> Result<ResolvedArtifact> {
        Err(ModsyncError::Other {
            message: format!("no source configured to resolve {id}@{version}"),
        }
        .into())
    }

    async fn fetch_metadata(&self, id: &str) -> Result<ArtifactMetadata> {
        Err(ModsyncError::Other {
            message: format!("no source configured to fetch metadata for {id}"),
        }
        .into())
    }
}
