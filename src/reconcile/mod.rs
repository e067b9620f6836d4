//! Changeset execution against the cache directory.
//!
//! [`execute`] owns the two shared mutable resources of a run - the cache
//! directory and the working [`CacheState`] - and applies a [`Changeset`] in
//! two phases:
//!
//! 1. **Removals**, sequentially. Deleting a file that is already gone is not
//!    an error: after an interrupted run the state may lag the filesystem.
//!    Every removal completes before any fetch starts, so the cache never
//!    holds two files for the same artifact.
//! 2. **Fetches**, concurrently up to a parallelism bound via
//!    `buffer_unordered`. Each successful download is written atomically and
//!    recorded with its SHA-256 checksum; each failure is collected without
//!    touching whatever the working state already holds for that id.
//!
//! Per-artifact failures never abort sibling artifacts. The outcome carries
//! the final working state (reflecting everything that did succeed) alongside
//! the aggregated failures; the caller persists the state and turns the
//! failure list into the process exit status.
//!
//! If deleting the old copy of a version-changed artifact fails, the paired
//! fetch is skipped and the old record kept, preserving both the
//! one-file-per-artifact invariant and the state/disk correspondence.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use sha2::{Digest, Sha256};

use crate::core::ModsyncError;
use crate::diff::Changeset;
use crate::source::ArtifactSource;
use crate::state::{CacheRecord, CacheState};
use crate::utils::fs::{atomic_write, ensure_dir};

/// A failure affecting a single artifact during reconciliation.
#[derive(Debug)]
pub struct ArtifactFailure {
    /// Artifact id the failure belongs to
    pub id: String,
    /// What went wrong
    pub error: anyhow::Error,
}

impl fmt::Display for ArtifactFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.id, self.error)
    }
}

/// Result of applying a changeset.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The working state after all successful steps
    pub state: CacheState,
    /// Number of artifacts fetched and written
    pub fetched: usize,
    /// Number of files removed
    pub removed: usize,
    /// Per-artifact failures, empty on full success
    pub failures: Vec<ArtifactFailure>,
}

impl ReconcileOutcome {
    /// Whether every step of the changeset succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply a changeset to the cache directory.
///
/// Consumes the changeset by value: the executor is its only consumer and no
/// partially-applied changeset ever escapes. `max_parallel` bounds concurrent
/// downloads (clamped to at least 1). `progress`, when present, is advanced
/// once per finished fetch.
pub async fn execute(
    changeset: Changeset,
    old_state: &CacheState,
    cache_dir: &Path,
    source: &dyn ArtifactSource,
    max_parallel: usize,
    progress: Option<&ProgressBar>,
) -> Result<ReconcileOutcome> {
    let mut state = old_state.clone();
    let mut failures = Vec::new();
    let mut removed = 0usize;
    let mut failed_removals: HashSet<String> = HashSet::new();

    for removal in &changeset.to_remove {
        if let Some(file_name) = &removal.file_name {
            let path = cache_dir.join(file_name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("removed {} ({:?})", path.display(), removal.reason);
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // State was ahead of the filesystem; nothing to do.
                    tracing::debug!("{} already absent", path.display());
                }
                Err(e) => {
                    failures.push(ArtifactFailure {
                        id: removal.id.clone(),
                        error: ModsyncError::FileSystemError {
                            operation: format!("delete stale file ({e})"),
                            path: path.display().to_string(),
                        }
                        .into(),
                    });
                    failed_removals.insert(removal.id.clone());
                    continue;
                }
            }
        }
        state.artifacts.remove(&removal.id);
    }

    let fetches: Vec<_> = changeset
        .to_fetch
        .into_iter()
        .filter(|fetch| {
            if failed_removals.contains(&fetch.id) {
                // The old file is still on disk; fetching now would leave two
                // files claiming the same artifact slot.
                tracing::warn!("skipping fetch of {}: stale file could not be removed", fetch.id);
                false
            } else {
                true
            }
        })
        .collect();

    if !fetches.is_empty() {
        ensure_dir(cache_dir)?;
    }

    let concurrency = max_parallel.max(1);
    let results: Vec<Result<(String, String, String, String), (String, anyhow::Error)>> =
        stream::iter(fetches.into_iter().map(|fetch| async move {
            let result = fetch_one(source, cache_dir, &fetch.id, &fetch.version).await;
            if let Some(pb) = progress {
                pb.inc(1);
            }
            match result {
                Ok((file_name, checksum)) => Ok((fetch.id, fetch.version, file_name, checksum)),
                Err(error) => Err((fetch.id, error)),
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut fetched = 0usize;
    for result in results {
        match result {
            Ok((id, version, file_name, checksum)) => {
                fetched += 1;
                state.artifacts.insert(
                    id,
                    CacheRecord {
                        version,
                        file_name: Some(file_name),
                        checksum: Some(checksum),
                    },
                );
            }
            Err((id, error)) => {
                // Whatever the working state holds for this id stays as is:
                // a failed re-fetch must not regress a working entry.
                failures.push(ArtifactFailure { id, error });
            }
        }
    }

    Ok(ReconcileOutcome {
        state,
        fetched,
        removed,
        failures,
    })
}

/// Download one artifact and write it atomically into the cache directory.
///
/// Returns the file name and the hex SHA-256 of the written bytes.
async fn fetch_one(
    source: &dyn ArtifactSource,
    cache_dir: &Path,
    id: &str,
    version: &str,
) -> Result<(String, String)> {
    let artifact = source.resolve(id, version).await?;

    let target = cache_dir.join(&artifact.file_name);
    atomic_write(&target, &artifact.bytes).map_err(|e| ModsyncError::FileSystemError {
        operation: format!("write fetched artifact ({e:#})"),
        path: target.display().to_string(),
    })?;

    let checksum = hex::encode(Sha256::digest(&artifact.bytes));
    tracing::debug!("fetched {id}@{version} -> {} ({checksum})", artifact.file_name);
    Ok((artifact.file_name, checksum))
}
