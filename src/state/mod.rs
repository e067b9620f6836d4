//! Durable cache state (modsync.lock).
//!
//! The state file records what was last successfully materialized in the
//! cache directory: a mapping from artifact id to `{version, file_name,
//! checksum}`. It is the single source of truth the diff engine compares the
//! manifest against.
//!
//! # Load semantics
//!
//! - Missing file: empty state (first run). There is no cheap way to
//!   distinguish "never ran" from "cache wiped", and both require a full
//!   fetch, so the two are deliberately conflated.
//! - Unparsable file: logged warning, empty state. A corrupt record degrades
//!   to a full refetch rather than silent staleness.
//! - Format version newer than this build: hard error, the file was written
//!   by a newer modsync.
//!
//! # Save semantics
//!
//! Saves are atomic (temp file + fsync + rename), so a crash during save
//! never leaves a truncated record. A record whose `file_name` is absent
//! marks an artifact whose fetch had not completed when the state was
//! written; the diff engine schedules it for re-fetch.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::ModsyncError;
use crate::utils::fs::atomic_write;

/// One persisted cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Version identifier the entry was fetched at
    pub version: String,
    /// File name inside the cache directory. Absent exactly when the record
    /// was created but the download has not completed (crash marker).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_name: Option<String>,
    /// Hex-encoded SHA-256 of the cached file, recorded on fetch and used
    /// only by `status --verify`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub checksum: Option<String>,
}

/// Persisted mapping from artifact id to [`CacheRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheState {
    /// State file format version
    #[serde(default = "default_format_version")]
    pub version: u32,
    /// Records keyed by artifact id
    #[serde(default)]
    pub artifacts: BTreeMap<String, CacheRecord>,
}

const fn default_format_version() -> u32 {
    CacheState::CURRENT_VERSION
}

impl CacheState {
    /// Newest state file format version this build understands.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create an empty state at the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            artifacts: BTreeMap::new(),
        }
    }

    /// Load the state file, degrading safely when it is absent or corrupt.
    ///
    /// Returns an error only when the file was written by a newer modsync or
    /// cannot be read at all (e.g. permissions).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no cache state at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|e| ModsyncError::FileSystemError {
            operation: format!("read cache state ({e})"),
            path: path.display().to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let state: Self = match toml::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                // Corrupt state is treated as absent: the next run refetches
                // everything instead of trusting a record it cannot read.
                let parse_error = ModsyncError::StateParseError {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!("{parse_error}, treating as empty");
                return Ok(Self::new());
            }
        };

        if state.version > Self::CURRENT_VERSION {
            return Err(ModsyncError::StateVersionTooNew {
                found: state.version,
                supported: Self::CURRENT_VERSION,
            }
            .into());
        }

        Ok(state)
    }

    /// Persist the state atomically.
    ///
    /// Failure is a [`ModsyncError::PersistenceError`]: the run's in-memory
    /// result still stands but the next run will re-diff from stale state.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = String::from("# Auto-generated by modsync - DO NOT EDIT\n");
        let body = toml::to_string_pretty(self).map_err(|e| ModsyncError::PersistenceError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        content.push_str(&body);

        atomic_write(path, content.as_bytes()).map_err(|e| {
            ModsyncError::PersistenceError {
                path: path.display().to_string(),
                reason: format!("{e:#}"),
            }
        })?;

        tracing::debug!("saved cache state ({} artifacts) to {}", self.artifacts.len(), path.display());
        Ok(())
    }

    /// Look up the record for an artifact id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CacheRecord> {
        self.artifacts.get(id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the state holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(version: &str, file_name: &str) -> CacheRecord {
        CacheRecord {
            version: version.to_string(),
            file_name: Some(file_name.to_string()),
            checksum: Some("deadbeef".to_string()),
        }
    }

    #[test]
    fn test_load_absent_returns_empty() {
        let temp = TempDir::new().unwrap();
        let state = CacheState::load(&temp.path().join("modsync.lock")).unwrap();
        assert!(state.is_empty());
        assert_eq!(state.version, CacheState::CURRENT_VERSION);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modsync.lock");

        let mut state = CacheState::new();
        state.artifacts.insert("1".to_string(), record("a", "one.jar"));
        state.artifacts.insert(
            "2".to_string(),
            CacheRecord {
                version: "b".to_string(),
                file_name: None,
                checksum: None,
            },
        );
        state.save(&path).unwrap();

        let loaded = CacheState::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("1"), Some(&record("a", "one.jar")));
        // Crash marker survives the round trip
        assert_eq!(loaded.get("2").unwrap().file_name, None);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modsync.lock");
        CacheState::new().save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_state_treated_as_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modsync.lock");
        fs::write(&path, "not [ valid { toml").unwrap();
        let state = CacheState::load(&path).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_empty_file_treated_as_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modsync.lock");
        fs::write(&path, "\n").unwrap();
        assert!(CacheState::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_newer_format_version_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modsync.lock");
        fs::write(&path, "version = 99\n").unwrap();
        let err = CacheState::load(&path).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_saved_file_has_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modsync.lock");
        CacheState::new().save(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Auto-generated by modsync"));
    }
}
