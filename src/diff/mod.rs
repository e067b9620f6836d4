//! Changeset computation.
//!
//! [`diff`] compares the desired manifest against the last persisted
//! [`CacheState`] and produces the minimal ordered [`Changeset`]: artifacts to
//! remove, artifacts to fetch, and artifacts to leave untouched. It is a pure
//! function of `(artifact id, version)` pairs - it never looks at file bytes,
//! checksums, or the filesystem - which keeps it trivially testable apart
//! from all I/O.
//!
//! A version change produces both a removal and a fetch for the same id; the
//! executor processes every removal before any fetch, so the cache never
//! holds two files for one artifact.
//!
//! Removals carry a [`RemovalReason`] distinguishing "dropped from manifest"
//! from "version changed". The reason is consumed by reporting only and does
//! not alter execution order.

use std::collections::HashMap;

use crate::manifest::ManifestEntry;
use crate::state::CacheState;

/// Why an artifact is being removed from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// The artifact no longer appears in the manifest
    Dropped,
    /// The manifest requests a different version; a paired fetch follows
    VersionChanged,
}

/// A single removal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Artifact id being removed
    pub id: String,
    /// File to delete from the cache directory, when one was recorded
    pub file_name: Option<String>,
    /// Why the removal was scheduled
    pub reason: RemovalReason,
}

/// A single fetch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
    /// Artifact id to fetch
    pub id: String,
    /// Version to fetch
    pub version: String,
    /// `required` flag from the manifest (reporting only)
    pub required: bool,
}

/// The computed difference between manifest and cache state.
///
/// The three lists are disjoint over artifact id except that a version change
/// contributes the same id to both `to_remove` and `to_fetch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    /// Removals, ordered by artifact id
    pub to_remove: Vec<Removal>,
    /// Fetches, in manifest order
    pub to_fetch: Vec<Fetch>,
    /// Ids present in both sides with identical versions, in manifest order
    pub unchanged: Vec<String>,
}

impl Changeset {
    /// Whether the changeset requires no work.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_fetch.is_empty()
    }
}

/// Compute the changeset for a manifest against the previous cache state.
///
/// Linear in the number of artifacts. Removals are emitted in state order
/// (sorted by id), fetches and unchanged entries in manifest order, so the
/// result is deterministic: calling `diff` twice on the same inputs yields an
/// identical changeset.
///
/// A record whose `file_name` is absent (interrupted fetch) is re-fetched
/// even when its version matches the manifest; no removal is emitted for it
/// because nothing was written to disk.
#[must_use]
pub fn diff(entries: &[ManifestEntry], old: &CacheState) -> Changeset {
    let desired: HashMap<&str, &ManifestEntry> =
        entries.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut changeset = Changeset::default();

    // BTreeMap iteration keeps removals sorted by id.
    for (id, record) in &old.artifacts {
        match desired.get(id.as_str()) {
            None => changeset.to_remove.push(Removal {
                id: id.clone(),
                file_name: record.file_name.clone(),
                reason: RemovalReason::Dropped,
            }),
            Some(entry) if entry.version != record.version => {
                // The old copy comes off disk before the new version lands.
                // An interrupted record has nothing on disk to remove.
                if record.file_name.is_some() {
                    changeset.to_remove.push(Removal {
                        id: id.clone(),
                        file_name: record.file_name.clone(),
                        reason: RemovalReason::VersionChanged,
                    });
                }
            }
            Some(_) => {}
        }
    }

    for entry in entries {
        match old.artifacts.get(&entry.id) {
            Some(record) if record.version == entry.version && record.file_name.is_some() => {
                changeset.unchanged.push(entry.id.clone());
            }
            _ => changeset.to_fetch.push(Fetch {
                id: entry.id.clone(),
                version: entry.version.clone(),
                required: entry.required,
            }),
        }
    }

    changeset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CacheRecord;

    fn entry(id: &str, version: &str) -> ManifestEntry {
        ManifestEntry {
            id: id.to_string(),
            version: version.to_string(),
            required: true,
            name: None,
        }
    }

    fn state(records: &[(&str, &str, Option<&str>)]) -> CacheState {
        let mut state = CacheState::new();
        for (id, version, file_name) in records {
            state.artifacts.insert(
                (*id).to_string(),
                CacheRecord {
                    version: (*version).to_string(),
                    file_name: file_name.map(str::to_string),
                    checksum: None,
                },
            );
        }
        state
    }

    #[test]
    fn test_empty_state_fetches_everything() {
        let entries = vec![entry("1", "a"), entry("2", "b")];
        let changeset = diff(&entries, &CacheState::new());

        assert!(changeset.to_remove.is_empty());
        assert_eq!(changeset.to_fetch.len(), 2);
        assert_eq!(changeset.to_fetch[0].id, "1");
        assert_eq!(changeset.to_fetch[1].id, "2");
        assert!(changeset.unchanged.is_empty());
    }

    #[test]
    fn test_matching_version_is_unchanged() {
        let entries = vec![entry("1", "a")];
        let old = state(&[("1", "a", Some("f1"))]);
        let changeset = diff(&entries, &old);

        assert!(changeset.is_empty());
        assert_eq!(changeset.unchanged, vec!["1"]);
    }

    #[test]
    fn test_version_change_pairs_removal_with_fetch() {
        let entries = vec![entry("1", "b")];
        let old = state(&[("1", "a", Some("f1"))]);
        let changeset = diff(&entries, &old);

        assert_eq!(
            changeset.to_remove,
            vec![Removal {
                id: "1".to_string(),
                file_name: Some("f1".to_string()),
                reason: RemovalReason::VersionChanged,
            }]
        );
        assert_eq!(changeset.to_fetch.len(), 1);
        assert_eq!(changeset.to_fetch[0].version, "b");
        assert!(changeset.unchanged.is_empty());
    }

    #[test]
    fn test_dropped_artifact_is_removed_only() {
        let entries = vec![entry("1", "a")];
        let old = state(&[("1", "a", Some("f1")), ("2", "b", Some("f2"))]);
        let changeset = diff(&entries, &old);

        assert_eq!(changeset.to_remove.len(), 1);
        assert_eq!(changeset.to_remove[0].id, "2");
        assert_eq!(changeset.to_remove[0].reason, RemovalReason::Dropped);
        assert!(changeset.to_fetch.is_empty());
        assert_eq!(changeset.unchanged, vec!["1"]);
    }

    #[test]
    fn test_interrupted_record_refetched_without_removal() {
        // file_name: None marks a fetch that never completed
        let entries = vec![entry("1", "a")];
        let old = state(&[("1", "a", None)]);
        let changeset = diff(&entries, &old);

        assert!(changeset.to_remove.is_empty());
        assert_eq!(changeset.to_fetch.len(), 1);
        assert_eq!(changeset.to_fetch[0].id, "1");
    }

    #[test]
    fn test_interrupted_record_with_version_change_refetched_without_removal() {
        let entries = vec![entry("1", "b")];
        let old = state(&[("1", "a", None)]);
        let changeset = diff(&entries, &old);

        assert!(changeset.to_remove.is_empty());
        assert_eq!(changeset.to_fetch.len(), 1);
        assert_eq!(changeset.to_fetch[0].version, "b");
    }

    #[test]
    fn test_diff_is_deterministic() {
        let entries = vec![entry("3", "c"), entry("1", "b"), entry("2", "b")];
        let old = state(&[("1", "a", Some("f1")), ("4", "d", Some("f4"))]);

        let first = diff(&entries, &old);
        let second = diff(&entries, &old);
        assert_eq!(first, second);
    }

    #[test]
    fn test_required_flag_does_not_influence_diffing() {
        let mut optional = entry("1", "b");
        optional.required = false;
        let old = state(&[("1", "a", Some("f1"))]);

        let changeset = diff(&[optional], &old);
        assert_eq!(changeset.to_remove.len(), 1);
        assert_eq!(changeset.to_fetch.len(), 1);
        assert!(!changeset.to_fetch[0].required);
    }

    #[test]
    fn test_removals_sorted_fetches_in_manifest_order() {
        let entries = vec![entry("9", "a"), entry("2", "a")];
        let old = state(&[("7", "x", Some("f7")), ("3", "y", Some("f3"))]);
        let changeset = diff(&entries, &old);

        let removed: Vec<_> = changeset.to_remove.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(removed, ["3", "7"]);
        let fetched: Vec<_> = changeset.to_fetch.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(fetched, ["9", "2"]);
    }
}
