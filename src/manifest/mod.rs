//! Manifest parsing and validation (modsync.toml).
//!
//! The manifest is the declarative list of desired artifacts. Each entry is a
//! `[[mods]]` table with a numeric `id`, a numeric `version`, an optional
//! `required` flag (default `true`), and an optional display `name`:
//!
//! ```toml
//! [[mods]]
//! id = 247560
//! version = 3361988
//! name = "Just Enough Items"
//!
//! [[mods]]
//! id = "238222"
//! version = "4593548"
//! required = false
//! ```
//!
//! Identifiers may be written as TOML integers or numeric strings; both are
//! normalized to canonical decimal strings so `id = 7` and `id = "007"` refer
//! to the same artifact. Parsing is side-effect free beyond reading the file
//! and fails with a validation error naming the offending entry's position.
//!
//! The `required` flag is metadata for downstream consumers (reporting,
//! packaging policy); it never influences the diff.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::ModsyncError;

/// A single validated manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Canonical artifact identifier (decimal string)
    pub id: String,
    /// Canonical version identifier (decimal string)
    pub version: String,
    /// Whether the artifact is required (metadata only, default `true`)
    pub required: bool,
    /// Optional display name for reporting
    pub name: Option<String>,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({}@{})", name, self.id, self.version),
            None => write!(f, "{}@{}", self.id, self.version),
        }
    }
}

/// A parsed and validated manifest: an ordered sequence of entries with
/// unique artifact ids.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Entries in manifest order
    pub entries: Vec<ManifestEntry>,
}

/// Raw identifier as written in TOML: integer or string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Integer(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<RawId>,
    version: Option<RawId>,
    required: Option<bool>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    mods: Vec<RawEntry>,
}

impl Manifest {
    /// Load and validate a manifest from disk.
    ///
    /// Fails with [`ModsyncError::ManifestNotFound`] when the file does not
    /// exist, [`ModsyncError::ManifestParseError`] on TOML syntax errors, and
    /// [`ModsyncError::ManifestValidationError`] on semantic problems.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModsyncError::ManifestNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read manifest: {}", path.display()))?;

        Self::parse(&content).map_err(|e| match e.downcast::<ModsyncError>() {
            Ok(ModsyncError::ManifestParseError { reason, .. }) => {
                ModsyncError::ManifestParseError {
                    file: path.display().to_string(),
                    reason,
                }
                .into()
            }
            Ok(other) => other.into(),
            Err(other) => other,
        })
    }

    /// Parse and validate manifest content.
    ///
    /// Validation rules:
    /// - `id` and `version` are mandatory and must be non-negative integers
    ///   (TOML integer or numeric string)
    /// - artifact ids must be unique across the manifest
    ///
    /// Errors name the offending entry's 1-based position.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawManifest =
            toml::from_str(content).map_err(|e| ModsyncError::ManifestParseError {
                file: "<inline>".to_string(),
                reason: e.to_string(),
            })?;

        let mut entries = Vec::with_capacity(raw.mods.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (index, raw_entry) in raw.mods.into_iter().enumerate() {
            let position = index + 1;
            let id = normalize_identifier(raw_entry.id, "id", position)?;
            let version = normalize_identifier(raw_entry.version, "version", position)?;

            if let Some(first) = seen.insert(id.clone(), position) {
                return Err(ModsyncError::ManifestValidationError {
                    reason: format!(
                        "entry {position}: duplicate artifact id {id} (first defined at entry {first})"
                    ),
                }
                .into());
            }

            entries.push(ManifestEntry {
                id,
                version,
                required: raw_entry.required.unwrap_or(true),
                name: raw_entry.name,
            });
        }

        Ok(Self { entries })
    }

    /// Number of entries in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize a raw identifier into a canonical decimal string.
///
/// Accepts non-negative TOML integers and strings containing only digits.
/// Numeric strings are round-tripped through `u64` so leading zeros collapse.
fn normalize_identifier(
    raw: Option<RawId>,
    field: &str,
    position: usize,
) -> Result<String, ModsyncError> {
    let raw = raw.ok_or_else(|| ModsyncError::ManifestValidationError {
        reason: format!("entry {position}: missing field `{field}`"),
    })?;

    match raw {
        RawId::Integer(n) if n >= 0 => Ok(n.to_string()),
        RawId::Integer(n) => Err(ModsyncError::ManifestValidationError {
            reason: format!("entry {position}: negative {field} {n}"),
        }),
        RawId::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u64>()
                .map(|n| n.to_string())
                .map_err(|_| ModsyncError::ManifestValidationError {
                    reason: format!("entry {position}: non-numeric {field} \"{s}\""),
                })
        }
    }
}
