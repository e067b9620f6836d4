//! Local directory artifact source.
//!
//! Serves artifacts from a directory tree laid out as
//! `{root}/{id}/{version}/<file>`, where each version directory holds exactly
//! one regular file. Metadata, when present, lives in
//! `{root}/{id}/metadata.toml` with the fields of
//! [`ArtifactMetadata`](super::ArtifactMetadata).
//!
//! This source exists for the integration test suite and for air-gapped
//! setups where a mirror of the artifacts is available on disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::core::ModsyncError;

use super::{ArtifactMetadata, ArtifactSource, ResolvedArtifact};

/// Artifact source backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactSource for DirSource {
    async fn resolve(&self, id: &str, version: &str) -> Result<ResolvedArtifact> {
        let version_dir = self.root.join(id).join(version);
        if !version_dir.is_dir() {
            return Err(ModsyncError::ArtifactNotFound {
                id: id.to_string(),
                version: version.to_string(),
            }
            .into());
        }

        let mut entries = tokio::fs::read_dir(&version_dir)
            .await
            .with_context(|| format!("Cannot read source directory: {}", version_dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let bytes = tokio::fs::read(entry.path())
                .await
                .with_context(|| format!("Cannot read artifact file: {}", entry.path().display()))?;
            return Ok(ResolvedArtifact { file_name, bytes });
        }

        Err(ModsyncError::ArtifactNotFound {
            id: id.to_string(),
            version: version.to_string(),
        }
        .into())
    }

    async fn fetch_metadata(&self, id: &str) -> Result<ArtifactMetadata> {
        let metadata_path = self.root.join(id).join("metadata.toml");
        if !metadata_path.is_file() {
            return Ok(ArtifactMetadata {
                display_name: id.to_string(),
                homepage_url: None,
                author: None,
            });
        }

        let content = tokio::fs::read_to_string(&metadata_path)
            .await
            .with_context(|| format!("Cannot read metadata: {}", metadata_path.display()))?;
        let metadata: ArtifactMetadata = toml::from_str(&content)
            .with_context(|| format!("Invalid metadata file: {}", metadata_path.display()))?;
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, DirSource) {
        let temp = TempDir::new().unwrap();
        let version_dir = temp.path().join("1/a");
        fs::create_dir_all(&version_dir).unwrap();
        fs::write(version_dir.join("one.jar"), b"contents-1a").unwrap();
        fs::write(
            temp.path().join("1/metadata.toml"),
            "display_name = \"Mod One\"\nauthor = \"someone\"\n",
        )
        .unwrap();
        let source = DirSource::new(temp.path());
        (temp, source)
    }

    #[tokio::test]
    async fn test_resolve_reads_single_file() {
        let (_temp, source) = fixture();
        let artifact = source.resolve("1", "a").await.unwrap();
        assert_eq!(artifact.file_name, "one.jar");
        assert_eq!(artifact.bytes, b"contents-1a");
    }

    #[tokio::test]
    async fn test_resolve_unknown_version_is_not_found() {
        let (_temp, source) = fixture();
        let err = source.resolve("1", "zz").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_metadata_from_file() {
        let (_temp, source) = fixture();
        let metadata = source.fetch_metadata("1").await.unwrap();
        assert_eq!(metadata.display_name, "Mod One");
        assert_eq!(metadata.author.as_deref(), Some("someone"));
    }

    #[tokio::test]
    async fn test_metadata_defaults_to_id() {
        let (_temp, source) = fixture();
        let metadata = source.fetch_metadata("42").await.unwrap();
        assert_eq!(metadata.display_name, "42");
        assert!(metadata.homepage_url.is_none());
    }
}
