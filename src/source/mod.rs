//! Artifact download abstraction.
//!
//! The reconciliation executor is written against the [`ArtifactSource`]
//! trait: something that can turn an `(id, version)` pair into bytes plus a
//! file name, and an `id` into display metadata. Two implementations ship
//! with the binary:
//!
//! - [`HttpSource`] - talks to a JSON artifact API over HTTP
//! - [`DirSource`] - serves artifacts from a local directory tree, used by
//!   the test suite and offline workflows
//!
//! Metadata is consumed by reporting (`status --metadata`) only; the
//! diff/reconcile path never calls [`ArtifactSource::fetch_metadata`].

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

mod dir;
mod http;

pub use dir::DirSource;
pub use http::HttpSource;

/// A downloaded artifact: the file name it should be stored under and its
/// contents.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    /// File name inside the cache directory
    pub file_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Display metadata for an artifact, used by reporting only.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactMetadata {
    /// Human-readable name
    #[serde(alias = "name")]
    pub display_name: String,
    /// Project homepage, when known
    #[serde(default, alias = "websiteUrl")]
    pub homepage_url: Option<String>,
    /// Author name, when known
    #[serde(default)]
    pub author: Option<String>,
}

/// Capability to resolve artifacts and their metadata.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Resolve an artifact id and version to a file name and bytes.
    ///
    /// Fails with [`crate::core::ModsyncError::ArtifactNotFound`] when the
    /// pair does not exist and [`crate::core::ModsyncError::NetworkError`]
    /// on transport failures.
    async fn resolve(&self, id: &str, version: &str) -> Result<ResolvedArtifact>;

    /// Fetch display metadata for an artifact id.
    async fn fetch_metadata(&self, id: &str) -> Result<ArtifactMetadata>;
}
