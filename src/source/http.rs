//! HTTP artifact source.
//!
//! Talks to a JSON artifact API rooted at a base URL:
//!
//! - `GET {base}/artifacts/{id}/files/{version}` returns a file pointer
//!   `{"file_name": "...", "download_url": "..."}`
//! - `GET {download_url}` returns the raw bytes
//! - `GET {base}/artifacts/{id}` returns display metadata
//!
//! 404 responses map to [`ModsyncError::ArtifactNotFound`]; every other
//! transport or status failure maps to [`ModsyncError::NetworkError`].

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::core::ModsyncError;

use super::{ArtifactMetadata, ArtifactSource, ResolvedArtifact};

/// Artifact source backed by an HTTP JSON API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FilePointer {
    #[serde(alias = "fileName")]
    file_name: String,
    #[serde(alias = "downloadUrl")]
    download_url: String,
}

impl HttpSource {
    /// Create a source for the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, url: &str, operation: &str) -> Result<reqwest::Response, ModsyncError> {
        let response =
            self.client.get(url).send().await.map_err(|e| ModsyncError::NetworkError {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;
        Ok(response)
    }
}

#[async_trait]
impl ArtifactSource for HttpSource {
    async fn resolve(&self, id: &str, version: &str) -> Result<ResolvedArtifact> {
        let operation = format!("resolve artifact {id}@{version}");
        let url = format!("{}/artifacts/{id}/files/{version}", self.base_url);

        let response = self.get(&url, &operation).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ModsyncError::ArtifactNotFound {
                id: id.to_string(),
                version: version.to_string(),
            }
            .into());
        }
        let response = response.error_for_status().map_err(|e| ModsyncError::NetworkError {
            operation: operation.clone(),
            reason: e.to_string(),
        })?;

        let pointer: FilePointer =
            response.json().await.map_err(|e| ModsyncError::NetworkError {
                operation: operation.clone(),
                reason: format!("invalid file pointer payload: {e}"),
            })?;

        tracing::debug!("downloading {} from {}", pointer.file_name, pointer.download_url);

        let download = self.get(&pointer.download_url, &operation).await?;
        let download = download.error_for_status().map_err(|e| ModsyncError::NetworkError {
            operation: operation.clone(),
            reason: e.to_string(),
        })?;
        let bytes = download.bytes().await.map_err(|e| ModsyncError::NetworkError {
            operation,
            reason: e.to_string(),
        })?;

        Ok(ResolvedArtifact {
            file_name: pointer.file_name,
            bytes: bytes.to_vec(),
        })
    }

    async fn fetch_metadata(&self, id: &str) -> Result<ArtifactMetadata> {
        let operation = format!("fetch metadata for artifact {id}");
        let url = format!("{}/artifacts/{id}", self.base_url);

        let response = self.get(&url, &operation).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ModsyncError::ArtifactNotFound {
                id: id.to_string(),
                version: "any".to_string(),
            }
            .into());
        }
        let response = response.error_for_status().map_err(|e| ModsyncError::NetworkError {
            operation: operation.clone(),
            reason: e.to_string(),
        })?;

        let metadata = response.json().await.map_err(|e| ModsyncError::NetworkError {
            operation,
            reason: format!("invalid metadata payload: {e}"),
        })?;
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let source = HttpSource::new("https://api.example.com/");
        assert_eq!(source.base_url, "https://api.example.com");
    }
}
