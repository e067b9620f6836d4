//! Error handling for modsync
//!
//! Two layers make up the error system:
//! - [`ModsyncError`] - enumerated error types for every failure mode the rest
//!   of the crate needs to branch on
//! - [`ErrorContext`] - a wrapper that adds a user-facing suggestion and
//!   details, displayed with terminal colors by the CLI entry point
//!
//! # Error Categories
//!
//! - **Manifest**: [`ModsyncError::ManifestNotFound`],
//!   [`ModsyncError::ManifestParseError`],
//!   [`ModsyncError::ManifestValidationError`]
//! - **Cache state**: [`ModsyncError::StateParseError`],
//!   [`ModsyncError::StateVersionTooNew`], [`ModsyncError::PersistenceError`]
//! - **Artifacts**: [`ModsyncError::ArtifactNotFound`],
//!   [`ModsyncError::NetworkError`], [`ModsyncError::FileSystemError`]
//!
//! Per-artifact errors (network, not-found, filesystem) are recoverable: the
//! reconciliation run records them and continues with sibling artifacts.
//! Manifest validation and state persistence errors are fatal for the run.
//!
//! Use [`user_friendly_error`] to convert any [`anyhow::Error`] into a
//! displayable [`ErrorContext`] with contextual suggestions.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for modsync operations.
///
/// Each variant carries the details a caller needs to report the failure or
/// decide whether to keep going. Variants map onto the taxonomy the tool
/// exposes to users: fatal manifest/persistence errors and recoverable
/// per-artifact errors.
#[derive(Error, Debug)]
pub enum ModsyncError {
    /// Manifest file was not found at the given path
    #[error("manifest file not found: {path}")]
    ManifestNotFound {
        /// Path that was searched
        path: String,
    },

    /// Manifest file exists but is not valid TOML
    #[error("invalid manifest syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file
        file: String,
        /// Parser error text
        reason: String,
    },

    /// Manifest parsed but failed validation (missing field, non-numeric id,
    /// duplicate id). The reason names the offending entry's position.
    #[error("manifest validation failed: {reason}")]
    ManifestValidationError {
        /// Human-readable validation failure, including the entry position
        reason: String,
    },

    /// Cache state file exists but could not be parsed.
    ///
    /// Callers downgrade this to a warning: a corrupt state file is treated
    /// as absent, degrading to a full refetch rather than silent staleness.
    #[error("invalid cache state file {file}: {reason}")]
    StateParseError {
        /// Path to the state file
        file: String,
        /// Parser error text
        reason: String,
    },

    /// Cache state file was written by a newer modsync
    #[error("cache state format version {found} is newer than supported version {supported}")]
    StateVersionTooNew {
        /// Version found in the file
        found: u32,
        /// Newest version this build understands
        supported: u32,
    },

    /// The requested artifact/version pair does not exist at the source
    #[error("artifact {id} version {version} not found at source")]
    ArtifactNotFound {
        /// Artifact identifier
        id: String,
        /// Requested version identifier
        version: String,
    },

    /// Network-level failure talking to the artifact source
    #[error("network error during {operation}: {reason}")]
    NetworkError {
        /// What was being attempted (e.g. "resolve artifact 247560")
        operation: String,
        /// Underlying error text
        reason: String,
    },

    /// Filesystem operation on the cache directory failed
    #[error("file system error during {operation}: {path}")]
    FileSystemError {
        /// What was being attempted (e.g. "delete stale file")
        operation: String,
        /// Path involved
        path: String,
    },

    /// The final cache state could not be persisted.
    ///
    /// Fatal for the run's durability guarantee: the in-memory result is
    /// still reported, but the next run will re-diff from stale state.
    #[error("failed to persist cache state to {path}: {reason}")]
    PersistenceError {
        /// Path to the state file
        path: String,
        /// Underlying error text
        reason: String,
    },

    /// Catch-all for errors without a dedicated variant
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// User-friendly error wrapper with suggestions and details.
///
/// Wraps any error and adds optional context displayed to CLI users:
/// the error itself in red, details in yellow, and an actionable suggestion
/// in green. This is the only error presentation surface of the binary.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining why the error occurred.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`ModsyncError`] variants and common [`std::io::Error`] kinds
/// and attaches tailored suggestions; everything else passes through with no
/// extra decoration.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // A context built closer to the failure site already knows best.
    let error = match error.downcast::<ErrorContext>() {
        Ok(ctx) => return ctx,
        Err(error) => error,
    };

    if let Some(e) = error.downcast_ref::<ModsyncError>() {
        let (suggestion, details) = match e {
            ModsyncError::ManifestNotFound { .. } => (
                Some("Run 'modsync init' to create a manifest, or pass --manifest with the correct path"),
                None,
            ),
            ModsyncError::ManifestParseError { .. } => (
                Some("Check the manifest for TOML syntax errors; each entry is a [[mods]] table"),
                None,
            ),
            ModsyncError::ManifestValidationError { .. } => (
                Some("Fix the named entry: id and version must be numeric and ids must be unique"),
                None,
            ),
            ModsyncError::StateVersionTooNew { .. } => (
                Some("Update modsync to the latest version to use this state file"),
                None,
            ),
            ModsyncError::ArtifactNotFound { .. } => (
                Some("Check that the id and version in the manifest exist at the source"),
                None,
            ),
            ModsyncError::NetworkError { .. } => (
                Some("Check your network connection and the --source-url value, then retry"),
                None,
            ),
            ModsyncError::PersistenceError { .. } => (
                Some("Check permissions and free disk space for the state file location"),
                Some(
                    "The cache directory was updated but the state file was not; the next run \
                     will re-diff from stale state and redo some work",
                ),
            ),
            _ => (None, None),
        };
        let mut ctx = ErrorContext::new(error);
        if let Some(s) = suggestion {
            ctx = ctx.with_suggestion(s);
        }
        if let Some(d) = details {
            ctx = ctx.with_details(d);
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let suggestion = match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Some("Check file ownership or try running with elevated permissions")
            }
            std::io::ErrorKind::NotFound => {
                Some("Check that the file or directory exists and the path is correct")
            }
            _ => None,
        };
        let mut ctx = ErrorContext::new(error);
        if let Some(s) = suggestion {
            ctx = ctx.with_suggestion(s);
        }
        return ctx;
    }

    ErrorContext::new(error)
}
