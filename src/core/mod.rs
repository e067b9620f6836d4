//! Core types shared across modsync.
//!
//! This module hosts the error taxonomy and the user-facing error reporting
//! layer. The error system follows two principles:
//!
//! 1. **Strongly-typed errors** ([`ModsyncError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users
//!
//! Most functions in the crate return [`anyhow::Result`] and attach context
//! with [`anyhow::Context`]; typed variants are used where callers need to
//! branch on the failure (per-artifact fetch failures, validation, state
//! persistence).

pub mod error;

pub use error::{ErrorContext, ModsyncError, user_friendly_error};
