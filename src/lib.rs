//! modsync - incremental mod cache synchronizer
//!
//! modsync keeps a local directory of mod files in sync with a declarative
//! manifest. A manifest (`modsync.toml`) lists the desired artifacts and their
//! versions; a state file (`modsync.lock`) records what was last materialized
//! on disk. Each run diffs the two, applies the minimal set of deletions and
//! downloads, and persists a new state file atomically.
//!
//! # Architecture Overview
//!
//! The pipeline is a straight line through four components:
//!
//! 1. [`manifest`] parses and validates `modsync.toml` into ordered entries
//! 2. [`state`] loads the persisted [`state::CacheState`] (empty on first run
//!    or after corruption, which safely degrades to a full refetch)
//! 3. [`diff`] computes a [`diff::Changeset`] - removals, fetches, unchanged -
//!    as a pure function of `(artifact id, version)` pairs
//! 4. [`reconcile`] applies the changeset: removals first, then bounded-
//!    parallel downloads via an [`source::ArtifactSource`], collecting
//!    per-artifact failures without aborting siblings
//!
//! The new state is saved with an atomic write (temp file + rename), so a
//! crash mid-run never leaves a truncated record. A crash between filesystem
//! mutation and the save leaves the cache directory ahead of the state, which
//! the next run resolves by redundantly re-deleting and re-fetching - wasted
//! work, never a wrong cache.
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface (`init`, `sync`, `plan`, `status`,
//!   `validate`)
//! - [`core`] - Error types and user-facing error reporting
//! - [`diff`] - Changeset computation (the algorithmic heart)
//! - [`manifest`] - Manifest parsing and validation
//! - [`reconcile`] - Changeset execution against the cache directory
//! - [`source`] - Artifact download abstraction (HTTP and local-directory)
//! - [`state`] - Durable cache state with atomic persistence
//! - [`utils`] - Filesystem helpers shared across modules
//!
//! # Manifest Format (modsync.toml)
//!
//! ```toml
//! [[mods]]
//! id = 247560
//! version = 3361988
//! name = "Example Mod"
//!
//! [[mods]]
//! id = "238222"
//! version = "4593548"
//! required = false
//! ```
//!
//! Identifiers are numeric and may be written as TOML integers or numeric
//! strings; `required` defaults to `true` and is carried through to reporting
//! without influencing the diff.

pub mod cli;
pub mod core;
pub mod diff;
pub mod manifest;
pub mod reconcile;
pub mod source;
pub mod state;
pub mod utils;
