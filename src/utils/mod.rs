//! Shared filesystem helpers.
//!
//! Everything that touches disk outside a single module lives here, most
//! importantly [`fs::atomic_write`], which both the state store and the
//! reconciliation executor rely on for crash safety.

pub mod fs;

pub use fs::{atomic_write, ensure_dir};
