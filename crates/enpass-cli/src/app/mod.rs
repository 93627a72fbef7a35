//! Application-level utilities for the enpasscli binary.
//!
//! This module provides:
//! - Path resolution for config, vault and keyfile
//! - The application context combining CLI args with config defaults
//! - Vault unlocking with the PIN cache and password retries

mod context;
mod resolver;
mod unlock;

// Re-export public API
pub use context::AppContext;
