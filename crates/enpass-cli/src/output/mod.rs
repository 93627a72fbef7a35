//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying entries
//! in various formats (JSON, plain table).

mod json;
mod text;

use enpass_core::Entry;
use zeroize::Zeroizing;

// Re-export public API
pub use json::entries_json;
pub use text::entry_table;

/// An entry as printed, with its secret when the command reveals it.
pub struct DisplayEntry<'a> {
    pub entry: &'a Entry,
    pub secret: Option<Zeroizing<String>>,
}

impl<'a> DisplayEntry<'a> {
    pub fn new(entry: &'a Entry) -> Self {
        Self {
            entry,
            secret: None,
        }
    }

    pub fn with_secret(entry: &'a Entry, secret: Zeroizing<String>) -> Self {
        Self {
            entry,
            secret: Some(secret),
        }
    }
}
