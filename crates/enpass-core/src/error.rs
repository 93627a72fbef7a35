//! Error types for vault operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to exit codes and user-facing hints.

use thiserror::Error;

/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Bad paths, keyfile mismatch, PIN too short, or misuse of the API.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Wrong password or PIN, failed store probe, or failed tag check.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No entry matched a unique lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// More than one entry matched a unique lookup
    #[error("Ambiguous match: {count} entries match that filter")]
    AmbiguousMatch { count: usize },

    /// Cache directory or cache file I/O that may succeed elsewhere
    #[error("{context}: {source}")]
    TransientIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A single entry could not be decrypted
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Row data from the encrypted store could not be interpreted
    #[error("Storage error: {0}")]
    Storage(String),

    /// Failure inside a cryptographic primitive
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// I/O on the primary vault files
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// SQLite / SQLCipher error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Vault descriptor could not be parsed
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl VaultError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        VaultError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn transient(context: impl Into<String>, source: std::io::Error) -> Self {
        VaultError::TransientIo {
            context: context.into(),
            source,
        }
    }

    /// True for errors that should make the caller re-prompt for a secret.
    pub fn is_authentication(&self) -> bool {
        matches!(self, VaultError::Authentication(_))
    }
}
