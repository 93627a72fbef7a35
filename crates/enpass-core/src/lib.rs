//! # Enpass Core
//!
//! Core library for enpass-cli: unlocks Enpass 6 vaults and reads their
//! entries.
//!
//! This crate provides the unlock protocol, the credential cache and entry
//! filtering, independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2, AES-256-GCM and hashing on top of `ring`
//! - **vault**: descriptor loading, key derivation and store access
//! - **storage**: the encrypted row-store seam and its SQLCipher backend
//! - **cache**: PIN-protected cache of the derived vault key
//! - **filter**: entry predicates and ordering

pub mod cache;
pub mod crypto;
pub mod error;
pub mod filter;
mod fs;
pub mod storage;
pub mod vault;

pub use cache::{remove_store_files, store_id, SecureStore, StoreOptions};
pub use error::{Result, VaultError};
pub use filter::{retain_visible, sort_entries, CombineMode, EntryQuery, FilterField};
pub use storage::{Entry, EntryStore};
pub use vault::{Vault, VaultCredentials, VaultInfo, VaultKey};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
