//! Storage engine trait definition.
//!
//! `EntryStore` is the call contract of the external encrypted row-store:
//! open with a raw key, validate the key with a fixed probe, and answer the
//! entry + field join.

use std::path::Path;

use super::row::EntryRow;
use crate::error::Result;
use crate::vault::VaultKey;

/// Encrypted row-store holding vault entries.
pub trait EntryStore: Sized {
    /// Open the store at `path` with the raw vault key.
    ///
    /// Opening does not prove the key is correct; call [`EntryStore::probe`].
    fn open(path: &Path, key: &VaultKey) -> Result<Self>;

    /// Check that the store decrypts with the supplied key.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Authentication` if the schema probe fails for any
    /// reason, so callers re-prompt instead of assuming corruption.
    fn probe(&self) -> Result<()>;

    /// Every item joined with its fields, in store insertion order.
    fn entry_rows(&self) -> Result<Vec<EntryRow>>;
}
