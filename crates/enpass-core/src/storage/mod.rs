//! Encrypted row-store access.
//!
//! The vault's entries live in a SQLCipher database that is opened with a raw
//! binary key. This module hides that engine behind the `EntryStore` trait so
//! the unlock and filtering logic never talks to SQLCipher directly.

pub mod row;
pub mod sqlcipher;
pub mod traits;
pub mod types;

// Re-export public types
pub use row::EntryRow;
pub use sqlcipher::SqlCipherStore;
pub use traits::EntryStore;
pub use types::Entry;
