//! SQLCipher-backed entry store.
//!
//! The vault database is a SQLCipher 3 file. It is opened read-only with the
//! raw 32-byte key (`PRAGMA key = "x'…'"`), so SQLCipher skips its own
//! passphrase KDF.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;
use zeroize::Zeroizing;

use super::row::EntryRow;
use super::traits::EntryStore;
use crate::error::{Result, VaultError};
use crate::vault::VaultKey;

/// Query joining every item with its fields.
const ENTRY_QUERY: &str = r#"
    SELECT uuid, type, created_at, field_updated_at, title,
           subtitle, note, trashed, item.deleted, category,
           label, value, key, last_used
    FROM item
    INNER JOIN itemfield ON uuid = item_uuid
    ORDER BY item.rowid, itemfield.rowid
"#;

/// Fixed probe used to validate the key.
const PROBE_QUERY: &str = "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'item'";

/// SQLCipher compatibility level of the vault format.
const CIPHER_COMPATIBILITY: u32 = 3;

/// Read-only SQLCipher connection to `vault.enpassdb`.
pub struct SqlCipherStore {
    conn: Connection,
}

impl SqlCipherStore {
    fn sqlite_error(err: rusqlite::Error) -> VaultError {
        VaultError::Sqlite { source: err }
    }

    /// Run a statement that may or may not return rows, discarding any rows.
    ///
    /// SQLCipher answers `PRAGMA key` with an `ok` row on some versions and
    /// with nothing on others.
    fn run_pragma(conn: &Connection, sql: &str) -> Result<()> {
        let mut stmt = conn.prepare(sql).map_err(Self::sqlite_error)?;
        let mut rows = stmt.query([]).map_err(Self::sqlite_error)?;
        while rows.next().map_err(Self::sqlite_error)?.is_some() {}
        Ok(())
    }

    /// The `PRAGMA key` statement for a raw key.
    pub(crate) fn key_pragma(key_hex: &str) -> Zeroizing<String> {
        Zeroizing::new(format!("PRAGMA key = \"x'{}'\"", key_hex))
    }

    /// The compatibility pragma that must follow the key.
    pub(crate) fn compatibility_pragma() -> String {
        format!("PRAGMA cipher_compatibility = {}", CIPHER_COMPATIBILITY)
    }
}

impl EntryStore for SqlCipherStore {
    fn open(path: &Path, key: &VaultKey) -> Result<Self> {
        debug!(path = %path.display(), "opening encrypted database");
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(Self::sqlite_error)?;

        let key_hex = key.to_hex();
        Self::run_pragma(&conn, &Self::key_pragma(&key_hex))?;
        Self::run_pragma(&conn, &Self::compatibility_pragma())?;

        Ok(Self { conn })
    }

    fn probe(&self) -> Result<()> {
        let table: String = self
            .conn
            .query_row(PROBE_QUERY, [], |row| row.get(0))
            .map_err(|e| {
                debug!(error = %e, "schema probe failed");
                VaultError::Authentication(
                    "could not read vault database, wrong password or keyfile?".to_string(),
                )
            })?;

        if table != "item" {
            return Err(VaultError::Authentication(
                "vault database does not contain the item table".to_string(),
            ));
        }
        Ok(())
    }

    fn entry_rows(&self) -> Result<Vec<EntryRow>> {
        let mut stmt = self.conn.prepare(ENTRY_QUERY).map_err(Self::sqlite_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(EntryRow {
                    uuid: row.get(0)?,
                    field_type: row.get(1)?,
                    created_at: row.get(2)?,
                    field_updated_at: row.get(3)?,
                    title: row.get(4)?,
                    subtitle: row.get(5)?,
                    note: row.get(6)?,
                    trashed: row.get(7)?,
                    deleted: row.get(8)?,
                    category: row.get(9)?,
                    label: row.get(10)?,
                    value: row.get(11)?,
                    key: row.get(12)?,
                    last_used: row.get(13)?,
                })
            })
            .map_err(Self::sqlite_error)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VaultError::Storage(format!("could not read entry from database: {}", e)))
    }
}
