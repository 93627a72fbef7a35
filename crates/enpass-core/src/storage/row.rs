//! Entry row type for store queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};
use crate::storage::types::Entry;

/// Raw row data from the item/itemfield join, before parsing into domain types.
#[derive(Default, Clone)]
pub struct EntryRow {
    pub uuid: String,
    pub field_type: Option<String>,
    pub created_at: Option<i64>,
    pub field_updated_at: Option<i64>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub note: Option<String>,
    pub trashed: Option<i64>,
    pub deleted: Option<i64>,
    pub category: Option<String>,
    pub label: Option<String>,
    pub value: Option<String>,
    pub key: Option<Vec<u8>>,
    pub last_used: Option<i64>,
}

fn timestamp(seconds: Option<i64>) -> Option<DateTime<Utc>> {
    seconds
        .filter(|value| *value > 0)
        .and_then(|value| DateTime::from_timestamp(value, 0))
}

impl TryFrom<EntryRow> for Entry {
    type Error = VaultError;

    fn try_from(row: EntryRow) -> Result<Self> {
        let uuid = Uuid::parse_str(&row.uuid)
            .map_err(|e| VaultError::Storage(format!("Invalid item UUID {:?}: {}", row.uuid, e)))?;

        Ok(Entry {
            uuid,
            entry_type: row.field_type.unwrap_or_default(),
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.field_updated_at),
            title: row.title.unwrap_or_default(),
            subtitle: row.subtitle.unwrap_or_default(),
            note: row.note.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            label: row.label.unwrap_or_default(),
            trashed: row.trashed.unwrap_or(0) != 0,
            deleted: row.deleted.unwrap_or(0) != 0,
            last_used: timestamp(row.last_used),
            value: row.value.unwrap_or_default(),
            item_key: Zeroizing::new(row.key.unwrap_or_default()),
        })
    }
}
