//! Core entry type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN, NONCE_LEN};
use crate::error::{Result, VaultError};

/// One item/field pair from the vault.
///
/// The secret `value` stays encrypted until [`Entry::decrypt`] is called.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub note: String,
    pub category: String,
    pub label: String,
    pub trashed: bool,
    pub deleted: bool,
    pub last_used: Option<DateTime<Utc>>,

    /// Hex-encoded AES-256-GCM ciphertext with tag
    #[serde(skip)]
    pub(crate) value: String,

    /// 32-byte item key followed by the 12-byte nonce
    #[serde(skip)]
    pub(crate) item_key: Zeroizing<Vec<u8>>,
}

impl Entry {
    pub fn is_trashed(&self) -> bool {
        self.trashed
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Decrypt the secret value of this entry.
    ///
    /// The item key carries both the AES key and the nonce; the item UUID
    /// bytes are the associated data. An entry without a value decrypts to an
    /// empty string.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Decryption` if the item key is malformed, the value
    /// is not hex, the tag does not verify, or the plaintext is not UTF-8.
    pub fn decrypt(&self) -> Result<Zeroizing<String>> {
        if self.value.is_empty() {
            return Ok(Zeroizing::new(String::new()));
        }
        if self.item_key.len() != KEY_LEN + NONCE_LEN {
            return Err(VaultError::Decryption(format!(
                "item key for {} has {} bytes, expected {}",
                self.title,
                self.item_key.len(),
                KEY_LEN + NONCE_LEN
            )));
        }

        let (key, nonce) = self.item_key.split_at(KEY_LEN);
        let ciphertext = hex::decode(&self.value).map_err(|e| {
            VaultError::Decryption(format!("value of {} is not hex: {}", self.title, e))
        })?;
        let plaintext = crypto::open(key, nonce, self.uuid.as_bytes(), &ciphertext)
            .map_err(|e| VaultError::Decryption(format!("could not decrypt {}: {}", self.title, e)))?;

        let text = std::str::from_utf8(&plaintext).map_err(|_| {
            VaultError::Decryption(format!("value of {} is not valid UTF-8", self.title))
        })?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("uuid", &self.uuid)
            .field("type", &self.entry_type)
            .field("title", &self.title)
            .field("subtitle", &self.subtitle)
            .field("category", &self.category)
            .field("label", &self.label)
            .field("trashed", &self.trashed)
            .field("deleted", &self.deleted)
            .field("value", &"[REDACTED]")
            .finish()
    }
}
