//! Vault key derivation.
//!
//! The SQLCipher key is derived from the master password with PBKDF2, salted
//! with the first bytes of the database file header. Only the first 32 bytes
//! of the PBKDF2 output are used.

use std::io::Read;
use std::path::Path;

use zeroize::{Zeroizing, ZeroizeOnDrop};

use crate::crypto::{self, KdfDigest};
use crate::error::{Result, VaultError};

/// Length of the raw store key in bytes.
pub const VAULT_KEY_LEN: usize = 32;

/// Length of the salt stored at the start of the database file.
pub const SALT_LEN: usize = 16;

/// Raw binary key that opens the encrypted store.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct VaultKey {
    bytes: Vec<u8>,
}

impl VaultKey {
    /// Wrap raw key bytes, e.g. ones recovered from the credential cache.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Authentication` if the length is wrong, since a
    /// short key can only come from a bad cache or a wrong secret.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != VAULT_KEY_LEN {
            return Err(VaultError::Authentication(format!(
                "vault key must be {} bytes (got {})",
                VAULT_KEY_LEN,
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex encoding, as used in `PRAGMA key = "x'…'"`.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.bytes))
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Read the key salt from the database file header.
pub fn extract_salt(database_path: &Path) -> Result<[u8; SALT_LEN]> {
    let mut file = std::fs::File::open(database_path).map_err(|e| {
        VaultError::io(format!("could not open {}", database_path.display()), e)
    })?;
    let mut salt = [0u8; SALT_LEN];
    file.read_exact(&mut salt).map_err(|e| {
        VaultError::io(
            format!("could not read salt from {}", database_path.display()),
            e,
        )
    })?;
    Ok(salt)
}

/// Derive the store key from the combined master password.
///
/// # Errors
///
/// Returns `VaultError::Configuration` for an empty master password and
/// `VaultError::Crypto` if the derivation itself fails.
pub fn derive_vault_key(
    master_password: &[u8],
    salt: &[u8],
    iterations: u32,
    digest: KdfDigest,
) -> Result<VaultKey> {
    if master_password.is_empty() {
        return Err(VaultError::Configuration(
            "empty vault password provided".to_string(),
        ));
    }
    if salt.len() != SALT_LEN {
        return Err(VaultError::Crypto(format!(
            "vault salt must be {} bytes (got {})",
            SALT_LEN,
            salt.len()
        )));
    }

    let derived = crypto::pbkdf2(
        digest,
        master_password,
        salt,
        iterations,
        digest.output_len(),
    )?;
    VaultKey::from_bytes(&derived[..VAULT_KEY_LEN])
}
