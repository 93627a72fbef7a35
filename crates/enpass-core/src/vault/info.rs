//! The unencrypted `vault.json` descriptor.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::KdfDigest;
use crate::error::{Result, VaultError};

/// PBKDF2 rounds used when the descriptor does not say otherwise.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

fn default_kdf_iter() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

/// Read-only vault metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInfo {
    /// Human-readable vault identifier
    #[serde(default)]
    pub vault_name: String,

    /// 1 if the vault was created with a keyfile
    #[serde(default)]
    pub have_keyfile: u8,

    /// PBKDF2 iteration count for the master key
    #[serde(default = "default_kdf_iter")]
    pub kdf_iter: u32,

    /// PBKDF2 variant, absent on older descriptors
    #[serde(default)]
    pub kdf_algo: Option<String>,

    #[serde(default)]
    pub vault_items_count: u64,

    #[serde(default)]
    pub version: u32,
}

impl VaultInfo {
    /// Parse the descriptor at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read(path)
            .map_err(|e| VaultError::io(format!("could not read {}", path.display()), e))?;
        Self::from_slice(&contents)
    }

    pub fn from_slice(contents: &[u8]) -> Result<Self> {
        let info: VaultInfo = serde_json::from_slice(contents)?;
        if info.kdf_iter == 0 {
            return Err(VaultError::Configuration(
                "vault info declares zero KDF iterations".to_string(),
            ));
        }
        // Reject unknown algorithms at load time, not at unlock time.
        info.kdf_digest()?;
        Ok(info)
    }

    pub fn requires_keyfile(&self) -> bool {
        self.have_keyfile != 0
    }

    /// HMAC digest for the master key derivation.
    ///
    /// `pbkdf2` without a suffix is what current Enpass releases write and
    /// means SHA-512. A missing value means SHA-256.
    pub fn kdf_digest(&self) -> Result<KdfDigest> {
        match self.kdf_algo.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("pbkdf2-sha256") | Some("pbkdf2_sha256") => Ok(KdfDigest::Sha256),
            Some("pbkdf2") | Some("pbkdf2-sha512") | Some("pbkdf2_sha512") => Ok(KdfDigest::Sha512),
            Some(other) => Err(VaultError::Configuration(format!(
                "unsupported vault KDF algorithm: {}",
                other
            ))),
        }
    }
}
