//! Password + keyfile combination.
//!
//! The vault format defines how a keyfile is mixed into the master password.
//! That step lives behind [`MasterPasswordCombiner`] so it can be checked
//! against reference vectors on its own.

use std::path::Path;

use zeroize::Zeroizing;

use crate::error::{Result, VaultError};

const KEY_OPEN_TAG: &str = "<Key>";
const KEY_CLOSE_TAG: &str = "</Key>";

/// Turns the user's password and keyfile contents into the master password.
pub trait MasterPasswordCombiner {
    fn combine(&self, password: &[u8], keyfile: Option<&[u8]>) -> Result<Zeroizing<Vec<u8>>>;
}

/// Enpass keyfiles: `<Keyfile><Key>HEX</Key></Keyfile>`.
///
/// The master password is the password bytes followed by the hex-decoded key.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnpassKeyfileCombiner;

impl MasterPasswordCombiner for EnpassKeyfileCombiner {
    fn combine(&self, password: &[u8], keyfile: Option<&[u8]>) -> Result<Zeroizing<Vec<u8>>> {
        let mut master = Zeroizing::new(password.to_vec());
        if let Some(contents) = keyfile {
            let key = parse_keyfile_key(contents)?;
            master.extend_from_slice(&key);
        }
        Ok(master)
    }
}

/// Read the raw keyfile bytes.
pub fn read_keyfile(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = std::fs::read(path).map_err(|e| {
        VaultError::Configuration(format!("could not read keyfile {}: {}", path.display(), e))
    })?;
    Ok(Zeroizing::new(bytes))
}

/// Extract and hex-decode the `<Key>` element of a keyfile.
pub fn parse_keyfile_key(contents: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let text = std::str::from_utf8(contents)
        .map_err(|_| VaultError::Configuration("keyfile is not valid UTF-8".to_string()))?;

    let start = text
        .find(KEY_OPEN_TAG)
        .map(|index| index + KEY_OPEN_TAG.len())
        .ok_or_else(|| VaultError::Configuration("keyfile has no <Key> element".to_string()))?;
    let end = text[start..]
        .find(KEY_CLOSE_TAG)
        .map(|index| start + index)
        .ok_or_else(|| VaultError::Configuration("keyfile <Key> element is not closed".to_string()))?;

    let key_hex = text[start..end].trim();
    if key_hex.is_empty() {
        return Err(VaultError::Configuration("keyfile key is empty".to_string()));
    }
    let key = hex::decode(key_hex)
        .map_err(|e| VaultError::Configuration(format!("keyfile key is not hex: {}", e)))?;
    Ok(Zeroizing::new(key))
}
