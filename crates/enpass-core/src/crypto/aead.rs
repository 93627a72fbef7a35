//! AES-256-GCM seal/open.
//!
//! Nonces are supplied by the caller. Every sealed record in this crate uses a
//! fresh random nonce from [`random_bytes`]; reusing a nonce under the same key
//! breaks GCM.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;
/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

fn less_safe_key(key: &[u8]) -> Result<LessSafeKey> {
    let unbound = UnboundKey::new(&AES_256_GCM, key).map_err(|_| {
        VaultError::Crypto(format!(
            "AES-256-GCM key must be {} bytes (got {})",
            KEY_LEN,
            key.len()
        ))
    })?;
    Ok(LessSafeKey::new(unbound))
}

fn nonce_from(nonce: &[u8]) -> Result<Nonce> {
    Nonce::try_assume_unique_for_key(nonce).map_err(|_| {
        VaultError::Crypto(format!(
            "AES-256-GCM nonce must be {} bytes (got {})",
            NONCE_LEN,
            nonce.len()
        ))
    })
}

/// Encrypt `plaintext`, returning ciphertext with the 16-byte tag appended.
pub fn seal(key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let key = less_safe_key(key)?;
    let nonce = nonce_from(nonce)?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| VaultError::Crypto("AES-256-GCM encryption failed".into()))?;
    Ok(in_out)
}

/// Decrypt and authenticate `ciphertext` (tag appended).
///
/// # Errors
///
/// Returns `VaultError::Authentication` if the tag does not verify, which
/// means the key is wrong or the data was modified. Malformed key or nonce
/// lengths are `VaultError::Crypto`.
pub fn open(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let key = less_safe_key(key)?;
    let nonce = nonce_from(nonce)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = key
        .open_in_place(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| VaultError::Authentication("AES-256-GCM tag mismatch".into()))?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}

/// Fill an array from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| VaultError::Crypto("system random generator failed".into()))?;
    Ok(bytes)
}
