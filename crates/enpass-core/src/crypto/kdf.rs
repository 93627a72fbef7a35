//! Iterated-HMAC key derivation (PBKDF2) and SHA-256 hashing.

use std::num::NonZeroU32;

use ring::{digest, pbkdf2 as ring_pbkdf2};
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};

/// HMAC digest used by PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KdfDigest {
    #[default]
    Sha256,
    Sha512,
}

impl KdfDigest {
    fn algorithm(self) -> ring_pbkdf2::Algorithm {
        match self {
            KdfDigest::Sha256 => ring_pbkdf2::PBKDF2_HMAC_SHA256,
            KdfDigest::Sha512 => ring_pbkdf2::PBKDF2_HMAC_SHA512,
        }
    }

    /// Output size of the underlying hash in bytes.
    pub fn output_len(self) -> usize {
        match self {
            KdfDigest::Sha256 => digest::SHA256_OUTPUT_LEN,
            KdfDigest::Sha512 => digest::SHA512_OUTPUT_LEN,
        }
    }
}

/// Derive `out_len` bytes from `secret` and `salt` with PBKDF2.
///
/// # Errors
///
/// Returns `VaultError::Crypto` if `iterations` is zero or `out_len` is zero.
pub fn pbkdf2(
    digest: KdfDigest,
    secret: &[u8],
    salt: &[u8],
    iterations: u32,
    out_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| VaultError::Crypto("PBKDF2 iteration count must be non-zero".into()))?;
    if out_len == 0 {
        return Err(VaultError::Crypto(
            "PBKDF2 output length must be non-zero".into(),
        ));
    }

    let mut out = Zeroizing::new(vec![0u8; out_len]);
    ring_pbkdf2::derive(digest.algorithm(), iterations, salt, secret, &mut out);
    Ok(out)
}

/// One-way SHA-256 hash of `data`.
pub fn sha256(data: &[u8]) -> Zeroizing<[u8; 32]> {
    let hashed = digest::digest(&digest::SHA256, data);
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(hashed.as_ref());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_sha256_rfc7914_vector() {
        // RFC 7914 section 11, PBKDF2-HMAC-SHA256 with c = 1.
        let out = pbkdf2(KdfDigest::Sha256, b"passwd", b"salt", 1, 64).unwrap();
        assert_eq!(
            hex::encode(&out[..16]),
            "55ac046e56e3089fec1691c22544b605"
        );
    }

    #[test]
    fn test_pbkdf2_is_deterministic() {
        let a = pbkdf2(KdfDigest::Sha512, b"secret", b"0123456789abcdef", 10, 32).unwrap();
        let b = pbkdf2(KdfDigest::Sha512, b"secret", b"0123456789abcdef", 10, 32).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_digest_changes_output() {
        let a = pbkdf2(KdfDigest::Sha256, b"secret", b"0123456789abcdef", 10, 32).unwrap();
        let b = pbkdf2(KdfDigest::Sha512, b"secret", b"0123456789abcdef", 10, 32).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let result = pbkdf2(KdfDigest::Sha256, b"secret", b"salt", 0, 32);
        assert!(matches!(result, Err(VaultError::Crypto(_))));
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            hex::encode(*sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_output_len() {
        assert_eq!(KdfDigest::Sha256.output_len(), 32);
        assert_eq!(KdfDigest::Sha512.output_len(), 64);
    }
}
