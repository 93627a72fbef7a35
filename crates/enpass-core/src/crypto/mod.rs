//! Cryptographic primitives shared by vault unlock, entry decryption and
//! the credential cache.
//!
//! Everything here is a thin wrapper around `ring`:
//! - **PBKDF2** (iterated HMAC-SHA-256 / HMAC-SHA-512) for key derivation
//! - **AES-256-GCM** for authenticated encryption
//! - **SHA-256** for one-way hashing of short secrets
//!
//! Derived key material is returned in `Zeroizing` containers so it is wiped
//! from memory on drop.

pub mod aead;
pub mod kdf;

pub use aead::{open, random_bytes, seal, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use kdf::{pbkdf2, sha256, KdfDigest};
