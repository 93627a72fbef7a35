//! PIN-protected credential cache.
//!
//! After a successful unlock the derived vault key is stored in a small file
//! in a temp or RAM-backed directory, encrypted under a key derived from a
//! short PIN. Later invocations read it back and skip the expensive master
//! password derivation.
//!
//! Record layout: `IV (12) || AES-256-GCM ciphertext+tag || salt (16)`.
//! The AEAD key is PBKDF2-HMAC-SHA-256 over `SHA-256(PIN || pepper)`.

use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{self, KdfDigest, KEY_LEN, NONCE_LEN, TAG_LEN};
use crate::error::{Result, VaultError};
use crate::fs;
use crate::vault::VaultKey;

/// Prefix of every cache file name.
pub const STORE_FILE_PREFIX: &str = "enpasscli-";

/// Shortest PIN accepted.
pub const MIN_PIN_LENGTH: usize = 8;

/// PBKDF2 rounds when nothing else is configured.
pub const DEFAULT_KDF_ITER_COUNT: u32 = 100_000;

/// Iteration counts below this are raised to it.
pub const MIN_KDF_ITER_COUNT: u32 = 10_000;

const SALT_LEN: usize = 16;

/// Where and how hard the cache works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// PBKDF2 rounds for the AEAD key
    pub kdf_iter_count: u32,

    /// Directories tried in order; the first that accepts the file wins
    pub candidate_dirs: Vec<PathBuf>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            kdf_iter_count: DEFAULT_KDF_ITER_COUNT,
            candidate_dirs: vec![std::env::temp_dir()],
        }
    }
}

impl StoreOptions {
    /// Candidates from `TMPDIR`, `XDG_RUNTIME_DIR`, `/dev/shm` and the OS
    /// temp dir, in that order. Unset or empty variables are skipped.
    pub fn from_env() -> Self {
        let mut candidate_dirs = Vec::new();
        for var in ["TMPDIR", "XDG_RUNTIME_DIR"] {
            if let Some(value) = std::env::var_os(var) {
                if !value.is_empty() {
                    candidate_dirs.push(PathBuf::from(value));
                }
            }
        }
        candidate_dirs.push(PathBuf::from("/dev/shm"));
        candidate_dirs.push(std::env::temp_dir());

        Self {
            kdf_iter_count: DEFAULT_KDF_ITER_COUNT,
            candidate_dirs,
        }
    }

    pub fn kdf_iter_count(mut self, kdf_iter_count: u32) -> Self {
        self.kdf_iter_count = kdf_iter_count;
        self
    }

    pub fn candidate_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.candidate_dirs = dirs.into_iter().collect();
        self
    }

    fn effective_iter_count(&self) -> u32 {
        self.kdf_iter_count.max(MIN_KDF_ITER_COUNT)
    }
}

/// Cache id for a vault: 16 hex chars of the BLAKE3 hash of its canonical
/// path.
pub fn store_id(vault_path: &Path) -> String {
    let canonical = vault_path
        .canonicalize()
        .unwrap_or_else(|_| vault_path.to_path_buf());
    let hash = blake3::hash(canonical.to_string_lossy().as_bytes());
    hash.to_hex()[..16].to_string()
}

/// Remove the cache file for `vault_id` from every candidate directory.
///
/// No PIN is needed. Returns the paths that were removed.
pub fn remove_store_files(vault_id: &str, options: &StoreOptions) -> Result<Vec<PathBuf>> {
    let file_name = format!("{}{}", STORE_FILE_PREFIX, vault_id);
    let mut removed = Vec::new();
    for dir in options.candidate_dirs.iter().filter(|dir| !dir.as_os_str().is_empty()) {
        let path = dir.join(&file_name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "credential cache removed");
                removed.push(path);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(VaultError::transient(
                    format!("could not remove {}", path.display()),
                    err,
                ))
            }
        }
    }
    Ok(removed)
}

/// Encrypted on-disk cache of one vault key.
pub struct SecureStore {
    path: PathBuf,
    wrapping_key: Zeroizing<[u8; 32]>,
    kdf_iter_count: u32,
    read_succeeded: bool,
}

impl SecureStore {
    /// Validate the PIN and pick the cache file.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Configuration` for a PIN shorter than
    /// [`MIN_PIN_LENGTH`] (checked before touching the filesystem) and
    /// `VaultError::TransientIo` if no candidate directory accepts the file.
    pub fn new(pin: &str, pepper: Option<&str>, vault_id: &str, options: StoreOptions) -> Result<Self> {
        if pin.chars().count() < MIN_PIN_LENGTH {
            return Err(VaultError::Configuration(format!(
                "PIN must be at least {} characters",
                MIN_PIN_LENGTH
            )));
        }
        if vault_id.is_empty() {
            return Err(VaultError::Configuration(
                "empty credential cache id".to_string(),
            ));
        }

        let mut secret = Zeroizing::new(Vec::with_capacity(pin.len() + 32));
        secret.extend_from_slice(pin.as_bytes());
        if let Some(pepper) = pepper {
            secret.extend_from_slice(pepper.as_bytes());
        }
        let wrapping_key = crypto::sha256(&secret);

        let file_name = format!("{}{}", STORE_FILE_PREFIX, vault_id);
        let path = Self::resolve_path(&options.candidate_dirs, &file_name)?;
        let kdf_iter_count = options.effective_iter_count();
        debug!(path = %path.display(), kdf_iter_count, "credential cache ready");

        Ok(Self {
            path,
            wrapping_key,
            kdf_iter_count,
            read_succeeded: false,
        })
    }

    fn resolve_path(candidate_dirs: &[PathBuf], file_name: &str) -> Result<PathBuf> {
        let mut last_error = None;
        for dir in candidate_dirs {
            if dir.as_os_str().is_empty() {
                continue;
            }
            debug!(dir = %dir.display(), "trying cache directory");
            let path = dir.join(file_name);
            match fs::create_private(&path) {
                Ok(_) => return Ok(path),
                Err(err) => {
                    debug!(dir = %dir.display(), error = %err, "skipping cache directory");
                    last_error = Some(err);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no cache directory candidates")
        });
        Err(VaultError::transient(
            "could not create credential cache file",
            source,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached vault key, or `None` if nothing has been cached yet.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Authentication` when the record does not decrypt
    /// under this PIN, which covers tampering and truncation too.
    pub fn read(&mut self) -> Result<Option<VaultKey>> {
        debug!("reading credential cache");
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(VaultError::transient(
                    format!("could not read {}", self.path.display()),
                    err,
                ))
            }
        };
        if data.is_empty() {
            return Ok(None);
        }

        let key = self.open_record(&data)?;
        self.read_succeeded = true;
        debug!("credential cache decrypted");
        Ok(Some(key))
    }

    /// Encrypt and store `key`. Does nothing if [`SecureStore::read`] already
    /// succeeded in this process.
    pub fn write(&mut self, key: &VaultKey) -> Result<()> {
        if self.read_succeeded {
            debug!("credential cache already valid, not rewriting");
            return Ok(());
        }

        let record = self.seal_record(key.as_bytes())?;
        fs::write_private(&self.path, &record).map_err(|e| {
            VaultError::transient(format!("could not write {}", self.path.display()), e)
        })?;
        debug!(path = %self.path.display(), "credential cache written");
        Ok(())
    }

    /// Delete the cache file. A missing file is fine.
    pub fn clear(&mut self) -> Result<()> {
        self.read_succeeded = false;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "credential cache removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(VaultError::transient(
                format!("could not remove {}", self.path.display()),
                err,
            )),
        }
    }

    fn aead_key(&self, salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        crypto::pbkdf2(
            KdfDigest::Sha256,
            self.wrapping_key.as_slice(),
            salt,
            self.kdf_iter_count,
            KEY_LEN,
        )
    }

    fn seal_record(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let salt = crypto::random_bytes::<SALT_LEN>()?;
        let iv = crypto::random_bytes::<NONCE_LEN>()?;
        let key = self.aead_key(&salt)?;
        let ciphertext = crypto::seal(&key, &iv, &[], plaintext)?;

        let mut record = Vec::with_capacity(NONCE_LEN + ciphertext.len() + SALT_LEN);
        record.extend_from_slice(&iv);
        record.extend_from_slice(&ciphertext);
        record.extend_from_slice(&salt);
        Ok(record)
    }

    fn open_record(&self, record: &[u8]) -> Result<VaultKey> {
        let corrupted = || VaultError::Authentication("wrong PIN or corrupted cache".to_string());

        if record.len() < NONCE_LEN + TAG_LEN + SALT_LEN {
            return Err(corrupted());
        }
        let (iv, rest) = record.split_at(NONCE_LEN);
        let (ciphertext, salt) = rest.split_at(rest.len() - SALT_LEN);

        let key = self.aead_key(salt)?;
        let plaintext = crypto::open(&key, iv, &[], ciphertext).map_err(|_| corrupted())?;
        VaultKey::from_bytes(&plaintext).map_err(|_| corrupted())
    }
}

impl std::fmt::Debug for SecureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStore")
            .field("path", &self.path)
            .field("wrapping_key", &"[REDACTED]")
            .field("kdf_iter_count", &self.kdf_iter_count)
            .field("read_succeeded", &self.read_succeeded)
            .finish()
    }
}
