//! Vault access.
//!
//! A vault directory holds `vault.enpassdb` (the encrypted store) and
//! `vault.json` (its descriptor). [`Vault`] validates both, obtains the raw
//! store key from the supplied credentials, opens the store and serves entry
//! queries.

pub mod credentials;
pub mod info;
pub mod key;
pub mod keyfile;

use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::error::{Result, VaultError};
use crate::filter::{self, EntryQuery};
use crate::storage::{Entry, EntryStore, SqlCipherStore};

pub use credentials::VaultCredentials;
pub use info::VaultInfo;
pub use key::{derive_vault_key, extract_salt, VaultKey};
pub use keyfile::{EnpassKeyfileCombiner, MasterPasswordCombiner};

/// Name of the encrypted store inside a vault directory.
pub const VAULT_FILE_NAME: &str = "vault.enpassdb";

/// Name of the descriptor inside a vault directory.
pub const VAULT_INFO_FILE_NAME: &str = "vault.json";

/// An Enpass vault directory.
pub struct Vault<S = SqlCipherStore, C = EnpassKeyfileCombiner>
where
    S: EntryStore,
    C: MasterPasswordCombiner,
{
    database_path: PathBuf,
    info: VaultInfo,
    combiner: C,
    store: Option<S>,
}

impl Vault {
    /// Validate `path` and load its descriptor.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Configuration` if the path is empty or either
    /// vault file is missing.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_combiner(path, EnpassKeyfileCombiner)
    }
}

impl<S, C> Vault<S, C>
where
    S: EntryStore,
    C: MasterPasswordCombiner,
{
    /// Like [`Vault::new`], with a custom password/keyfile combination step.
    pub fn with_combiner(path: impl AsRef<Path>, combiner: C) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(VaultError::Configuration(
                "empty vault path provided".to_string(),
            ));
        }

        let database_path = path.join(VAULT_FILE_NAME);
        if !database_path.is_file() {
            return Err(VaultError::Configuration(format!(
                "vault database not found: {}",
                database_path.display()
            )));
        }
        let info_path = path.join(VAULT_INFO_FILE_NAME);
        if !info_path.is_file() {
            return Err(VaultError::Configuration(format!(
                "vault info file not found: {}",
                info_path.display()
            )));
        }
        debug!(path = %path.display(), "vault paths validated");

        let info = VaultInfo::load(&info_path)?;
        debug!(
            vault_name = %info.vault_name,
            have_keyfile = info.have_keyfile,
            kdf_iter = info.kdf_iter,
            "loaded vault info"
        );

        Ok(Self {
            database_path,
            info,
            combiner,
            store: None,
        })
    }

    pub fn info(&self) -> &VaultInfo {
        &self.info
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Derive the store key from a password and optional keyfile.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Configuration` when keyfile presence disagrees
    /// with the descriptor; nothing is read from the store in that case.
    pub fn derive_key(&self, credentials: &VaultCredentials) -> Result<VaultKey> {
        let have_keyfile = credentials.keyfile_path.is_some();
        if self.info.requires_keyfile() && !have_keyfile {
            return Err(VaultError::Configuration(
                "vault requires a keyfile but none was given".to_string(),
            ));
        }
        if !self.info.requires_keyfile() && have_keyfile {
            return Err(VaultError::Configuration(
                "a keyfile was given but the vault does not use one".to_string(),
            ));
        }

        let password = credentials
            .password
            .as_ref()
            .map(|password| password.expose_secret().as_bytes())
            .unwrap_or_default();

        let keyfile = match credentials.keyfile_path.as_deref() {
            Some(keyfile_path) => {
                debug!(keyfile = %keyfile_path.display(), "reading keyfile");
                Some(keyfile::read_keyfile(keyfile_path)?)
            }
            None => None,
        };
        let master_password = self
            .combiner
            .combine(password, keyfile.as_ref().map(|bytes| bytes.as_slice()))?;

        let salt = extract_salt(&self.database_path)?;
        debug!("extracted key salt from database header");

        let digest = self.info.kdf_digest()?;
        let key = derive_vault_key(&master_password, &salt, self.info.kdf_iter, digest)?;
        debug!(iterations = self.info.kdf_iter, ?digest, "derived vault key");
        Ok(key)
    }

    /// Open the encrypted store.
    ///
    /// A `db_key` in the credentials is used as is. Otherwise the key is
    /// derived, and once the store accepts it, written back to
    /// `credentials.db_key` so it can be cached.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Configuration` for incomplete credentials and
    /// `VaultError::Authentication` when the key does not open the store.
    pub fn open(&mut self, credentials: &mut VaultCredentials) -> Result<()> {
        if !credentials.is_complete() {
            return Err(VaultError::Configuration(
                "vault credentials are incomplete: a password or key is required".to_string(),
            ));
        }

        let (key, derived) = match credentials.db_key.as_ref() {
            Some(key) => {
                debug!("using supplied vault key, skipping derivation");
                (key.clone(), false)
            }
            None => (self.derive_key(credentials)?, true),
        };

        let store = S::open(&self.database_path, &key)?;
        store.probe()?;
        debug!("vault database opened and verified");

        if derived {
            credentials.db_key = Some(key);
        }
        self.store = Some(store);
        Ok(())
    }

    /// Release the store handle. Closing twice is fine.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            debug!("vault closed");
        }
    }

    fn store(&self) -> Result<&S> {
        self.store
            .as_ref()
            .ok_or_else(|| VaultError::Configuration("vault is not open".to_string()))
    }

    /// Entries matching `query`, in store order, deleted entries excluded.
    /// Rows that cannot be read are skipped with a warning.
    ///
    /// Trashed entries are returned; use [`filter::retain_visible`] to drop
    /// them.
    pub fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>> {
        let rows = self.store()?.entry_rows()?;
        debug!(rows = rows.len(), "fetched entry rows");

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = match Entry::try_from(row) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry row");
                    continue;
                }
            };
            if entry.is_deleted() || !query.matches(&entry) {
                continue;
            }
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The single visible entry matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` when nothing matches and
    /// `VaultError::AmbiguousMatch` when more than one entry does.
    pub fn get_unique_entry(&self, query: &EntryQuery) -> Result<Entry> {
        let mut entries = self.get_entries(query)?;
        filter::retain_visible(&mut entries, false);

        match entries.len() {
            0 => Err(VaultError::NotFound(format!(
                "no entry matches {}",
                describe_filters(query)
            ))),
            1 => Ok(entries.remove(0)),
            count => Err(VaultError::AmbiguousMatch { count }),
        }
    }
}

fn describe_filters(query: &EntryQuery) -> String {
    if query.filters.is_empty() {
        "the given type".to_string()
    } else {
        format!("filter {:?}", query.filters)
    }
}

impl<S, C> std::fmt::Debug for Vault<S, C>
where
    S: EntryStore,
    C: MasterPasswordCombiner,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("database_path", &self.database_path)
            .field("info", &self.info)
            .field("open", &self.is_open())
            .finish()
    }
}
