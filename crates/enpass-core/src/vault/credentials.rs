//! Secrets supplied to unlock a vault.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use super::key::VaultKey;

/// Credentials for one unlock.
///
/// Complete when either a password or an already-derived key is present.
#[derive(Debug, Default)]
pub struct VaultCredentials {
    pub password: Option<SecretString>,
    pub keyfile_path: Option<PathBuf>,
    pub db_key: Option<VaultKey>,
}

impl VaultCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn with_keyfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.keyfile_path = Some(path.into());
        self
    }

    pub fn with_db_key(mut self, key: VaultKey) -> Self {
        self.db_key = Some(key);
        self
    }

    pub fn has_password(&self) -> bool {
        self.password
            .as_ref()
            .is_some_and(|password| !password.expose_secret().is_empty())
    }

    pub fn is_complete(&self) -> bool {
        self.has_password() || self.db_key.is_some()
    }
}
