//! Vault unlocking: environment, PIN cache and prompts.
//!
//! Secrets are taken in this order: `MASTERPW`, then the PIN cache, then an
//! interactive prompt. A derived key is written to the PIN cache once the
//! vault opened.

use std::path::Path;

use secrecy::SecretString;
use tracing::{debug, warn};

use enpass_core::{store_id, SecureStore, Vault, VaultCredentials, VaultError};

use crate::constants::{env_vars, MAX_PASSWORD_ATTEMPTS};
use crate::errors::CliError;
use crate::helpers::{env_secret, prompt_secret};

use super::context::AppContext;
use super::resolver::missing_vault_hint;

/// Unlock the vault named by the context.
pub fn open_vault(ctx: &AppContext) -> anyhow::Result<Vault> {
    let vault_path = ctx.vault_path()?;
    let mut vault = Vault::new(&vault_path).map_err(|err| match err {
        VaultError::Configuration(message) => {
            CliError::not_found(message, missing_vault_hint(&vault_path))
        }
        other => CliError::from_vault_error(&other),
    })?;

    let mut store = if ctx.pin_enabled()? {
        debug!("PIN enabled, using credential cache");
        Some(initialize_store(ctx, &vault_path)?)
    } else {
        debug!("PIN disabled");
        None
    };

    let mut credentials = assemble_credentials(ctx, store.as_mut())?;
    open_with_retry(ctx, &mut vault, &mut credentials, store.as_mut())?;
    debug!("opened vault");

    if let (Some(store), Some(key)) = (store.as_mut(), credentials.db_key.as_ref()) {
        if let Err(err) = store.write(key) {
            warn!(error = %err, "could not write credential cache");
        }
    }

    Ok(vault)
}

/// Build the PIN cache for `vault_path`.
fn initialize_store(ctx: &AppContext, vault_path: &Path) -> anyhow::Result<SecureStore> {
    let pin = match env_secret(env_vars::PIN) {
        Some(pin) => pin,
        None => prompt_secret("PIN", env_vars::PIN, ctx.interactive())?,
    };
    let pepper = env_secret(env_vars::PIN_PEPPER);
    let options = ctx.store_options()?;

    let store = SecureStore::new(
        &pin,
        pepper.as_ref().map(|pepper| pepper.as_str()),
        &store_id(vault_path),
        options,
    )
    .map_err(|err| CliError::from_vault_error(&err))?;
    debug!("initialized credential cache");
    Ok(store)
}

/// Collect the password, keyfile and any cached key.
fn assemble_credentials(
    ctx: &AppContext,
    store: Option<&mut SecureStore>,
) -> anyhow::Result<VaultCredentials> {
    let mut credentials = VaultCredentials::new();
    if let Some(password) = env_secret(env_vars::MASTER_PASSWORD) {
        credentials = credentials.with_password(password.as_str());
    }
    if let Some(keyfile) = ctx.keyfile_path()? {
        credentials = credentials.with_keyfile(keyfile);
    }

    if !credentials.is_complete() {
        if let Some(store) = store {
            match store.read() {
                Ok(Some(key)) => {
                    debug!("read vault key from credential cache");
                    credentials.db_key = Some(key);
                }
                Ok(None) => debug!("credential cache is empty"),
                Err(err) if err.is_authentication() => {
                    return Err(CliError::auth_failed_with_hint(
                        format!("could not read credential cache: {}", err),
                        "Hint: Check ENP_PIN and ENP_PIN_PEPPER, or run `enpasscli lock` to reset the cache.",
                    )
                    .into());
                }
                Err(err) => warn!(error = %err, "could not read credential cache"),
            }
        }
    }

    Ok(credentials)
}

fn open_error(err: VaultError) -> anyhow::Error {
    CliError::from_vault_error(&err).into()
}

/// Open with a cached key if there is one, then with the password, prompting
/// up to [`MAX_PASSWORD_ATTEMPTS`] times on a terminal.
fn open_with_retry(
    ctx: &AppContext,
    vault: &mut Vault,
    credentials: &mut VaultCredentials,
    store: Option<&mut SecureStore>,
) -> anyhow::Result<()> {
    if credentials.db_key.is_some() {
        match vault.open(credentials) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_authentication() => {
                warn!("cached vault key was rejected, clearing credential cache");
                credentials.db_key = None;
                if let Some(store) = store {
                    if let Err(err) = store.clear() {
                        warn!(error = %err, "could not clear credential cache");
                    }
                }
            }
            Err(err) => return Err(open_error(err)),
        }
    }

    if credentials.has_password() {
        return vault.open(credentials).map_err(open_error);
    }

    let interactive = ctx.interactive();
    let max_attempts: u32 = if interactive { MAX_PASSWORD_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let password = prompt_secret("vault password", env_vars::MASTER_PASSWORD, interactive)?;
        credentials.password = Some(SecretString::from(password.to_string()));

        match vault.open(credentials) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_authentication() => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed password attempts.",
                        "Hint: The vault password is the Enpass master password; vaults created with a keyfile also need --keyfile.",
                    )
                    .into());
                }
                eprintln!(
                    "Incorrect password. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(open_error(err)),
        }
    }
}
