//! Path resolution for config, vault and keyfile.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, EnpassConfig};
use crate::constants::env_vars;
use crate::errors::CliError;

/// Resolve the config file path, checking ENP_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env_vars::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the vault directory from CLI args (or ENP_VAULT) or config.
pub fn resolve_vault_path(cli: &Cli, config: &EnpassConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.vault.clone() {
        return Ok(path);
    }
    match config.vault.path.as_deref() {
        Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Err(CliError::invalid_input(missing_vault_message()).into()),
    }
}

/// Resolve the keyfile from CLI args or config.
pub fn resolve_keyfile_path(cli: &Cli, config: &EnpassConfig) -> Option<PathBuf> {
    cli.keyfile.clone().or_else(|| {
        config
            .vault
            .keyfile
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// Error message when no vault path was given anywhere.
pub fn missing_vault_message() -> String {
    "No vault path provided.\n\nUse:\n  enpasscli --vault /path/to/vault list\n\nOr set ENP_VAULT, or `path` under [vault] in the config file.".to_string()
}

/// Hint shown when the vault directory is incomplete.
pub fn missing_vault_hint(path: &Path) -> String {
    format!(
        "Hint: {} must contain vault.enpassdb and vault.json.",
        path.display()
    )
}
