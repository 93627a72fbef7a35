//! Application context for enpasscli.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::io::IsTerminal;
use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use tracing::{debug, warn};

use enpass_core::cache::DEFAULT_KDF_ITER_COUNT;
use enpass_core::{CombineMode, EntryQuery, FilterField, StoreOptions, Vault};

use crate::cli::Cli;
use crate::config::{read_config, EnpassConfig};
use crate::constants::env_vars;

use super::resolver::{resolve_config_path, resolve_keyfile_path, resolve_vault_path};
use super::unlock::open_vault;

/// Application context that bundles CLI args with config defaults.
///
/// CLI flags win over the config file.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<EnpassConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Get the config file, loading it lazily. A missing file means defaults.
    pub fn config(&self) -> anyhow::Result<&EnpassConfig> {
        self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if path.exists() {
                debug!(path = %path.display(), "loading config");
                read_config(&path)
            } else {
                Ok(EnpassConfig::default())
            }
        })
    }

    /// Prompts are allowed only on a terminal and without --non-interactive.
    pub fn interactive(&self) -> bool {
        !self.cli.non_interactive && std::io::stdin().is_terminal()
    }

    pub fn vault_path(&self) -> anyhow::Result<PathBuf> {
        resolve_vault_path(self.cli, self.config()?)
    }

    pub fn keyfile_path(&self) -> anyhow::Result<Option<PathBuf>> {
        Ok(resolve_keyfile_path(self.cli, self.config()?))
    }

    pub fn pin_enabled(&self) -> anyhow::Result<bool> {
        Ok(self.cli.pin || self.config()?.pin.enabled)
    }

    pub fn sort(&self) -> anyhow::Result<bool> {
        Ok(self.cli.sort || self.config()?.output.sort)
    }

    pub fn json(&self) -> anyhow::Result<bool> {
        Ok(self.cli.json || self.config()?.output.json)
    }

    /// PBKDF2 rounds for the PIN cache: ENP_PIN_ITER_COUNT, then config,
    /// then the default.
    pub fn pin_iter_count(&self) -> anyhow::Result<u32> {
        if let Ok(value) = std::env::var(env_vars::PIN_ITER_COUNT) {
            match value.trim().parse::<u32>() {
                Ok(count) => return Ok(count),
                Err(_) => warn!(
                    value = %value,
                    "ignoring invalid {}", env_vars::PIN_ITER_COUNT
                ),
            }
        }
        Ok(self
            .config()?
            .pin
            .iter_count
            .unwrap_or(DEFAULT_KDF_ITER_COUNT))
    }

    pub fn store_options(&self) -> anyhow::Result<StoreOptions> {
        Ok(StoreOptions::from_env().kdf_iter_count(self.pin_iter_count()?))
    }

    /// Query for the entry commands.
    pub fn entry_query(&self, filters: &[String]) -> EntryQuery {
        let mode = if self.cli.and {
            CombineMode::And
        } else {
            CombineMode::Or
        };
        EntryQuery::new()
            .entry_type(self.cli.entry_type.as_str())
            .filters(filters.iter().cloned())
            .mode(mode)
            .fields(self.cli.fields.iter().copied().map(FilterField::from))
    }

    /// Unlock the vault.
    ///
    /// This is a convenience method that delegates to the underlying
    /// `open_vault` function.
    pub fn open_vault(&self) -> anyhow::Result<Vault> {
        open_vault(self)
    }
}
