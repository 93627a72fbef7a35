use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Optional defaults read from `config.toml`. Every section may be omitted.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnpassConfig {
    pub vault: VaultSection,
    pub pin: PinSection,
    pub output: OutputSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSection {
    pub path: Option<String>,
    pub keyfile: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PinSection {
    pub enabled: bool,
    pub iter_count: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub sort: bool,
    pub json: bool,
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<EnpassConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("enpasscli"));
        }
    }
    Ok(home_dir()?.join(".config").join("enpasscli"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
