//! Secret input helpers.

use dialoguer::Password;
use zeroize::Zeroizing;

/// Read a non-empty environment variable.
pub fn env_secret(name: &str) -> Option<Zeroizing<String>> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(Zeroizing::new)
}

/// Prompt for a hidden secret. Fails immediately when not interactive.
pub fn prompt_secret(label: &str, env_hint: &str, interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if !interactive {
        return Err(anyhow::anyhow!(
            "No {} provided and prompts are disabled. Set {}.",
            label,
            env_hint
        ));
    }
    Password::new()
        .with_prompt(format!("Enter {}", label))
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", label, e))
}
