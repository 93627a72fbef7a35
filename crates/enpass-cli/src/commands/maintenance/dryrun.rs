use tracing::debug;

use crate::app::AppContext;

/// Unlock the vault (filling the PIN cache when enabled) and stop.
pub fn handle_dryrun(ctx: &AppContext) -> anyhow::Result<()> {
    let mut vault = ctx.open_vault()?;
    vault.close();
    debug!("dry run complete");
    Ok(())
}
