use enpass_core::{remove_store_files, store_id};

use crate::app::AppContext;

pub fn handle_lock(ctx: &AppContext) -> anyhow::Result<()> {
    let vault_path = ctx.vault_path()?;
    let removed = remove_store_files(&store_id(&vault_path), &ctx.store_options()?)
        .map_err(|err| anyhow::anyhow!("could not clear PIN cache: {}", err))?;

    if removed.is_empty() {
        println!("No PIN cache to clear.");
    } else {
        println!("PIN cache cleared.");
    }
    Ok(())
}
