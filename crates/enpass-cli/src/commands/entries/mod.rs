pub mod list;
pub mod pass;
pub mod show;

pub use list::handle_list;
pub use pass::handle_pass;
pub use show::handle_show;

use enpass_core::{retain_visible, sort_entries, Entry, Vault};

use crate::app::AppContext;
use crate::errors::CliError;

/// Matching entries after trash handling and optional sorting.
fn visible_entries(ctx: &AppContext, vault: &Vault, filters: &[String]) -> anyhow::Result<Vec<Entry>> {
    let query = ctx.entry_query(filters);
    let mut entries = vault
        .get_entries(&query)
        .map_err(|err| CliError::from_vault_error(&err))?;
    retain_visible(&mut entries, ctx.cli().trashed);
    if ctx.sort()? {
        sort_entries(&mut entries);
    }
    Ok(entries)
}
