use tracing::warn;

use crate::app::AppContext;
use crate::cli::FilterArgs;
use crate::output::{entries_json, entry_table, DisplayEntry};

pub fn handle_show(ctx: &AppContext, args: &FilterArgs) -> anyhow::Result<()> {
    let mut vault = ctx.open_vault()?;
    let entries = super::visible_entries(ctx, &vault, &args.filters)?;
    vault.close();

    // An entry that fails to decrypt is reported and left out.
    let mut items = Vec::with_capacity(entries.len());
    for entry in &entries {
        match entry.decrypt() {
            Ok(secret) => items.push(DisplayEntry::with_secret(entry, secret)),
            Err(err) => warn!(title = %entry.title, error = %err, "skipping entry"),
        }
    }

    if ctx.json()? {
        println!("{}", serde_json::to_string(&entries_json(&items))?);
    } else if items.is_empty() {
        println!("No matching entries.");
    } else {
        println!("{}", entry_table(&items));
    }
    Ok(())
}
