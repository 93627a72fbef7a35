use crate::app::AppContext;
use crate::cli::FilterArgs;
use crate::output::{entries_json, entry_table, DisplayEntry};

pub fn handle_list(ctx: &AppContext, args: &FilterArgs) -> anyhow::Result<()> {
    let mut vault = ctx.open_vault()?;
    let entries = super::visible_entries(ctx, &vault, &args.filters)?;
    vault.close();

    let items: Vec<DisplayEntry<'_>> = entries.iter().map(DisplayEntry::new).collect();
    if ctx.json()? {
        println!("{}", serde_json::to_string(&entries_json(&items))?);
    } else if items.is_empty() {
        println!("No matching entries.");
    } else {
        println!("{}", entry_table(&items));
    }
    Ok(())
}
