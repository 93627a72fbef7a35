//! Table output formatting for entries.

use comfy_table::{presets, ContentArrangement, Table};

use super::DisplayEntry;

/// Render entries as a borderless table, adding a password column when any
/// entry carries a secret.
pub fn entry_table(items: &[DisplayEntry<'_>]) -> String {
    let with_secrets = items.iter().any(|item| item.secret.is_some());

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Disabled);

    let mut header = vec!["TITLE", "LOGIN", "CATEGORY", "LABEL"];
    if with_secrets {
        header.push("PASSWORD");
    }
    table.set_header(header);

    for item in items {
        let entry = item.entry;
        let mut row = vec![
            entry.title.clone(),
            entry.subtitle.clone(),
            entry.category.clone(),
            entry.label.clone(),
        ];
        if with_secrets {
            row.push(
                item.secret
                    .as_ref()
                    .map(|secret| secret.to_string())
                    .unwrap_or_default(),
            );
        }
        table.add_row(row);
    }

    table.to_string()
}
