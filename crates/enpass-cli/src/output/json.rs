//! JSON output formatting for entries.

use super::DisplayEntry;

/// Convert an entry to JSON for output.
pub fn entry_json(item: &DisplayEntry<'_>) -> serde_json::Value {
    let entry = item.entry;
    let mut value = serde_json::json!({
        "title": entry.title,
        "login": entry.subtitle,
        "category": entry.category,
        "label": entry.label,
        "type": entry.entry_type,
    });
    if let Some(secret) = item.secret.as_ref() {
        value["password"] = serde_json::Value::String(secret.to_string());
    }
    value
}

/// Convert multiple entries to JSON array for output.
pub fn entries_json(items: &[DisplayEntry<'_>]) -> Vec<serde_json::Value> {
    items.iter().map(entry_json).collect()
}
