//! In-memory entry filtering and ordering.
//!
//! `EntryQuery` decides which entries a listing or lookup returns. Trashed
//! entries are not handled here: callers apply [`retain_visible`] so listing
//! and uniqueness logic share one rule.

use crate::storage::Entry;

/// How per-filter results combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// An entry matches if any filter matches
    #[default]
    Or,
    /// An entry matches only if every filter matches
    And,
}

/// Entry attribute a text filter is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Title,
    Subtitle,
    Category,
    Label,
    Note,
}

impl FilterField {
    fn value<'a>(&self, entry: &'a Entry) -> &'a str {
        match self {
            FilterField::Title => &entry.title,
            FilterField::Subtitle => &entry.subtitle,
            FilterField::Category => &entry.category,
            FilterField::Label => &entry.label,
            FilterField::Note => &entry.note,
        }
    }
}

/// Selection criteria for `Vault::get_entries`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    /// Exact entry type, e.g. `password`
    pub entry_type: Option<String>,

    /// Case-insensitive substring filters
    pub filters: Vec<String>,

    pub mode: CombineMode,

    /// Fields each filter is tested against; empty means title only
    pub fields: Vec<FilterField>,
}

impl EntryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_type(mut self, entry_type: impl Into<String>) -> Self {
        let entry_type = entry_type.into();
        self.entry_type = if entry_type.is_empty() {
            None
        } else {
            Some(entry_type)
        };
        self
    }

    pub fn filters<I, T>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FilterField>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    /// Whether `entry` passes the type and text filters.
    ///
    /// Deleted and trashed flags are not looked at here.
    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(entry_type) = self.entry_type.as_deref() {
            if entry.entry_type != entry_type {
                return false;
            }
        }

        if self.filters.is_empty() {
            return true;
        }

        let fields: &[FilterField] = if self.fields.is_empty() {
            &[FilterField::Title]
        } else {
            &self.fields
        };
        let haystacks: Vec<String> = fields
            .iter()
            .map(|field| field.value(entry).to_lowercase())
            .collect();
        let filter_matches = |filter: &String| {
            let needle = filter.to_lowercase();
            haystacks.iter().any(|haystack| haystack.contains(&needle))
        };

        match self.mode {
            CombineMode::Or => self.filters.iter().any(filter_matches),
            CombineMode::And => self.filters.iter().all(filter_matches),
        }
    }
}

/// Drop trashed entries unless `include_trashed` is set. Deleted entries are
/// always dropped.
pub fn retain_visible(entries: &mut Vec<Entry>, include_trashed: bool) {
    entries.retain(|entry| !entry.is_deleted() && (include_trashed || !entry.is_trashed()));
}

/// Sort by title, breaking ties by subtitle, both case-insensitive.
///
/// Two stable passes: subtitle first, then title.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by_cached_key(|entry| entry.subtitle.to_lowercase());
    entries.sort_by_cached_key(|entry| entry.title.to_lowercase());
}
