use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A trigger word and what to offer when it is typed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    pub trigger: String,
    pub completion: String,
    pub description: String,
}

impl SuggestionEntry {
    pub fn new(
        trigger: impl Into<String>,
        completion: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            completion: completion.into(),
            description: description.into(),
        }
    }
}

/// Where the engine looks up trigger tokens.
///
/// `token` is already lower-cased; implementations match it exactly.
pub trait SuggestionSource {
    fn lookup(&self, token: &str) -> Option<&SuggestionEntry>;
}

/// Hash table of entries keyed by lower-cased trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTable {
    entries: HashMap<String, SuggestionEntry>,
}

impl TriggerTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Build from entries; a later entry replaces an earlier one with the same trigger
    pub fn from_entries(entries: impl IntoIterator<Item = SuggestionEntry>) -> Self {
        let mut table = Self::empty();
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    pub fn insert(&mut self, entry: SuggestionEntry) -> Option<SuggestionEntry> {
        self.entries.insert(entry.trigger.to_lowercase(), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &SuggestionEntry> {
        self.entries.values()
    }
}

impl Default for TriggerTable {
    fn default() -> Self {
        Self::from_entries(default_entries())
    }
}

impl SuggestionSource for TriggerTable {
    fn lookup(&self, token: &str) -> Option<&SuggestionEntry> {
        self.entries.get(token)
    }
}

impl FromIterator<SuggestionEntry> for TriggerTable {
    fn from_iter<T: IntoIterator<Item = SuggestionEntry>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

/// Built-in triggers
pub fn default_entries() -> Vec<SuggestionEntry> {
    vec![
        SuggestionEntry::new(
            "machine",
            "learning algorithms have revolutionized",
            "Discuss the impact of ML algorithms",
        ),
        SuggestionEntry::new(
            "work",
            "networks can process vast amounts of data",
            "Explain neural network capabilities",
        ),
        SuggestionEntry::new(
            "deep",
            "learning models have achieved remarkable results",
            "Highlight deep learning achievements",
        ),
    ]
}
