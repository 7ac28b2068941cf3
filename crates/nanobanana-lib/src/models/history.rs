// Prompt history models
// Immutable records of past optimizations, kept newest first

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prompt::MediaType;

/// Maximum number of entries kept in the log
pub const HISTORY_CAPACITY: usize = 20;

/// Current version of the persisted history document
pub const HISTORY_FORMAT_VERSION: u32 = 1;

/// A past optimized prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: String,
    pub prompt: String,
    /// Media kind the prompt was optimized for
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Creation time in Unix epoch milliseconds
    pub timestamp: i64,
}

impl HistoryItem {
    /// Create a new item stamped with a fresh id and the current time
    pub fn new(prompt: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            media_type,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Capacity-bounded, most-recent-first sequence of history items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct HistoryLog {
    items: Vec<HistoryItem>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from stored items, dropping anything past the capacity
    pub fn from_items(mut items: Vec<HistoryItem>) -> Self {
        items.truncate(HISTORY_CAPACITY);
        Self { items }
    }

    /// Prepend an item, evicting the oldest entries beyond the capacity
    pub fn prepended(&self, item: HistoryItem) -> Self {
        let mut items = Vec::with_capacity(HISTORY_CAPACITY);
        items.push(item);
        items.extend(self.items.iter().take(HISTORY_CAPACITY - 1).cloned());
        Self { items }
    }

    /// Copy of the log without the entry carrying `id`
    pub fn without(&self, id: &str) -> Self {
        Self {
            items: self.items.iter().filter(|i| i.id != id).cloned().collect(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryItem;
    type IntoIter = std::slice::Iter<'a, HistoryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Versioned document written to persistent storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredHistory {
    pub version: u32,
    pub items: Vec<HistoryItem>,
}

impl From<&HistoryLog> for StoredHistory {
    fn from(log: &HistoryLog) -> Self {
        Self {
            version: HISTORY_FORMAT_VERSION,
            items: log.items.clone(),
        }
    }
}
