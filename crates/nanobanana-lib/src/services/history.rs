// Prompt History Store
//
// Owns the persisted, capacity-bounded log of optimized prompts. The log is
// read once at session start and rewritten in full on every change.

use serde_json::Value;

use crate::models::{HistoryItem, HistoryLog, StoredHistory, HISTORY_FORMAT_VERSION};
use crate::repositories::SettingsRepository;

/// Settings key holding the serialized history
pub const HISTORY_KEY: &str = "nano_banana_history";

/// History persistence over the settings key-value table
#[derive(Clone)]
pub struct HistoryStore {
    repo: SettingsRepository,
}

impl HistoryStore {
    pub fn new(repo: SettingsRepository) -> Self {
        Self { repo }
    }

    /// Read the persisted log. Missing, unreadable or unparsable data yields
    /// an empty log; nothing is raised to the caller.
    pub fn load(&self) -> HistoryLog {
        let raw = match self.repo.get_raw(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HistoryLog::new(),
            Err(e) => {
                log::warn!("Failed to read prompt history, starting empty: {}", e);
                return HistoryLog::new();
            }
        };

        match decode(&raw) {
            Ok(log) => {
                log::debug!("Loaded {} history entries", log.len());
                log
            }
            Err(e) => {
                log::warn!("Ignoring stored prompt history: {}", e);
                HistoryLog::new()
            }
        }
    }

    /// Prepend `item`, truncate to capacity, persist and return the new log
    pub fn append(&self, item: HistoryItem, log: &HistoryLog) -> HistoryLog {
        let updated = log.prepended(item);
        self.persist(&updated);
        updated
    }

    /// Drop the entry with `id`, persist and return the new log
    pub fn remove(&self, id: &str, log: &HistoryLog) -> HistoryLog {
        let updated = log.without(id);
        if updated.len() == log.len() {
            log::debug!("History entry {} not found", id);
        }
        self.persist(&updated);
        updated
    }

    /// Like `remove`, but a failed write is returned to the caller
    pub fn try_remove(&self, id: &str, log: &HistoryLog) -> Result<HistoryLog, String> {
        let updated = log.without(id);
        self.write(&updated)?;
        Ok(updated)
    }

    /// Empty the log and persist
    pub fn clear(&self) -> HistoryLog {
        let updated = HistoryLog::new();
        self.persist(&updated);
        updated
    }

    pub fn try_clear(&self) -> Result<HistoryLog, String> {
        let updated = HistoryLog::new();
        self.write(&updated)?;
        Ok(updated)
    }

    /// Write failures keep the in-memory log authoritative for the session
    fn persist(&self, log: &HistoryLog) {
        if let Err(e) = self.write(log) {
            log::warn!("Failed to persist prompt history: {}", e);
        }
    }

    fn write(&self, log: &HistoryLog) -> Result<(), String> {
        self.repo.set(HISTORY_KEY, &StoredHistory::from(log))
    }
}

/// Decode a stored document. Accepts the versioned format and the legacy
/// bare array of items.
fn decode(raw: &str) -> Result<HistoryLog, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;

    if value.is_array() {
        let items: Vec<HistoryItem> =
            serde_json::from_value(value).map_err(|e| format!("invalid legacy entries: {}", e))?;
        return Ok(HistoryLog::from_items(items));
    }

    let stored: StoredHistory =
        serde_json::from_value(value).map_err(|e| format!("invalid document: {}", e))?;
    if stored.version != HISTORY_FORMAT_VERSION {
        return Err(format!("unsupported history version {}", stored.version));
    }
    Ok(HistoryLog::from_items(stored.items))
}
