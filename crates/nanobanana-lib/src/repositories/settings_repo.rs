// Settings Repository
// Key-value access to the settings table

use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::utils::database::Database;

/// Repository for key-value settings
#[derive(Clone)]
pub struct SettingsRepository {
    db: Database,
}

impl SettingsRepository {
    /// Create a new SettingsRepository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the raw stored value for a key
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, String> {
        self.db.with_connection(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| format!("Failed to read setting '{}': {}", key, e))
        })
    }

    /// Store a raw value, replacing any previous value
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), String> {
        self.db.with_connection(|conn| {
            conn.execute(
                r#"
                INSERT INTO settings (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value],
            )
            .map_err(|e| format!("Failed to write setting '{}': {}", key, e))?;
            Ok(())
        })
    }

    /// Get a JSON-encoded value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, String> {
        match self.get_raw(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| format!("Failed to parse setting '{}': {}", key, e)),
            None => Ok(None),
        }
    }

    /// Store a JSON-encoded value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), String> {
        let json = serde_json::to_string(value)
            .map_err(|e| format!("Failed to serialize setting '{}': {}", key, e))?;
        self.set_raw(key, &json)
    }

    /// Delete a key. Returns whether a row was removed.
    pub fn delete(&self, key: &str) -> Result<bool, String> {
        self.db.with_connection(|conn| {
            let rows = conn
                .execute("DELETE FROM settings WHERE key = ?1", params![key])
                .map_err(|e| format!("Failed to delete setting '{}': {}", key, e))?;
            Ok(rows > 0)
        })
    }
}
