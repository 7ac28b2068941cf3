// SQLite Database Connection Management
// Single connection shared by the session behind a mutex

use rusqlite::{Connection, Result as SqliteResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use super::schema;

/// Database file name
#[cfg(debug_assertions)]
pub const DATABASE_FILE: &str = "nanobanana-dev.db";

#[cfg(not(debug_assertions))]
pub const DATABASE_FILE: &str = "nanobanana.db";

/// Thread-safe database wrapper
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database file, enable WAL mode and run migrations
    pub fn new(path: PathBuf) -> Result<Self, String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create database directory: {}", e))?;
        }

        let conn =
            Connection::open(&path).map_err(|e| format!("Failed to open database: {}", e))?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=5000;
            PRAGMA synchronous=NORMAL;
            "#,
        )
        .map_err(|e| format!("Failed to configure database: {}", e))?;

        Self::from_connection(conn, path)
    }

    /// In-memory database, used by tests and when no data directory exists
    pub fn in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory()
            .map_err(|e| format!("Failed to open in-memory database: {}", e))?;
        Self::from_connection(conn, PathBuf::from(":memory:"))
    }

    fn from_connection(conn: Connection, path: PathBuf) -> Result<Self, String> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Get database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Get a lock on the connection for executing queries
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|e| format!("Failed to acquire database lock: {}", e))
    }

    fn run_migrations(&self) -> Result<(), String> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    /// Execute a function with the database connection
    /// The closure should return Result<T, String> with errors already converted
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> Result<T, String>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Execute a function with the database connection (raw SQLite result)
    pub fn with_connection_raw<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.lock()?;
        f(&conn).map_err(|e| format!("Database error: {}", e))
    }

    /// Get the current schema version
    pub fn schema_version(&self) -> Result<i32, String> {
        self.with_connection(schema::get_version)
    }
}

/// Database path inside the given data directory
pub fn database_path_in(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}
