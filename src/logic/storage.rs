//! Persisted State Storage
//!
//! SQLite-backed key-value store holding JSON-serialized values under the
//! keys the popup UI shares (`stats`, `trafficLog`, ...). The in-memory
//! engine state is authoritative between restarts; this file is the
//! durability boundary, rewritten after every processed event.
//!
//! The store also owns push-style change notifications: components register
//! a listener for a key and get called synchronously whenever that key is
//! written, so nothing ever polls the database.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Db(String),
    Serialize(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Db(e) => write!(f, "Database error: {}", e),
            Self::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Db(e.to_string())
    }
}

// ============================================================================
// STORAGE
// ============================================================================

type ChangeListener = Box<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Key-value snapshot store.
pub struct Storage {
    conn: Mutex<Connection>,
    listeners: Mutex<Vec<(String, ChangeListener)>>,
}

impl Storage {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open the store at the default per-user location.
    pub fn open_default() -> Result<Self, StorageError> {
        let path = default_path();
        log::info!("Opening state store: {:?}", path);
        Self::open(path)
    }

    /// In-memory store for tests and headless runs.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// Read and deserialize one key. Absent or corrupt values read as None;
    /// a corrupt value is logged, never propagated.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw: Option<String> = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .unwrap_or_else(|e| {
                log::error!("Failed to read key '{}': {}", key, e);
                None
            })
        };

        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Corrupt value under key '{}', ignoring: {}", key, e);
                None
            }
        }
    }

    /// Serialize and write one key, then notify that key's listeners.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_value(value).map_err(|e| StorageError::Serialize(e.to_string()))?;
        let raw = json.to_string();

        {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, raw],
            )?;
        }

        let listeners = self.listeners.lock();
        for (watched, listener) in listeners.iter() {
            if watched == key {
                listener(&json);
            }
        }

        Ok(())
    }

    /// Register a listener fired synchronously on every write to `key`.
    pub fn on_change<F>(&self, key: &str, listener: F)
    where
        F: Fn(&serde_json::Value) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .push((key.to_string(), Box::new(listener)));
    }
}

/// Default store location under the per-user data directory.
pub fn default_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("web-shield")
        .join("state.db")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_roundtrip() {
        let storage = Storage::open_in_memory().unwrap();
        storage.set("stats", &serde_json::json!({"requests": 4})).unwrap();
        let value: serde_json::Value = storage.get("stats").unwrap();
        assert_eq!(value["requests"], 4);
    }

    #[test]
    fn test_absent_key_is_none() {
        let storage = Storage::open_in_memory().unwrap();
        let value: Option<bool> = storage.get("monitorEnabled");
        assert!(value.is_none());
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let storage = Storage::open_in_memory().unwrap();
        storage.set("blocked", &vec!["a.com"]).unwrap();
        storage.set("blocked", &vec!["a.com", "b.com"]).unwrap();
        let value: Vec<String> = storage.get("blocked").unwrap();
        assert_eq!(value, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_on_change_fires_for_watched_key_only() {
        let storage = Storage::open_in_memory().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        storage.on_change("monitorEnabled", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        storage.set("monitorEnabled", &false).unwrap();
        storage.set("stats", &serde_json::json!({})).unwrap();
        storage.set("monitorEnabled", &true).unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.db");

        {
            let storage = Storage::open(&path).unwrap();
            storage.set("monitorEnabled", &false).unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        let value: bool = storage.get("monitorEnabled").unwrap();
        assert!(!value);
    }
}
