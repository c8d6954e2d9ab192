//! Session persistence
//!
//! Sessions live as one JSON array under a single key of a key-value store.
//! - `FileStore` keeps each key in `<data_dir>/<key>.json`
//! - `MemoryStore` keeps keys in memory (tests, `--ephemeral` runs)
//!
//! `SessionStore` never propagates storage failures: they are logged and the
//! caller sees an empty list or a dropped write.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::session::SessionRecord;

/// Key holding the session sequence
pub const SESSION_KEY: &str = "@sessions_data";

/// Minimal string key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

// ============================================================================
// File-backed store
// ============================================================================

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let name = name.trim_start_matches('_');
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store on which every call fails with `Error::Unavailable`
    pub fn failing() -> Self {
        Self {
            entries: HashMap::new(),
            failing: true,
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(Error::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Session store
// ============================================================================

/// Ordered sequence of completed sessions over a key-value store
pub struct SessionStore<S> {
    kv: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    fn read_all(&self) -> Result<Vec<SessionRecord>> {
        match self.kv.get(SESSION_KEY)? {
            Some(data) if !data.trim().is_empty() => Ok(serde_json::from_str(&data)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Append one record, rewriting the whole sequence.
    ///
    /// If the existing value cannot be read or parsed the write is dropped so
    /// that earlier sessions are not overwritten.
    pub fn append(&mut self, record: &SessionRecord) {
        let mut sessions = match self.read_all() {
            Ok(sessions) => sessions,
            Err(e) => {
                error!("Failed to load sessions before saving, session dropped: {e}");
                return;
            }
        };
        sessions.push(record.clone());

        let result = serde_json::to_string(&sessions)
            .map_err(Error::from)
            .and_then(|data| self.kv.set(SESSION_KEY, &data));

        match result {
            Ok(()) => info!(
                id = %record.id,
                category = %record.category,
                duration = record.duration,
                distractions = record.distraction_count,
                "Session saved"
            ),
            Err(e) => error!("Failed to save session: {e}"),
        }
    }

    /// All persisted sessions in insertion order; empty on any failure
    pub fn list_all(&self) -> Vec<SessionRecord> {
        match self.read_all() {
            Ok(sessions) => sessions,
            Err(Error::Json(e)) => {
                warn!("Stored sessions are not valid JSON, ignoring them: {e}");
                Vec::new()
            }
            Err(e) => {
                error!("Failed to load sessions: {e}");
                Vec::new()
            }
        }
    }

    /// Remove every persisted session
    pub fn clear_all(&mut self) {
        match self.kv.remove(SESSION_KEY) {
            Ok(()) => info!("All sessions cleared"),
            Err(e) => error!("Failed to clear sessions: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use tempfile::TempDir;

    fn record(category: &str) -> SessionRecord {
        SessionRecord::completed(category, 25, 1, Local::now())
    }

    #[test]
    fn test_list_empty_store() {
        let store = SessionStore::new(MemoryStore::new());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_append_keeps_order() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.append(&record("Study"));
        store.append(&record("Coding"));
        store.append(&record("Reading"));

        let categories: Vec<_> = store.list_all().into_iter().map(|s| s.category).collect();
        assert_eq!(categories, vec!["Study", "Coding", "Reading"]);
    }

    #[test]
    fn test_clear_then_list_is_empty() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.append(&record("Study"));
        store.clear_all();
        assert!(store.list_all().is_empty());

        // Clearing an already empty store is fine
        store.clear_all();
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut store = SessionStore::new(MemoryStore::failing());
        store.append(&record("Study"));
        store.clear_all();
        assert!(store.list_all().is_empty());

        store.kv_mut().set_failing(false);
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_malformed_json_is_not_overwritten() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.kv_mut().set(SESSION_KEY, "{not json").unwrap();

        assert!(store.list_all().is_empty());
        store.append(&record("Study"));
        assert_eq!(
            store.kv().get(SESSION_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut store = SessionStore::new(FileStore::new(temp.path()).unwrap());
        store.append(&record("Project"));

        let reopened = SessionStore::new(FileStore::new(temp.path()).unwrap());
        let sessions = reopened.list_all();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].category, "Project");
        assert!(temp.path().join("sessions_data.json").exists());
    }

    #[test]
    fn test_file_store_missing_key() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileStore::new(&temp.path().join("nested")).unwrap();
        assert_eq!(kv.get("absent").unwrap(), None);
        kv.remove("absent").unwrap();
    }

    #[test]
    fn test_file_store_clear() {
        let temp = TempDir::new().unwrap();
        let mut store = SessionStore::new(FileStore::new(temp.path()).unwrap());
        store.append(&record("Study"));
        store.clear_all();

        assert!(store.list_all().is_empty());
        assert!(!temp.path().join("sessions_data.json").exists());
    }
}
