//! Key-value persistence for overlay state
//!
//! The core persists a handful of independent keys (progression state, the
//! claim ledger) as JSON strings. The store is deliberately a plain
//! key→string interface so the file-backed implementation can be swapped for
//! an in-memory one in tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::types::{Result, SidequestError};

/// Storage key for the persisted progression state.
pub const PLAYER_STATE_KEY: &str = "player-state";

/// Storage key for the persisted claim ledger.
pub const CLAIMED_ITEMS_KEY: &str = "claimed-items";

/// Key→string store with `get`/`set` semantics.
///
/// Writes are last-writer-wins per key; callers own the decision of what to
/// do when a write fails (the overlay services log and keep the in-memory
/// state authoritative).
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: one JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| SidequestError::Storage(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SidequestError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path_for(key), value)
            .map_err(|e| SidequestError::Storage(e.to_string()))
    }
}

/// In-memory store used by tests.
///
/// `set_fail_writes(true)` makes every subsequent `set` fail, which is how
/// the persistence-failure-is-swallowed behavior gets exercised.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SidequestError::Storage("simulated write failure".into()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert!(store.get("player-state").unwrap().is_none());

        store.set("player-state", r#"{"level":3}"#).unwrap();
        assert_eq!(
            store.get("player-state").unwrap().as_deref(),
            Some(r#"{"level":3}"#)
        );
    }

    #[test]
    fn test_file_store_keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set(PLAYER_STATE_KEY, "a").unwrap();
        store.set(CLAIMED_ITEMS_KEY, "b").unwrap();

        assert_eq!(store.get(PLAYER_STATE_KEY).unwrap().as_deref(), Some("a"));
        assert_eq!(store.get(CLAIMED_ITEMS_KEY).unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_memory_store_failure_injection() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();

        store.set_fail_writes(true);
        assert!(store.set("k", "v2").is_err());

        // Reads still work and the old value survives
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
