//! World-event configuration
//!
//! Read-through cache over a static JSON document mapping event ids to their
//! narrative metadata and copy pools. Loaded once per process; a missing or
//! malformed document degrades to an empty map so the narrator falls back,
//! never an error surfaced to the dispatcher.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Tracker,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Status,
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventEmotion {
    Positive,
    Neutral,
    Negative,
}

/// One world event's configuration.
///
/// `priority` and `cooldown` are carried for the document format but not
/// consulted by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldEventConfig {
    pub id: String,
    pub source: EventSource,
    pub category: EventCategory,
    pub emotion: EventEmotion,
    pub priority: i32,
    /// Seconds
    pub cooldown: u64,
    pub copy_pool: Vec<String>,
}

/// In-memory cache of the event-config document.
pub struct EventConfigStore {
    entries: HashMap<String, WorldEventConfig>,
}

impl EventConfigStore {
    /// Load the document at `path`, degrading to an empty map on failure.
    pub fn load(path: &Path) -> Self {
        match load_document(path) {
            Ok(entries) => {
                info!(events = entries.len(), "Loaded world-event config");
                Self { entries }
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load world-event config, narrative will fall back"
                );
                Self {
                    entries: HashMap::new(),
                }
            }
        }
    }

    /// Build a store directly from entries (tests, embedded defaults).
    pub fn from_entries(entries: impl IntoIterator<Item = WorldEventConfig>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, event_id: &str) -> Option<&WorldEventConfig> {
        self.entries.get(event_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_document(path: &Path) -> Result<HashMap<String, WorldEventConfig>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "BUG_FIXED": {
            "id": "BUG_FIXED",
            "source": "tracker",
            "category": "status",
            "emotion": "positive",
            "priority": 10,
            "cooldown": 60,
            "copy_pool": ["修复了一处裂缝。"]
        }
    }"#;

    #[test]
    fn test_load_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world-events.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let store = EventConfigStore::load(&path);
        assert_eq!(store.len(), 1);

        let event = store.get("BUG_FIXED").unwrap();
        assert_eq!(event.source, EventSource::Tracker);
        assert_eq!(event.emotion, EventEmotion::Positive);
        assert_eq!(event.copy_pool.len(), 1);
    }

    #[test]
    fn test_missing_document_degrades_to_empty() {
        let store = EventConfigStore::load(Path::new("/nonexistent/world-events.json"));
        assert!(store.is_empty());
        assert!(store.get("BUG_FIXED").is_none());
    }

    #[test]
    fn test_malformed_document_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world-events.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(EventConfigStore::load(&path).is_empty());
    }

    #[test]
    fn test_shipped_default_document_parses() {
        let raw = include_str!("../../assets/world-events.json");
        let entries: HashMap<String, WorldEventConfig> = serde_json::from_str(raw).unwrap();
        for id in ["BUG_FIXED", "BUG_REOPENED", "STORY_ROLLBACK"] {
            let event = entries.get(id).unwrap();
            assert!(!event.copy_pool.is_empty(), "{} has an empty pool", id);
        }
    }
}
