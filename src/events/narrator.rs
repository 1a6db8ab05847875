//! Narrative copy selection
//!
//! Picks one string at random from an event's copy pool. The random source
//! is injected as an index-picker so tests can pin the selection.

use std::sync::Arc;

use rand::Rng;
use tracing::warn;

use crate::events::config::EventConfigStore;

/// Fallback line for unknown events or empty pools.
pub const FALLBACK_COPY: &str = "世界线发生了未知变化...";

/// Capability returning an index in `[0, len)`.
pub type IndexPicker = Box<dyn Fn(usize) -> usize + Send + Sync>;

pub struct Narrator {
    config: Arc<EventConfigStore>,
    picker: IndexPicker,
}

impl Narrator {
    pub fn new(config: Arc<EventConfigStore>) -> Self {
        Self::with_picker(
            config,
            Box::new(|len| rand::thread_rng().gen_range(0..len)),
        )
    }

    /// Build a narrator with a deterministic index picker.
    pub fn with_picker(config: Arc<EventConfigStore>, picker: IndexPicker) -> Self {
        Self { config, picker }
    }

    /// Produce display copy for the given event id.
    pub fn narrate(&self, event_id: &str) -> String {
        match self.config.get(event_id) {
            Some(event) if !event.copy_pool.is_empty() => {
                let index = (self.picker)(event.copy_pool.len());
                event.copy_pool[index].clone()
            }
            _ => {
                warn!(event_id, "No copy found for event, using fallback");
                FALLBACK_COPY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::config::{EventCategory, EventEmotion, EventSource, WorldEventConfig};

    fn config_with_pool(pool: &[&str]) -> Arc<EventConfigStore> {
        Arc::new(EventConfigStore::from_entries([WorldEventConfig {
            id: "BUG_FIXED".to_string(),
            source: EventSource::Tracker,
            category: EventCategory::Status,
            emotion: EventEmotion::Positive,
            priority: 10,
            cooldown: 60,
            copy_pool: pool.iter().map(|s| s.to_string()).collect(),
        }]))
    }

    #[test]
    fn test_picks_from_pool_with_injected_index() {
        let narrator =
            Narrator::with_picker(config_with_pool(&["第一条", "第二条"]), Box::new(|_| 1));
        assert_eq!(narrator.narrate("BUG_FIXED"), "第二条");
    }

    #[test]
    fn test_unknown_event_falls_back() {
        let narrator = Narrator::with_picker(config_with_pool(&["第一条"]), Box::new(|_| 0));
        assert_eq!(narrator.narrate("NO_SUCH_EVENT"), FALLBACK_COPY);
    }

    #[test]
    fn test_empty_pool_falls_back() {
        let narrator = Narrator::with_picker(config_with_pool(&[]), Box::new(|_| 0));
        assert_eq!(narrator.narrate("BUG_FIXED"), FALLBACK_COPY);
    }

    #[test]
    fn test_default_picker_stays_in_bounds() {
        let narrator = Narrator::new(config_with_pool(&["一", "二", "三"]));
        for _ in 0..100 {
            let copy = narrator.narrate("BUG_FIXED");
            assert!(["一", "二", "三"].contains(&copy.as_str()));
        }
    }
}
