//! World-event dispatcher
//!
//! Two-state machine: idle (no message) or displaying (current message plus
//! an expiry task). Each newly observed status change that maps to a world
//! event replaces the current message and restarts the display timer — no
//! queueing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;

use crate::events::mapper::map_status_change;
use crate::events::narrator::Narrator;
use crate::tracker::StatusChange;

/// How long a message stays on screen
const DISPLAY_LIFETIME: Duration = Duration::from_secs(8);

pub struct WorldEventDispatcher {
    narrator: Narrator,
    message: Arc<RwLock<Option<String>>>,
    expiry: Mutex<Option<JoinHandle<()>>>,
}

impl WorldEventDispatcher {
    pub fn new(narrator: Narrator) -> Self {
        Self {
            narrator,
            message: Arc::new(RwLock::new(None)),
            expiry: Mutex::new(None),
        }
    }

    /// Handle one newly appended status change.
    ///
    /// Unmapped changes are ignored. Mapped ones replace whatever is
    /// currently displaying and reset the lifetime.
    pub async fn on_status_change(&self, change: &StatusChange) {
        let Some(event) = map_status_change(change) else {
            return;
        };
        let copy = self.narrator.narrate(event.id());
        info!(event = event.id(), item_id = %change.item_id, "World event");

        let mut pending = self.expiry.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        *self.message.write().await = Some(copy);

        let message = Arc::clone(&self.message);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(DISPLAY_LIFETIME).await;
            *message.write().await = None;
        }));
    }

    /// The message currently displaying, if any.
    pub async fn current_message(&self) -> Option<String> {
        self.message.read().await.clone()
    }

    /// Cancel any pending display timer.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.expiry.lock().await.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::config::{
        EventCategory, EventEmotion, EventSource, EventConfigStore, WorldEventConfig,
    };
    use crate::tracker::ItemKind;

    fn dispatcher() -> WorldEventDispatcher {
        let entry = |id: &str, line: &str| WorldEventConfig {
            id: id.to_string(),
            source: EventSource::Tracker,
            category: EventCategory::Status,
            emotion: EventEmotion::Neutral,
            priority: 10,
            cooldown: 60,
            copy_pool: vec![line.to_string()],
        };
        let config = Arc::new(EventConfigStore::from_entries([
            entry("BUG_FIXED", "裂缝修复"),
            entry("BUG_REOPENED", "异常苏醒"),
        ]));
        WorldEventDispatcher::new(Narrator::with_picker(config, Box::new(|_| 0)))
    }

    fn bug_change(to: &str) -> StatusChange {
        StatusChange {
            item_id: "1".to_string(),
            kind: ItemKind::Bug,
            from: "处理中".to_string(),
            to: to.to_string(),
            occurred_at: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_expires_after_lifetime() {
        let dispatcher = dispatcher();
        dispatcher.on_status_change(&bug_change("已解决")).await;
        assert_eq!(dispatcher.current_message().await.as_deref(), Some("裂缝修复"));

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(dispatcher.current_message().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_event_replaces_message_and_resets_timer() {
        let dispatcher = dispatcher();
        dispatcher.on_status_change(&bug_change("已解决")).await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        dispatcher.on_status_change(&bug_change("重新打开")).await;

        // Five seconds into the second lifetime the first would have expired
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(dispatcher.current_message().await.as_deref(), Some("异常苏醒"));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(dispatcher.current_message().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmapped_change_is_ignored() {
        let dispatcher = dispatcher();
        dispatcher.on_status_change(&bug_change("处理中")).await;
        assert!(dispatcher.current_message().await.is_none());
    }
}
