//! Application context
//!
//! Constructs every service exactly once at startup and wires them together,
//! exposing the read-only views and imperative operations the shell consumes.
//! No module-level state: everything hangs off this context object.

use std::sync::Arc;

use crate::config::{Args, TrackerCredentials};
use crate::events::{EventConfigStore, Narrator, WorldEventDispatcher};
use crate::game::{PlayerState, ProgressionEngine};
use crate::store::{FileStore, KvStore};
use crate::tracker::{
    HttpTransport, StatusChange, TrackedItem, TrackerPoller, TrackerTransport,
};
use crate::types::Result;

pub struct App {
    progression: Arc<ProgressionEngine>,
    poller: Arc<TrackerPoller>,
    dispatcher: Arc<WorldEventDispatcher>,
}

impl App {
    /// Build the production wiring: file-backed store, reqwest transport,
    /// credentials and event config resolved from the arguments.
    pub fn from_args(args: &Args) -> Result<Self> {
        let store: Arc<dyn KvStore> = Arc::new(FileStore::new(&args.data_dir)?);
        let transport: Arc<dyn TrackerTransport> = Arc::new(HttpTransport::new()?);
        let events = EventConfigStore::load(&args.events_file);
        Ok(Self::with_parts(store, transport, args.credentials(), events))
    }

    /// Build from explicit collaborators. This is the seam tests use.
    pub fn with_parts(
        store: Arc<dyn KvStore>,
        transport: Arc<dyn TrackerTransport>,
        credentials: TrackerCredentials,
        events: EventConfigStore,
    ) -> Self {
        let progression = Arc::new(ProgressionEngine::load(Arc::clone(&store)));
        let poller = Arc::new(TrackerPoller::new(transport, credentials, store));
        let dispatcher = Arc::new(WorldEventDispatcher::new(Narrator::new(Arc::new(events))));
        Self {
            progression,
            poller,
            dispatcher,
        }
    }

    /// Advance the idle game by one second.
    pub async fn tick(&self) {
        self.progression.tick().await;
    }

    /// Run one poll cycle and feed the dispatcher the most recently
    /// appended change, if the cycle produced any.
    pub async fn poll(&self) -> Result<()> {
        let changes = self.poller.poll().await?;
        if let Some(last) = changes.last() {
            self.dispatcher.on_status_change(last).await;
        }
        Ok(())
    }

    pub async fn claim(&self, item_id: &str) {
        self.poller.claim(item_id).await;
    }

    pub async fn spend_contribution(&self, amount: f64) -> bool {
        self.progression.spend_contribution(amount).await
    }

    pub async fn claim_reward(&self, for_level: u32) {
        self.progression.claim_reward(for_level).await;
    }

    // Read-only views

    pub async fn player_state(&self) -> PlayerState {
        self.progression.state().await
    }

    pub async fn active_items(&self) -> Vec<TrackedItem> {
        self.poller.active_items().await
    }

    pub async fn claimed_items(&self) -> Vec<TrackedItem> {
        self.poller.claimed_items().await
    }

    pub async fn status_changes(&self) -> Vec<StatusChange> {
        self.poller.status_changes().await
    }

    pub async fn bug_changes_today(&self) -> usize {
        self.poller.bug_changes_today().await
    }

    pub async fn current_message(&self) -> Option<String> {
        self.dispatcher.current_message().await
    }

    pub async fn last_poll_error(&self) -> Option<String> {
        self.poller.last_error().await
    }

    /// Cancel the pending display timer, if any.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }
}
