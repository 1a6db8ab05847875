//! Tracker poller
//!
//! Fetches the current item snapshot from TAPD, classifies claimability,
//! sorts the snapshot, reconciles the claim ledger against the live id set,
//! diffs secondary statuses against the previous poll, and publishes the
//! filtered active-item list. Runs on a long-period timer; `poll()` is also
//! exposed for manual refresh.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::TrackerCredentials;
use crate::store::KvStore;
use crate::tracker::item::{claimable_statuses, sort_snapshot, ItemKind, TrackedItem, FETCH_STATUSES};
use crate::tracker::ledger::ClaimLedger;
use crate::tracker::transport::TrackerTransport;
use crate::types::{Result, SidequestError};

const API_BASE_URL: &str = "https://api.tapd.cn";

/// Maximum status changes to keep in the rolling log
const MAX_CHANGE_HISTORY: usize = 1000;

/// A single detected secondary-status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub item_id: String,
    pub kind: ItemKind,
    pub from: String,
    pub to: String,
    /// Epoch milliseconds, UTC
    pub occurred_at: i64,
}

struct PollerState {
    active_items: Vec<TrackedItem>,
    /// id → last seen secondary status, seeded across polls, never cleared
    previous_status: HashMap<String, String>,
    changes: VecDeque<StatusChange>,
    ledger: ClaimLedger,
    last_error: Option<String>,
}

/// Polls the tracker and owns everything derived from its snapshots.
pub struct TrackerPoller {
    transport: Arc<dyn TrackerTransport>,
    credentials: TrackerCredentials,
    state: RwLock<PollerState>,
    in_flight: AtomicBool,
}

impl TrackerPoller {
    pub fn new(
        transport: Arc<dyn TrackerTransport>,
        credentials: TrackerCredentials,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            transport,
            credentials,
            state: RwLock::new(PollerState {
                active_items: Vec::new(),
                previous_status: HashMap::new(),
                changes: VecDeque::new(),
                ledger: ClaimLedger::load(store),
                last_error: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one poll cycle and return the status changes it emitted.
    ///
    /// A call while another poll is outstanding is a no-op. On failure the
    /// previously published active list stays untouched and the user-facing
    /// message is recorded for display.
    pub async fn poll(&self) -> Result<Vec<StatusChange>> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("Poll already in flight, skipping");
            return Ok(Vec::new());
        }

        let result = self.poll_inner().await;
        self.in_flight.store(false, Ordering::SeqCst);

        if let Err(ref e) = result {
            error!(error = %e, "Tracker poll failed");
            self.state.write().await.last_error = Some(e.user_message().to_string());
        }
        result
    }

    async fn poll_inner(&self) -> Result<Vec<StatusChange>> {
        let Some(token) = self.credentials.token.as_deref() else {
            warn!("TAPD token not set, skipping fetch");
            return Ok(Vec::new());
        };
        debug!(token = %mask_token(token), "Fetching TAPD snapshot");

        let url = self.build_story_url();
        let payload = self.transport.fetch_json(&url, token).await?;

        let claimable = claimable_statuses(self.credentials.user_role_field.as_deref());
        let entries = payload
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| SidequestError::Transport("malformed response envelope".into()))?;

        let mut items: Vec<TrackedItem> = entries
            .iter()
            .filter_map(|entry| TrackedItem::from_envelope_entry(entry, claimable))
            .collect();

        // Enforce id uniqueness within the snapshot, first occurrence wins
        let mut seen = HashSet::new();
        items.retain(|item| seen.insert(item.id.clone()));

        sort_snapshot(&mut items);
        let fetched_ids: HashSet<String> = items.iter().map(|item| item.id.clone()).collect();

        let mut state = self.state.write().await;

        // Claimed items that vanished upstream are no longer ours to show
        state.ledger.reconcile(&fetched_ids);

        let filtered: Vec<TrackedItem> = items
            .into_iter()
            .filter(|item| !state.ledger.contains(&item.id))
            .collect();

        let now = chrono::Utc::now().timestamp_millis();
        let mut changes = Vec::new();
        for item in &filtered {
            if let Some(old_status) = state.previous_status.get(&item.id) {
                if *old_status != item.v_status {
                    changes.push(StatusChange {
                        item_id: item.id.clone(),
                        kind: item.kind,
                        from: old_status.clone(),
                        to: item.v_status.clone(),
                        occurred_at: now,
                    });
                }
            }
            // Record the latest status either way, including first sightings
            state
                .previous_status
                .insert(item.id.clone(), item.v_status.clone());
        }

        for change in &changes {
            debug!(
                item_id = %change.item_id,
                from = %change.from,
                to = %change.to,
                "Detected status change"
            );
            state.changes.push_back(change.clone());
            while state.changes.len() > MAX_CHANGE_HISTORY {
                state.changes.pop_front();
            }
        }

        info!(
            items = filtered.len(),
            changes = changes.len(),
            "Poll complete"
        );
        state.active_items = filtered;
        state.last_error = None;

        Ok(changes)
    }

    /// Claim an item: move it from the active list to the ledger head.
    ///
    /// Already-claimed ids are ignored; so are ids not currently active.
    /// Grants no currency — reward credit is a separate explicit action.
    pub async fn claim(&self, item_id: &str) {
        let mut state = self.state.write().await;
        if state.ledger.contains(item_id) {
            warn!(item_id, "Item already claimed, ignoring");
            return;
        }
        match state.active_items.iter().position(|item| item.id == item_id) {
            Some(pos) => {
                let item = state.active_items.remove(pos);
                info!(item_id, "Item claimed");
                state.ledger.claim_front(item);
            }
            None => debug!(item_id, "Claim requested for item not in active list"),
        }
    }

    pub async fn active_items(&self) -> Vec<TrackedItem> {
        self.state.read().await.active_items.clone()
    }

    pub async fn claimed_items(&self) -> Vec<TrackedItem> {
        self.state.read().await.ledger.items().to_vec()
    }

    pub async fn status_changes(&self) -> Vec<StatusChange> {
        self.state.read().await.changes.iter().cloned().collect()
    }

    /// Count of bug-kind entries in the rolling change log.
    pub async fn bug_changes_today(&self) -> usize {
        self.state
            .read()
            .await
            .changes
            .iter()
            .filter(|change| change.kind == ItemKind::Bug)
            .count()
    }

    /// Most recent user-facing poll error, cleared by the next successful poll.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    fn build_story_url(&self) -> String {
        let fields = "id,name,status,owner,v_status";
        let statuses = FETCH_STATUSES.join("|");

        let owner_param = match (
            self.credentials.user_name.as_deref(),
            self.credentials.user_role_field.as_deref(),
        ) {
            (Some(name), Some(field)) if !name.is_empty() => format!("&{}={}", field, name),
            _ => String::new(),
        };

        let mut url = format!(
            "{}/stories?limit=50&with_v_status=1{}&fields={}&v_status={}",
            API_BASE_URL, owner_param, fields, statuses
        );
        if let Some(workspace_id) = self.credentials.workspace_id.as_deref() {
            url.push_str(&format!("&workspace_id={}", workspace_id));
        }
        url
    }
}

fn mask_token(token: &str) -> String {
    if token.is_ascii() && token.len() > 8 {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "****".to_string()
    }
}
