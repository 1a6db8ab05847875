//! Claim ledger
//!
//! The set of items the user has already redeemed, persisted independently
//! of the live item list and reconciled against every fresh fetch. Insertion
//! order is preserved most-recent-first for display.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::store::{KvStore, CLAIMED_ITEMS_KEY};
use crate::tracker::item::TrackedItem;

pub struct ClaimLedger {
    /// Claimed item snapshots, most recent first. No id appears twice.
    items: Vec<TrackedItem>,
    store: Arc<dyn KvStore>,
}

impl ClaimLedger {
    /// Load the ledger from the store, deduplicating by id.
    ///
    /// A missing or unparseable blob starts the ledger empty.
    pub fn load(store: Arc<dyn KvStore>) -> Self {
        let items = match store.get(CLAIMED_ITEMS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<TrackedItem>>(&raw) {
                Ok(loaded) => dedup_by_id(loaded),
                Err(e) => {
                    warn!(error = %e, "Claim ledger unparseable, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read claim ledger, starting empty");
                Vec::new()
            }
        };
        Self { items, store }
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Prepend a freshly claimed item and persist.
    ///
    /// Callers are responsible for the already-claimed check; this only
    /// records.
    pub fn claim_front(&mut self, item: TrackedItem) {
        self.items.insert(0, item);
        self.persist();
    }

    /// Drop entries whose id is no longer present upstream.
    ///
    /// Persists only when something was actually pruned, so running it twice
    /// against the same id set is a no-op the second time.
    pub fn reconcile(&mut self, live_ids: &HashSet<String>) {
        let before = self.items.len();
        self.items.retain(|item| live_ids.contains(&item.id));
        let removed = before - self.items.len();
        if removed > 0 {
            info!(removed, "Pruned claimed items no longer present upstream");
            self.persist();
        }
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize claim ledger");
                return;
            }
        };
        if let Err(e) = self.store.set(CLAIMED_ITEMS_KEY, &raw) {
            warn!(error = %e, "Failed to persist claim ledger");
        }
    }
}

fn dedup_by_id(items: Vec<TrackedItem>) -> Vec<TrackedItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tracker::item::{gamify_status, ItemKind};

    fn item(id: &str) -> TrackedItem {
        TrackedItem {
            id: id.to_string(),
            kind: ItemKind::Story,
            name: format!("story {}", id),
            status: "status_1".to_string(),
            owner: "dev;".to_string(),
            v_status: "已提测".to_string(),
            gamified_status: gamify_status("已提测"),
            is_claimable: true,
        }
    }

    fn ids(ledger: &ClaimLedger) -> Vec<&str> {
        ledger.items().iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_claim_prepends_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = ClaimLedger::load(store.clone() as Arc<dyn KvStore>);

        ledger.claim_front(item("1"));
        ledger.claim_front(item("2"));
        assert_eq!(ids(&ledger), ["2", "1"]);

        // A reloaded ledger sees the persisted entries
        let reloaded = ClaimLedger::load(store as Arc<dyn KvStore>);
        assert_eq!(ids(&reloaded), ["2", "1"]);
    }

    #[test]
    fn test_load_deduplicates_by_id() {
        let store = Arc::new(MemoryStore::new());
        let raw = serde_json::to_string(&vec![item("1"), item("2"), item("1")]).unwrap();
        store.set(CLAIMED_ITEMS_KEY, &raw).unwrap();

        let ledger = ClaimLedger::load(store as Arc<dyn KvStore>);
        assert_eq!(ids(&ledger), ["1", "2"]);
    }

    #[test]
    fn test_reconcile_prunes_and_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = ClaimLedger::load(store as Arc<dyn KvStore>);
        ledger.claim_front(item("1"));
        ledger.claim_front(item("2"));
        ledger.claim_front(item("3"));

        let live: HashSet<String> = ["1", "3"].iter().map(|s| s.to_string()).collect();
        ledger.reconcile(&live);
        assert_eq!(ids(&ledger), ["3", "1"]);

        // Second run with the same set changes nothing
        ledger.reconcile(&live);
        assert_eq!(ids(&ledger), ["3", "1"]);
    }

    #[test]
    fn test_unparseable_blob_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(CLAIMED_ITEMS_KEY, "not json").unwrap();

        let ledger = ClaimLedger::load(store as Arc<dyn KvStore>);
        assert!(ledger.items().is_empty());
    }
}
