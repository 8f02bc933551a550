// ── Snapshot store ──
//
// Holds the latest published `CoordinatorData` and notifies subscribers
// on every publish. Writers build a new map from the current one; readers
// never block.

mod data;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::entity::EntityKey;

pub use data::{CoordinatorData, EntityData, KeySnapshot};

/// Result of one attempted fetch for one key.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Fresh(Arc<EntityData>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub(crate) struct KeyResult {
    pub key: EntityKey,
    pub seq: u64,
    pub fetched_at: DateTime<Utc>,
    pub outcome: Outcome,
}

pub(crate) struct DataStore {
    current: ArcSwap<CoordinatorData>,
    notify: watch::Sender<Arc<CoordinatorData>>,
    next_seq: AtomicU64,
}

impl DataStore {
    pub(crate) fn new() -> Self {
        let initial = Arc::new(CoordinatorData::default());
        let (notify, _) = watch::channel(Arc::clone(&initial));
        Self {
            current: ArcSwap::new(initial),
            notify,
            next_seq: AtomicU64::new(1),
        }
    }

    /// Allocate a sequence number for a fetch about to start. Callers hold
    /// the key's lock, so per-key numbers follow fetch start order.
    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self) -> Arc<CoordinatorData> {
        self.current.load_full()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<CoordinatorData>> {
        self.notify.subscribe()
    }

    /// Publish a full cycle. Only keys in `active` that still pass
    /// `is_active` when the snapshot is built survive; keys without a result
    /// this cycle carry their previous entry forward.
    pub(crate) fn publish_cycle(
        &self,
        active: &[EntityKey],
        results: &[KeyResult],
        is_active: impl Fn(EntityKey) -> bool,
    ) -> Arc<CoordinatorData> {
        let now = Utc::now();
        self.publish(|current| {
            let mut entries = BTreeMap::new();
            for key in active.iter().filter(|k| is_active(**k)) {
                let previous = current.entries.get(key);
                let merged = match results.iter().find(|r| r.key == *key) {
                    Some(result) => merge(previous, result),
                    None => previous.cloned(),
                };
                if let Some(entry) = merged {
                    entries.insert(*key, entry);
                }
            }
            CoordinatorData {
                entries,
                cycle: current.cycle + 1,
                refreshed_at: Some(now),
            }
        })
    }

    /// Publish results for a subset of keys; every other entry is kept.
    /// Results for keys that no longer pass `is_active` are discarded.
    pub(crate) fn publish_keys(
        &self,
        results: &[KeyResult],
        is_active: impl Fn(EntityKey) -> bool,
    ) -> Arc<CoordinatorData> {
        self.publish(|current| {
            let mut entries = current.entries.clone();
            for result in results {
                if !is_active(result.key) {
                    entries.remove(&result.key);
                    continue;
                }
                match merge(entries.get(&result.key), result) {
                    Some(entry) => {
                        entries.insert(result.key, entry);
                    }
                    None => {
                        entries.remove(&result.key);
                    }
                }
            }
            CoordinatorData {
                entries,
                cycle: current.cycle,
                refreshed_at: current.refreshed_at,
            }
        })
    }

    /// Drop `key` from the published map.
    pub(crate) fn remove(&self, key: EntityKey) -> Arc<CoordinatorData> {
        self.publish(|current| {
            let mut next = current.clone();
            next.entries.remove(&key);
            next
        })
    }

    fn publish(&self, build: impl Fn(&CoordinatorData) -> CoordinatorData) -> Arc<CoordinatorData> {
        let previous = self.current.rcu(|current| Arc::new(build(current)));
        let published = self.current.load_full();
        tracing::trace!(
            previous_keys = previous.len(),
            keys = published.len(),
            "published coordinator data"
        );
        self.notify.send_replace(Arc::clone(&published));
        published
    }
}

/// Combine the current entry for a key with a new fetch result.
///
/// A result older than what is already held never wins. A failure keeps the
/// previous records and marks them stale; with nothing to keep, the key
/// stays absent.
fn merge(current: Option<&KeySnapshot>, result: &KeyResult) -> Option<KeySnapshot> {
    if let Some(existing) = current {
        if existing.seq > result.seq {
            return Some(existing.clone());
        }
    }

    match &result.outcome {
        Outcome::Fresh(data) => Some(KeySnapshot {
            data: Arc::clone(data),
            fetched_at: result.fetched_at,
            stale: false,
            last_error: None,
            seq: result.seq,
        }),
        Outcome::Failed(error) => current.map(|existing| KeySnapshot {
            stale: true,
            last_error: Some(error.clone()),
            seq: result.seq,
            ..existing.clone()
        }),
    }
}
