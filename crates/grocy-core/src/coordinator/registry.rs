// ── Entity registry ──
//
// Which keys this Grocy instance offers, which of those the host has
// registered, and whether each registration is enabled. Also owns the
// per-key fetch locks and last-fetch instants used for throttling.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::entity::EntityKey;
use crate::error::CoreError;

/// A registered entity and its administrative flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub key: EntityKey,
    pub enabled: bool,
}

pub(crate) struct Registry {
    available: ArcSwap<Vec<EntityKey>>,
    entries: DashMap<EntityKey, bool>,
    locks: HashMap<EntityKey, Mutex<()>>,
    last_fetch: DashMap<EntityKey, Instant>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            available: ArcSwap::from_pointee(Vec::new()),
            entries: DashMap::new(),
            locks: EntityKey::all().map(|k| (k, Mutex::new(()))).collect(),
            last_fetch: DashMap::new(),
        }
    }

    pub(crate) fn available(&self) -> Arc<Vec<EntityKey>> {
        self.available.load_full()
    }

    /// Replace the available set. Registrations outside it are dropped and
    /// returned.
    pub(crate) fn set_available(&self, keys: Vec<EntityKey>) -> Vec<EntityKey> {
        let dropped: Vec<EntityKey> = self
            .entries
            .iter()
            .map(|e| *e.key())
            .filter(|k| !keys.contains(k))
            .collect();
        for key in &dropped {
            self.entries.remove(key);
            self.last_fetch.remove(key);
        }
        self.available.store(Arc::new(keys));
        dropped
    }

    pub(crate) fn register(&self, key: EntityKey, enabled: bool) -> Result<(), CoreError> {
        if !self.available.load().contains(&key) {
            return Err(CoreError::NotAvailable { key });
        }
        self.entries.entry(key).or_insert(enabled);
        Ok(())
    }

    pub(crate) fn set_enabled(&self, key: EntityKey, enabled: bool) -> Result<(), CoreError> {
        let mut entry = self
            .entries
            .get_mut(&key)
            .ok_or(CoreError::NotRegistered { key })?;
        *entry = enabled;
        Ok(())
    }

    pub(crate) fn unregister(&self, key: EntityKey) -> Result<(), CoreError> {
        self.entries
            .remove(&key)
            .map(|_| {
                self.last_fetch.remove(&key);
            })
            .ok_or(CoreError::NotRegistered { key })
    }

    pub(crate) fn is_registered(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Registrations in available-set order.
    pub(crate) fn registered(&self) -> Vec<Registration> {
        self.available
            .load()
            .iter()
            .filter_map(|key| {
                self.entries.get(key).map(|enabled| Registration {
                    key: *key,
                    enabled: *enabled,
                })
            })
            .collect()
    }

    /// Registered and enabled keys, in available-set order.
    pub(crate) fn active(&self) -> Vec<EntityKey> {
        self.registered()
            .into_iter()
            .filter(|r| r.enabled)
            .map(|r| r.key)
            .collect()
    }

    pub(crate) fn is_active(&self, key: EntityKey) -> bool {
        self.entries.get(&key).is_some_and(|e| *e)
    }

    pub(crate) fn lock(&self, key: EntityKey) -> Option<&Mutex<()>> {
        self.locks.get(&key)
    }

    pub(crate) fn mark_fetched(&self, key: EntityKey) {
        self.last_fetch.insert(key, Instant::now());
    }

    /// `true` when `key` was fetched less than `min_interval` ago.
    pub(crate) fn is_throttled(&self, key: EntityKey, min_interval: std::time::Duration) -> bool {
        !min_interval.is_zero()
            && self
                .last_fetch
                .get(&key)
                .is_some_and(|at| at.elapsed() < min_interval)
    }
}
