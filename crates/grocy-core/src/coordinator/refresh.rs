// ── Refresh cycles ──
//
// Full cycles fetch every active key concurrently and publish once.
// Targeted refreshes fetch a subset and merge it into the current data.
// Either way a failing key is logged and isolated.

use std::sync::Arc;

use chrono::{Local, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use super::Coordinator;
use crate::entity::EntityKey;
use crate::fetch::FetchContext;
use crate::store::{KeyResult, Outcome};

/// A key whose fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyFailure {
    pub key: EntityKey,
    pub error: String,
}

/// What a refresh did, per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<EntityKey>,
    /// Skipped because they were fetched too recently.
    pub throttled: Vec<EntityKey>,
    pub failed: Vec<KeyFailure>,
}

impl RefreshReport {
    fn record(&mut self, result: &KeyResult) {
        match &result.outcome {
            Outcome::Fresh(_) => self.refreshed.push(result.key),
            Outcome::Failed(error) => self.failed.push(KeyFailure {
                key: result.key,
                error: error.clone(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Coordinator {
    pub(crate) fn fetch_context(&self) -> FetchContext {
        FetchContext::new(
            Local::now().naive_local(),
            self.inner.config.due_soon_days,
        )
    }

    /// Run one full cycle over every registered, enabled key.
    ///
    /// Never fails as a whole: keys whose fetch fails keep their previous
    /// data, flagged stale.
    pub async fn refresh(&self) -> RefreshReport {
        let registry = &self.inner.registry;
        let active = registry.active();
        let ctx = self.fetch_context();

        let mut report = RefreshReport::default();
        let mut due = Vec::with_capacity(active.len());
        for key in &active {
            if registry.is_throttled(*key, self.inner.config.min_refresh_interval(*key)) {
                report.throttled.push(*key);
            } else {
                due.push(*key);
            }
        }

        let results = join_all(due.iter().map(|key| self.fetch_key(*key, ctx))).await;
        for result in &results {
            report.record(result);
        }

        // Registrations may have changed while fetches were in flight.
        let published = self
            .inner
            .store
            .publish_cycle(&active, &results, |k| registry.is_active(k));
        debug!(
            cycle = published.cycle,
            keys = published.len(),
            refreshed = report.refreshed.len(),
            throttled = report.throttled.len(),
            failed = report.failed.len(),
            "refresh cycle complete"
        );
        report
    }

    /// Fetch only `keys`, ignoring throttling. Keys that are not
    /// registered and enabled are skipped.
    pub async fn refresh_keys(&self, keys: &[EntityKey]) -> RefreshReport {
        let targets: Vec<EntityKey> = keys
            .iter()
            .copied()
            .filter(|k| self.inner.registry.is_active(*k))
            .collect();
        let mut report = RefreshReport::default();
        if targets.is_empty() {
            return report;
        }

        let ctx = self.fetch_context();
        let results = join_all(targets.iter().map(|key| self.fetch_key(*key, ctx))).await;
        for result in &results {
            report.record(result);
        }
        let registry = &self.inner.registry;
        self.inner
            .store
            .publish_keys(&results, |k| registry.is_active(k));
        debug!(keys = ?targets, "targeted refresh complete");
        report
    }

    /// Fetch a single key under its lock.
    async fn fetch_key(&self, key: EntityKey, ctx: FetchContext) -> KeyResult {
        let _guard = match self.inner.registry.lock(key) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };
        let seq = self.inner.store.next_seq();

        let outcome = match self.inner.access.fetch(key, ctx).await {
            Ok(data) => {
                self.inner.registry.mark_fetched(key);
                Outcome::Fresh(Arc::new(data))
            }
            Err(e) => {
                warn!(%key, error = %e, "fetch failed; keeping previous data");
                Outcome::Failed(e.to_string())
            }
        };

        KeyResult {
            key,
            seq,
            fetched_at: Utc::now(),
            outcome,
        }
    }
}
