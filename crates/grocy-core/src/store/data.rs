use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use grocy_api::models::{
    Battery, Chore, Equipment, MealPlanEntry, MissingProduct, ShoppingListItem, StockEntry, Task,
};

use crate::entity::EntityKey;

/// The records fetched for one entity key.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityData {
    Stock(Vec<StockEntry>),
    /// Expiring, expired or overdue products.
    Products(Vec<StockEntry>),
    MissingProducts(Vec<MissingProduct>),
    Chores(Vec<Chore>),
    Tasks(Vec<Task>),
    ShoppingList(Vec<ShoppingListItem>),
    MealPlan(Vec<MealPlanEntry>),
    Batteries(Vec<Battery>),
    Equipment(Vec<Equipment>),
}

impl EntityData {
    pub fn len(&self) -> usize {
        match self {
            Self::Stock(v) | Self::Products(v) => v.len(),
            Self::MissingProducts(v) => v.len(),
            Self::Chores(v) => v.len(),
            Self::Tasks(v) => v.len(),
            Self::ShoppingList(v) => v.len(),
            Self::MealPlan(v) => v.len(),
            Self::Batteries(v) => v.len(),
            Self::Equipment(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The latest value held for one key.
#[derive(Debug, Clone)]
pub struct KeySnapshot {
    pub data: Arc<EntityData>,
    /// When `data` was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Set when the most recent fetch for this key failed and `data` is
    /// left over from an earlier one.
    pub stale: bool,
    pub last_error: Option<String>,
    pub(crate) seq: u64,
}

/// An immutable, published view of every key's latest data.
///
/// Readers hold an `Arc<CoordinatorData>`; each publish replaces the
/// whole value, so a reader never sees half of a cycle.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorData {
    pub(crate) entries: BTreeMap<EntityKey, KeySnapshot>,
    /// Number of completed refresh cycles.
    pub cycle: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl CoordinatorData {
    pub fn get(&self, key: EntityKey) -> Option<&KeySnapshot> {
        self.entries.get(&key)
    }

    /// Records for `key`, or `None` when nothing was ever fetched.
    pub fn data(&self, key: EntityKey) -> Option<&EntityData> {
        self.entries.get(&key).map(|s| s.data.as_ref())
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &KeySnapshot)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
