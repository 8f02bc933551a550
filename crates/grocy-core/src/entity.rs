// ── Entity keys ──
//
// Fixed identifiers for each category of Grocy data the bridge exposes,
// plus the static presentation table (names, icons, units) for each.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use grocy_api::models::GenericEntityType;

/// One category of remote data.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKey {
    Stock,
    Chores,
    OverdueChores,
    Tasks,
    OverdueTasks,
    ShoppingList,
    ExpiringProducts,
    ExpiredProducts,
    OverdueProducts,
    MissingProducts,
    MealPlan,
    Batteries,
    OverdueBatteries,
    Equipment,
}

/// How an entity presents its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    /// State is the record count.
    Sensor,
    /// State is "on" while the list is non-empty.
    BinarySensor,
}

/// Keys derived from current stock levels; any stock movement changes them.
pub const STOCK_KEYS: &[EntityKey] = &[
    EntityKey::Stock,
    EntityKey::ExpiringProducts,
    EntityKey::ExpiredProducts,
    EntityKey::OverdueProducts,
    EntityKey::MissingProducts,
];

impl EntityKey {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn kind(self) -> EntityKind {
        match self {
            Self::OverdueChores
            | Self::OverdueTasks
            | Self::ExpiringProducts
            | Self::ExpiredProducts
            | Self::OverdueProducts
            | Self::MissingProducts
            | Self::OverdueBatteries => EntityKind::BinarySensor,
            Self::Stock
            | Self::Chores
            | Self::Tasks
            | Self::ShoppingList
            | Self::MealPlan
            | Self::Batteries
            | Self::Equipment => EntityKind::Sensor,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stock => "Grocy stock",
            Self::Chores => "Grocy chores",
            Self::OverdueChores => "Grocy overdue chores",
            Self::Tasks => "Grocy tasks",
            Self::OverdueTasks => "Grocy overdue tasks",
            Self::ShoppingList => "Grocy shopping list",
            Self::ExpiringProducts => "Grocy expiring products",
            Self::ExpiredProducts => "Grocy expired products",
            Self::OverdueProducts => "Grocy overdue products",
            Self::MissingProducts => "Grocy missing products",
            Self::MealPlan => "Grocy meal plan",
            Self::Batteries => "Grocy batteries",
            Self::OverdueBatteries => "Grocy overdue batteries",
            Self::Equipment => "Grocy equipment",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Stock => "mdi:fridge-outline",
            Self::Chores => "mdi:broom",
            Self::Tasks => "mdi:checkbox-marked-circle-outline",
            Self::ShoppingList => "mdi:cart-outline",
            Self::MealPlan => "mdi:silverware-variant",
            Self::Batteries => "mdi:battery",
            Self::Equipment => "mdi:tools",
            Self::ExpiredProducts => "mdi:delete-alert-outline",
            Self::ExpiringProducts => "mdi:clock-fast",
            Self::MissingProducts => "mdi:flask-round-bottom-empty-outline",
            Self::OverdueBatteries => "mdi:battery-charging-10",
            Self::OverdueChores | Self::OverdueTasks | Self::OverdueProducts => {
                "mdi:alert-circle-check-outline"
            }
        }
    }

    /// Unit of measurement for count sensors.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::Stock | Self::ShoppingList => Some("Product(s)"),
            Self::Chores => Some("Chore(s)"),
            Self::Tasks => Some("Task(s)"),
            Self::MealPlan => Some("Meal(s)"),
            Self::Batteries => Some("Battery/Batteries"),
            Self::Equipment => Some("Item(s)"),
            _ => None,
        }
    }

    /// Whether a todo list is exposed for this key.
    pub fn has_todo_list(self) -> bool {
        matches!(
            self,
            Self::Batteries
                | Self::Chores
                | Self::MealPlan
                | Self::ShoppingList
                | Self::Stock
                | Self::Tasks
        )
    }

    /// Generic entity type that backs this key's records, used for todo
    /// deletes. `stock` maps to Grocy's read-only stock view.
    pub fn generic_entity_type(self) -> Option<GenericEntityType> {
        match self {
            Self::Batteries => Some(GenericEntityType::Batteries),
            Self::Chores => Some(GenericEntityType::Chores),
            Self::MealPlan => Some(GenericEntityType::MealPlan),
            Self::ShoppingList => Some(GenericEntityType::ShoppingList),
            Self::Stock => Some(GenericEntityType::Stock),
            Self::Tasks => Some(GenericEntityType::Tasks),
            Self::Equipment => Some(GenericEntityType::Equipment),
            _ => None,
        }
    }

    /// Keys whose data reflects objects of a generic entity type; these are
    /// refreshed after a generic add/update/delete.
    pub fn affected_by(entity_type: GenericEntityType) -> &'static [Self] {
        match entity_type {
            GenericEntityType::Chores => &[Self::Chores, Self::OverdueChores],
            GenericEntityType::Tasks => &[Self::Tasks, Self::OverdueTasks],
            GenericEntityType::Batteries => &[Self::Batteries, Self::OverdueBatteries],
            GenericEntityType::ShoppingList => &[Self::ShoppingList],
            GenericEntityType::MealPlan | GenericEntityType::Recipes => &[Self::MealPlan],
            GenericEntityType::Products => STOCK_KEYS,
            GenericEntityType::Equipment => &[Self::Equipment],
            _ => &[],
        }
    }
}
