// ── Command API ──
//
// Every write against Grocy flows through the `Command` enum. Services
// named by the host are parsed into commands; the coordinator routes each
// variant to exactly one mutating client call, then refreshes the keys
// the command affects.

pub mod requests;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use grocy_api::models::{GenericEntityType, TransactionType};

use crate::entity::{EntityKey, STOCK_KEYS};
use crate::error::CoreError;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// Named service actions accepted from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Service {
    #[strum(to_string = "add_product_to_stock", serialize = "add_product")]
    AddProductToStock,
    OpenProduct,
    #[strum(to_string = "consume_product_from_stock", serialize = "consume_product")]
    ConsumeProductFromStock,
    ExecuteChore,
    CompleteTask,
    AddGeneric,
    UpdateGeneric,
    DeleteGeneric,
    ConsumeRecipe,
    TrackBattery,
    AddMissingProductsToShoppingList,
    RemoveProductInShoppingList,
}

impl Service {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// All write operations the bridge can perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Stock ────────────────────────────────────────────────────────
    AddProduct {
        product_id: i64,
        amount: f64,
        price: Option<f64>,
    },
    OpenProduct {
        product_id: i64,
        amount: f64,
        allow_subproduct_substitution: bool,
    },
    ConsumeProduct {
        product_id: i64,
        amount: f64,
        spoiled: bool,
        transaction_type: TransactionType,
        allow_subproduct_substitution: bool,
    },

    // ── Chores, tasks, batteries ─────────────────────────────────────
    ExecuteChore {
        chore_id: i64,
        done_by: Option<i64>,
        tracked_time: Option<NaiveDateTime>,
        skipped: bool,
    },
    CompleteTask {
        task_id: i64,
        done_time: Option<NaiveDateTime>,
    },
    TrackBattery {
        battery_id: i64,
        tracked_time: Option<NaiveDateTime>,
    },

    // ── Generic objects ──────────────────────────────────────────────
    AddGeneric {
        entity_type: GenericEntityType,
        data: Value,
    },
    UpdateGeneric {
        entity_type: GenericEntityType,
        object_id: i64,
        data: Value,
    },
    DeleteGeneric {
        entity_type: GenericEntityType,
        object_id: i64,
    },

    // ── Recipes and shopping list ────────────────────────────────────
    ConsumeRecipe {
        recipe_id: i64,
    },
    AddMissingProductsToShoppingList {
        list_id: Option<i64>,
    },
    RemoveProductInShoppingList {
        product_id: i64,
        shopping_list_id: i64,
        amount: f64,
    },
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    Ok,
    Created { object_id: Option<i64> },
}

impl Command {
    /// Parse a named service call. A `null` payload is treated as `{}`.
    pub fn from_service(service: Service, payload: Value) -> Result<Self, CoreError> {
        let command = requests::parse(service, payload)?;
        command.validate()?;
        Ok(command)
    }

    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddProduct { .. } => "add_product",
            Self::OpenProduct { .. } => "open_product",
            Self::ConsumeProduct { .. } => "consume_product",
            Self::ExecuteChore { .. } => "execute_chore",
            Self::CompleteTask { .. } => "complete_task",
            Self::TrackBattery { .. } => "track_battery",
            Self::AddGeneric { .. } => "add_generic",
            Self::UpdateGeneric { .. } => "update_generic",
            Self::DeleteGeneric { .. } => "delete_generic",
            Self::ConsumeRecipe { .. } => "consume_recipe",
            Self::AddMissingProductsToShoppingList { .. } => "add_missing_products_to_shopping_list",
            Self::RemoveProductInShoppingList { .. } => "remove_product_in_shopping_list",
        }
    }

    /// Keys whose data may change once this command succeeds.
    pub fn affected_keys(&self) -> &'static [EntityKey] {
        match self {
            Self::AddProduct { .. } | Self::OpenProduct { .. } | Self::ConsumeProduct { .. } => {
                STOCK_KEYS
            }
            Self::ExecuteChore { .. } => &[EntityKey::Chores, EntityKey::OverdueChores],
            Self::CompleteTask { .. } => &[EntityKey::Tasks, EntityKey::OverdueTasks],
            Self::TrackBattery { .. } => &[EntityKey::Batteries, EntityKey::OverdueBatteries],
            Self::AddGeneric { entity_type, .. }
            | Self::UpdateGeneric { entity_type, .. }
            | Self::DeleteGeneric { entity_type, .. } => EntityKey::affected_by(*entity_type),
            Self::ConsumeRecipe { .. } => &[
                EntityKey::MealPlan,
                EntityKey::Stock,
                EntityKey::ExpiringProducts,
                EntityKey::ExpiredProducts,
                EntityKey::OverdueProducts,
                EntityKey::MissingProducts,
            ],
            Self::AddMissingProductsToShoppingList { .. }
            | Self::RemoveProductInShoppingList { .. } => &[EntityKey::ShoppingList],
        }
    }

    /// Reject commands Grocy cannot perform, before anything is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::AddProduct { amount, .. }
            | Self::OpenProduct { amount, .. }
            | Self::ConsumeProduct { amount, .. }
            | Self::RemoveProductInShoppingList { amount, .. } => positive("amount", *amount),
            Self::AddGeneric { entity_type, data } => {
                require_capability(*entity_type, "add", entity_type.capabilities().create)?;
                require_object(data)
            }
            Self::UpdateGeneric {
                entity_type, data, ..
            } => {
                require_capability(*entity_type, "update", entity_type.capabilities().update)?;
                require_object(data)
            }
            Self::DeleteGeneric { entity_type, .. } => {
                require_capability(*entity_type, "delete", entity_type.capabilities().delete)
            }
            _ => Ok(()),
        }
    }
}

fn positive(field: &str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

fn require_capability(
    entity_type: GenericEntityType,
    operation: &str,
    allowed: bool,
) -> Result<(), CoreError> {
    if allowed {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "entity type '{entity_type}' does not support {operation}"
        )))
    }
}

fn require_object(data: &Value) -> Result<(), CoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(CoreError::validation("data must be a JSON object"))
    }
}
