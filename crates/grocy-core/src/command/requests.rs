// ── Typed service payloads ──
//
// Each service accepts a fixed JSON object. Numeric fields take numbers or
// numeric strings; unknown fields are rejected so a typo never silently
// falls back to a default.

use chrono::NaiveDateTime;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use grocy_api::models::{GenericEntityType, TransactionType, lenient};

use super::{Command, Service};
use crate::error::CoreError;

// ── Stock ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddProductRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub product_id: i64,
    #[serde(deserialize_with = "lenient::f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenProductRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub product_id: i64,
    #[serde(deserialize_with = "lenient::f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "flag")]
    pub allow_subproduct_substitution: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumeProductRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub product_id: i64,
    #[serde(deserialize_with = "lenient::f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "flag")]
    pub spoiled: bool,
    #[serde(default, deserialize_with = "transaction_type")]
    pub transaction_type: TransactionType,
    #[serde(default, deserialize_with = "flag")]
    pub allow_subproduct_substitution: bool,
}

// ── Chores, tasks, batteries ───────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecuteChoreRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub chore_id: i64,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub done_by: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub tracked_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "flag")]
    pub skipped: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompleteTaskRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub task_id: i64,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub done_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackBatteryRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub battery_id: i64,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub tracked_time: Option<NaiveDateTime>,
}

// ── Generic objects ────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddGenericRequest {
    pub entity_type: GenericEntityType,
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateGenericRequest {
    pub entity_type: GenericEntityType,
    #[serde(deserialize_with = "lenient::i64")]
    pub object_id: i64,
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteGenericRequest {
    pub entity_type: GenericEntityType,
    #[serde(deserialize_with = "lenient::i64")]
    pub object_id: i64,
}

// ── Recipes and shopping list ──────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumeRecipeRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub recipe_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddMissingProductsRequest {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub list_id: Option<i64>,
}

fn default_shopping_list() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveProductRequest {
    #[serde(deserialize_with = "lenient::i64")]
    pub product_id: i64,
    #[serde(default = "default_shopping_list", deserialize_with = "lenient::i64")]
    pub shopping_list_id: i64,
    #[serde(deserialize_with = "lenient::f64")]
    pub amount: f64,
}

// ── Parsing ────────────────────────────────────────────────────────

pub(crate) fn parse(service: Service, payload: Value) -> Result<Command, CoreError> {
    let payload = match payload {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };

    let command = match service {
        Service::AddProductToStock => {
            let r: AddProductRequest = decode(service, payload)?;
            Command::AddProduct {
                product_id: r.product_id,
                amount: r.amount,
                price: r.price,
            }
        }
        Service::OpenProduct => {
            let r: OpenProductRequest = decode(service, payload)?;
            Command::OpenProduct {
                product_id: r.product_id,
                amount: r.amount,
                allow_subproduct_substitution: r.allow_subproduct_substitution,
            }
        }
        Service::ConsumeProductFromStock => {
            let r: ConsumeProductRequest = decode(service, payload)?;
            Command::ConsumeProduct {
                product_id: r.product_id,
                amount: r.amount,
                spoiled: r.spoiled,
                transaction_type: r.transaction_type,
                allow_subproduct_substitution: r.allow_subproduct_substitution,
            }
        }
        Service::ExecuteChore => {
            let r: ExecuteChoreRequest = decode(service, payload)?;
            Command::ExecuteChore {
                chore_id: r.chore_id,
                done_by: r.done_by,
                tracked_time: r.tracked_time,
                skipped: r.skipped,
            }
        }
        Service::CompleteTask => {
            let r: CompleteTaskRequest = decode(service, payload)?;
            Command::CompleteTask {
                task_id: r.task_id,
                done_time: r.done_time,
            }
        }
        Service::TrackBattery => {
            let r: TrackBatteryRequest = decode(service, payload)?;
            Command::TrackBattery {
                battery_id: r.battery_id,
                tracked_time: r.tracked_time,
            }
        }
        Service::AddGeneric => {
            let r: AddGenericRequest = decode(service, payload)?;
            Command::AddGeneric {
                entity_type: r.entity_type,
                data: r.data,
            }
        }
        Service::UpdateGeneric => {
            let r: UpdateGenericRequest = decode(service, payload)?;
            Command::UpdateGeneric {
                entity_type: r.entity_type,
                object_id: r.object_id,
                data: r.data,
            }
        }
        Service::DeleteGeneric => {
            let r: DeleteGenericRequest = decode(service, payload)?;
            Command::DeleteGeneric {
                entity_type: r.entity_type,
                object_id: r.object_id,
            }
        }
        Service::ConsumeRecipe => {
            let r: ConsumeRecipeRequest = decode(service, payload)?;
            Command::ConsumeRecipe {
                recipe_id: r.recipe_id,
            }
        }
        Service::AddMissingProductsToShoppingList => {
            let r: AddMissingProductsRequest = decode(service, payload)?;
            Command::AddMissingProductsToShoppingList { list_id: r.list_id }
        }
        Service::RemoveProductInShoppingList => {
            let r: RemoveProductRequest = decode(service, payload)?;
            Command::RemoveProductInShoppingList {
                product_id: r.product_id,
                shopping_list_id: r.shopping_list_id,
                amount: r.amount,
            }
        }
    };
    Ok(command)
}

fn decode<T: DeserializeOwned>(service: Service, payload: Value) -> Result<T, CoreError> {
    serde_json::from_value(payload)
        .map_err(|e| CoreError::validation(format!("invalid {service} payload: {e}")))
}

// ── Field decoders ─────────────────────────────────────────────────

/// Booleans as JSON bools, `0`/`1`, or `"true"`/`"false"`. Anything else
/// is an error rather than `false`.
fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(d)?;
    match &value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(D::Error::custom(format!("expected a boolean, got {value}"))),
        },
        _ => Err(D::Error::custom(format!("expected a boolean, got {value}"))),
    }
}

/// Accepts `CONSUME`, `consume`, `inventory_correction`, `product-opened`, …
fn transaction_type<'de, D: Deserializer<'de>>(d: D) -> Result<TransactionType, D::Error> {
    let raw = String::deserialize(d)?;
    raw.trim()
        .parse()
        .map_err(|_| D::Error::custom(format!("unknown transaction type {raw:?}")))
}
