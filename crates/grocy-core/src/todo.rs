// ── Todo lists ──
//
// Derives todo items from fetched records and turns todo edits into
// service commands. Grocy has no done flag for most of these records, so
// status comes from due-date arithmetic: anything due today or earlier
// needs action.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString};

use grocy_api::models::{Due, GenericEntityType, TransactionType};

use crate::command::Command;
use crate::entity::EntityKey;
use crate::error::CoreError;
use crate::store::EntityData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TodoStatus {
    NeedsAction,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoItem {
    pub uid: String,
    pub summary: String,
    pub status: TodoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<Due>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fields for a new todo item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTodoItem {
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due: Option<NaiveDate>,
}

/// Needs action when the due value is less than one day away. A missing due
/// value counts as zero days.
pub fn status_for(due: Option<Due>, now: NaiveDateTime) -> TodoStatus {
    let days = due.map_or(0, |d| d.days_until(now));
    if days < 1 {
        TodoStatus::NeedsAction
    } else {
        TodoStatus::Completed
    }
}

fn by_amount(amount: f64) -> TodoStatus {
    if amount > 0.0 {
        TodoStatus::NeedsAction
    } else {
        TodoStatus::Completed
    }
}

/// Todo items for `key`. Keys without a todo list yield nothing.
pub fn items(key: EntityKey, data: &EntityData, now: NaiveDateTime) -> Vec<TodoItem> {
    if !key.has_todo_list() {
        return Vec::new();
    }

    match data {
        EntityData::Batteries(batteries) => batteries
            .iter()
            .map(|b| {
                let due = b.due().map(Due::to_date_only);
                TodoItem {
                    uid: b.id.to_string(),
                    summary: b.name(),
                    status: status_for(due, now),
                    due,
                    description: b.description().map(str::to_owned),
                }
            })
            .collect(),
        EntityData::Chores(chores) => chores
            .iter()
            .map(|c| {
                let due = c.due();
                TodoItem {
                    uid: c.id.to_string(),
                    summary: c.name.clone(),
                    status: status_for(due, now),
                    due,
                    description: c.description.clone(),
                }
            })
            .collect(),
        EntityData::MealPlan(entries) => entries
            .iter()
            .map(|m| {
                let due = Some(m.due());
                TodoItem {
                    uid: m.id.to_string(),
                    summary: m.summary(),
                    status: status_for(due, now),
                    due,
                    description: m.recipe.as_ref().and_then(|r| r.description.clone()),
                }
            })
            .collect(),
        EntityData::ShoppingList(list) => list
            .iter()
            .map(|item| TodoItem {
                uid: item.id.to_string(),
                summary: format!("{:.2}x {}", item.amount, item.product_name()),
                status: by_amount(item.amount),
                due: None,
                description: item.note.clone(),
            })
            .collect(),
        EntityData::Stock(stock) => stock
            .iter()
            .map(|entry| TodoItem {
                uid: entry.product_id.to_string(),
                summary: format!("{:.2}x {}", entry.available_amount(), entry.name()),
                status: by_amount(entry.available_amount()),
                due: entry.best_before_date.map(Due::Date),
                description: entry.product.as_ref().and_then(|p| p.description.clone()),
            })
            .collect(),
        EntityData::Tasks(tasks) => tasks
            .iter()
            .map(|t| {
                let due = t.due();
                TodoItem {
                    uid: t.id.to_string(),
                    summary: t.name.clone(),
                    status: status_for(due, now),
                    due,
                    description: t.description.clone(),
                }
            })
            .collect(),
        EntityData::Products(_) | EntityData::MissingProducts(_) | EntityData::Equipment(_) => {
            Vec::new()
        }
    }
}

// ── Edits ────────────────────────────────────────────────────────────

fn unsupported(key: EntityKey, operation: &str) -> CoreError {
    CoreError::Unsupported {
        operation: format!("{operation} on {key} todo list"),
        reason: "Grocy has no matching operation".into(),
    }
}

fn parse_uid(uid: &str) -> Result<i64, CoreError> {
    uid.trim()
        .parse()
        .map_err(|_| CoreError::validation(format!("todo item uid {uid:?} is not a Grocy id")))
}

/// Command that creates a todo item on `key`'s list.
pub fn create_command(
    key: EntityKey,
    item: &NewTodoItem,
    today: NaiveDate,
) -> Result<Command, CoreError> {
    if item.summary.trim().is_empty() {
        return Err(CoreError::validation("todo item summary is empty"));
    }
    let (entity_type, data) = match key {
        EntityKey::Batteries => (
            GenericEntityType::Batteries,
            json!({
                "name": item.summary,
                "description": item.description.as_deref().unwrap_or("generic"),
                "used_in": "generic",
                "charge_interval_days": "0",
            }),
        ),
        EntityKey::Chores => (
            GenericEntityType::Chores,
            json!({
                "name": item.summary,
                "description": item.description.as_deref().unwrap_or_default(),
                "period_type": "manually",
                "period_days": 0,
            }),
        ),
        EntityKey::Tasks => (
            GenericEntityType::Tasks,
            json!({
                "name": item.summary,
                "description": item.description.as_deref().unwrap_or_default(),
                "due_date": item.due.unwrap_or(today).format("%Y-%m-%d").to_string(),
            }),
        ),
        _ => return Err(unsupported(key, "create")),
    };
    Ok(Command::AddGeneric { entity_type, data })
}

/// Commands that move item `uid` to `status`. Only completion is
/// supported; `data` is the key's current records.
pub fn update_commands(
    key: EntityKey,
    uid: &str,
    status: TodoStatus,
    data: &EntityData,
) -> Result<Vec<Command>, CoreError> {
    if status == TodoStatus::NeedsAction {
        return Err(CoreError::Unsupported {
            operation: format!("reopen item on {key} todo list"),
            reason: "Grocy cannot revert a completed action".into(),
        });
    }
    let id = parse_uid(uid)?;
    let not_found = || CoreError::NotFound {
        entity_type: key.to_string(),
        identifier: uid.to_owned(),
    };

    let commands = match data {
        EntityData::Batteries(_) if key == EntityKey::Batteries => vec![Command::TrackBattery {
            battery_id: id,
            tracked_time: None,
        }],
        EntityData::Chores(_) if key == EntityKey::Chores => vec![Command::ExecuteChore {
            chore_id: id,
            done_by: None,
            tracked_time: None,
            skipped: false,
        }],
        EntityData::Tasks(_) if key == EntityKey::Tasks => vec![Command::CompleteTask {
            task_id: id,
            done_time: None,
        }],
        EntityData::MealPlan(entries) => {
            let entry = entries.iter().find(|m| m.id == id).ok_or_else(not_found)?;
            let mut commands = Vec::with_capacity(2);
            if let Some(recipe_id) = entry.recipe_id {
                commands.push(Command::ConsumeRecipe { recipe_id });
            }
            commands.push(Command::DeleteGeneric {
                entity_type: GenericEntityType::MealPlan,
                object_id: id,
            });
            commands
        }
        EntityData::ShoppingList(list) => {
            let item = list.iter().find(|i| i.id == id).ok_or_else(not_found)?;
            let product_id = item.product_id.ok_or_else(|| CoreError::Unsupported {
                operation: "complete shopping list note".into(),
                reason: "item has no product".into(),
            })?;
            vec![Command::RemoveProductInShoppingList {
                product_id,
                shopping_list_id: item.shopping_list_id,
                amount: item.amount,
            }]
        }
        EntityData::Stock(stock) => {
            let entry = stock
                .iter()
                .find(|e| e.product_id == id)
                .ok_or_else(not_found)?;
            vec![Command::ConsumeProduct {
                product_id: id,
                amount: entry.available_amount(),
                spoiled: false,
                transaction_type: TransactionType::Consume,
                allow_subproduct_substitution: false,
            }]
        }
        _ => return Err(unsupported(key, "complete")),
    };
    Ok(commands)
}

/// Commands that delete `uids` from `key`'s list.
pub fn delete_commands(key: EntityKey, uids: &[String]) -> Result<Vec<Command>, CoreError> {
    let entity_type = key
        .generic_entity_type()
        .filter(|_| key.has_todo_list())
        .ok_or_else(|| unsupported(key, "delete"))?;
    uids.iter()
        .map(|uid| {
            let command = Command::DeleteGeneric {
                entity_type,
                object_id: parse_uid(uid)?,
            };
            command.validate()?;
            Ok(command)
        })
        .collect()
}
