// ── Data access layer ──
//
// One fetch per entity key, dispatched from an enum-indexed table of
// plain async functions over a shared client. `DataAccess` bounds how
// many Grocy requests run at once.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

use grocy_api::models::{Battery, Chore, MealPlanEntry, Task};
use grocy_api::{GrocyClient, QueryFilter};

use crate::entity::EntityKey;
use crate::error::CoreError;
use crate::store::EntityData;

/// Inputs every fetch is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct FetchContext {
    /// Local wall-clock time, as Grocy records it.
    pub now: NaiveDateTime,
    pub due_soon_days: u32,
}

impl FetchContext {
    pub fn new(now: NaiveDateTime, due_soon_days: u32) -> Self {
        Self { now, due_soon_days }
    }
}

/// Shared client plus the permit pool every remote call draws from.
#[derive(Clone)]
pub struct DataAccess {
    client: GrocyClient,
    permits: Arc<Semaphore>,
}

impl DataAccess {
    pub fn new(client: GrocyClient, max_concurrent_requests: usize) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    pub fn client(&self) -> &GrocyClient {
        &self.client
    }

    /// Wait for a free request slot.
    pub(crate) async fn permit(&self) -> Result<SemaphorePermit<'_>, CoreError> {
        self.permits
            .acquire()
            .await
            .map_err(|_| CoreError::CoordinatorStopped)
    }

    /// Fetch one key while holding a request slot.
    pub async fn fetch(&self, key: EntityKey, ctx: FetchContext) -> Result<EntityData, CoreError> {
        let _permit = self.permit().await?;
        debug!(%key, "fetching");
        fetch(&self.client, key, ctx).await
    }
}

/// Fetch the records behind `key`. Errors propagate unchanged so the
/// caller can decide how to classify them.
pub async fn fetch(
    client: &GrocyClient,
    key: EntityKey,
    ctx: FetchContext,
) -> Result<EntityData, CoreError> {
    let data = match key {
        EntityKey::Stock => EntityData::Stock(client.stock().await?),
        EntityKey::Chores => EntityData::Chores(client.chores(&[], true).await?),
        EntityKey::OverdueChores => {
            EntityData::Chores(overdue_chores(client.chores(&[], false).await?, ctx.now))
        }
        EntityKey::Tasks => EntityData::Tasks(client.tasks(&[]).await?),
        EntityKey::OverdueTasks => {
            EntityData::Tasks(overdue_tasks(client.tasks(&[]).await?, ctx.now))
        }
        EntityKey::ShoppingList => EntityData::ShoppingList(client.shopping_list(true).await?),
        EntityKey::ExpiringProducts => EntityData::Products(
            client.volatile_stock(ctx.due_soon_days).await?.due_products,
        ),
        EntityKey::ExpiredProducts => EntityData::Products(
            client
                .volatile_stock(ctx.due_soon_days)
                .await?
                .expired_products,
        ),
        EntityKey::OverdueProducts => EntityData::Products(
            client
                .volatile_stock(ctx.due_soon_days)
                .await?
                .overdue_products,
        ),
        EntityKey::MissingProducts => EntityData::MissingProducts(
            client
                .volatile_stock(ctx.due_soon_days)
                .await?
                .missing_products,
        ),
        EntityKey::MealPlan => {
            let filter = meal_plan_filter(ctx.now);
            let entries = client.meal_plan(&[filter], true).await?;
            EntityData::MealPlan(upcoming_meals(entries, ctx.now))
        }
        EntityKey::Batteries => EntityData::Batteries(client.batteries(&[], true).await?),
        EntityKey::OverdueBatteries => EntityData::Batteries(overdue_batteries(
            client.batteries(&[], true).await?,
            ctx.now,
        )),
        EntityKey::Equipment => EntityData::Equipment(client.equipment().await?),
    };
    debug!(%key, records = data.len(), "fetched");
    Ok(data)
}

// ── Overdue filters ──────────────────────────────────────────────────

pub fn overdue_chores(chores: Vec<Chore>, now: NaiveDateTime) -> Vec<Chore> {
    chores
        .into_iter()
        .filter(|c| c.due().is_some_and(|d| d.is_overdue(now)))
        .collect()
}

pub fn overdue_tasks(tasks: Vec<Task>, now: NaiveDateTime) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| t.due().is_some_and(|d| d.is_overdue(now)))
        .collect()
}

pub fn overdue_batteries(batteries: Vec<Battery>, now: NaiveDateTime) -> Vec<Battery> {
    batteries
        .into_iter()
        .filter(|b| b.due().is_some_and(|d| d.is_overdue(now)))
        .collect()
}

// ── Meal plan window ─────────────────────────────────────────────────

/// Server-side lower bound: strictly after the day before yesterday.
fn meal_plan_filter(now: NaiveDateTime) -> QueryFilter {
    let bound = now.date() - ChronoDuration::days(2);
    QueryFilter::gt("day", bound.format("%Y-%m-%d").to_string())
}

/// Keep entries from yesterday onward, ordered by day.
pub fn upcoming_meals(entries: Vec<MealPlanEntry>, now: NaiveDateTime) -> Vec<MealPlanEntry> {
    let yesterday = now.date() - ChronoDuration::days(1);
    let mut kept: Vec<MealPlanEntry> = entries
        .into_iter()
        .filter(|e| e.day >= yesterday)
        .collect();
    kept.sort_by_key(|e| e.day);
    kept
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn chore(id: i64, next: Option<&str>, date_only: bool) -> Chore {
        Chore {
            id,
            name: format!("chore {id}"),
            description: None,
            last_tracked_time: None,
            next_estimated_execution_time: next.map(at),
            track_date_only: date_only,
            next_execution_assigned_to_user_id: None,
            is_rescheduled: false,
        }
    }

    fn meal(id: i64, day: &str) -> MealPlanEntry {
        MealPlanEntry {
            id,
            day: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            entry_type: Some("recipe".into()),
            recipe_id: None,
            recipe_servings: None,
            note: None,
            product_id: None,
            section_id: None,
            done: false,
            recipe: None,
        }
    }

    #[test]
    fn overdue_is_strictly_before_now() {
        let now = at("2024-06-10 12:00:00");
        let chores = vec![
            chore(1, Some("2024-06-10 11:59:59"), false),
            chore(2, Some("2024-06-10 12:00:00"), false),
            chore(3, None, false),
            chore(4, Some("2024-06-09 00:00:00"), true),
            chore(5, Some("2024-06-10 00:00:00"), true),
        ];
        let ids: Vec<i64> = overdue_chores(chores, now).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn date_only_tasks_compare_against_today() {
        let now = at("2024-06-10 08:00:00");
        let task = |id, due: Option<&str>| Task {
            id,
            name: String::new(),
            description: None,
            due_date: due.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            done: false,
            category_id: None,
            assigned_to_user_id: None,
        };
        let tasks = vec![
            task(1, Some("2024-06-09")),
            task(2, Some("2024-06-10")),
            task(3, None),
        ];
        let ids: Vec<i64> = overdue_tasks(tasks, now).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn meal_plan_keeps_yesterday_onward_sorted() {
        let now = at("2024-06-10 09:00:00");
        let kept = upcoming_meals(
            vec![
                meal(1, "2024-06-12"),
                meal(2, "2024-06-08"),
                meal(3, "2024-06-09"),
                meal(4, "2024-06-10"),
            ],
            now,
        );
        let ids: Vec<i64> = kept.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 4, 1]);
    }

    #[test]
    fn meal_plan_filter_starts_two_days_back() {
        let filter = meal_plan_filter(at("2024-06-10 09:00:00"));
        assert_eq!(filter.to_string(), "day>2024-06-08");
    }
}
