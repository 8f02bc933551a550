#![allow(clippy::unwrap_used)]
// Integration tests for `Coordinator` against a mock Grocy server.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Local};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use grocy_core::{
    Coordinator, CoordinatorConfig, CoordinatorState, CoreError, EntityData, EntityKey,
    TodoStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Mock server answering `/system/info` and `/system/config` with `flags`.
async fn setup(flags: Value) -> (MockServer, CoordinatorConfig) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/system/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grocy_version": {"Version": "4.2.0", "ReleaseDate": "2024-03-01"},
            "php_version": "8.2.0",
            "sqlite_version": "3.44.0"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/system/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(flags))
        .mount(&server)
        .await;

    let addr = server.address();
    let config = CoordinatorConfig {
        url: format!("http://{}", addr.ip()),
        port: addr.port(),
        api_key: "test-key".to_string().into(),
        poll_interval: Duration::ZERO,
        ..CoordinatorConfig::default()
    };
    (server, config)
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_empty_stock(server: &MockServer) {
    mount_json(server, "/api/stock", json!([])).await;
    mount_json(
        server,
        "/api/stock/volatile",
        json!({"due_products": [], "overdue_products": [], "expired_products": [], "missing_products": []}),
    )
    .await;
}

async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

/// Tasks only, each `/api/tasks` answer held back by `delay`.
async fn slow_tasks(delay: Duration) -> (MockServer, CoordinatorConfig) {
    let (server, mut config) = setup(json!({"FEATURE_FLAG_TASKS": true})).await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1, "name": "Taxes"}]))
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    config.disabled_entities = vec![EntityKey::OverdueTasks];
    (server, config)
}

async fn running(config: CoordinatorConfig) -> Coordinator {
    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();
    coordinator.start().await.unwrap();
    coordinator
}

// ── Setup ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_resolves_feature_flags() {
    let (server, config) =
        setup(json!({"FEATURE_FLAG_STOCK": true, "FEATURE_FLAG_TASKS": false})).await;
    mount_empty_stock(&server).await;

    let coordinator = Coordinator::new(config).unwrap();
    let available = coordinator.setup().await.unwrap();

    assert_eq!(
        available,
        vec![
            EntityKey::Stock,
            EntityKey::MissingProducts,
            EntityKey::ExpiredProducts,
            EntityKey::ExpiringProducts,
            EntityKey::OverdueProducts,
        ]
    );
    let data = coordinator.data();
    assert_eq!(data.keys().count(), 5);
    assert!(!data.contains(EntityKey::Tasks));
    assert_eq!(coordinator.state(), CoordinatorState::Ready);
    assert_eq!(hits(&server, "/api/tasks").await, 0);
}

#[tokio::test]
async fn test_setup_rejects_bad_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/system/info"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let addr = server.address();
    let config = CoordinatorConfig {
        url: format!("http://{}", addr.ip()),
        port: addr.port(),
        api_key: "wrong".to_string().into(),
        ..CoordinatorConfig::default()
    };
    let coordinator = Coordinator::new(config).unwrap();

    let err = coordinator.setup().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(coordinator.state(), CoordinatorState::Failed);
}

#[tokio::test]
async fn test_unreadable_config_leaves_nothing_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/system/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/system/config"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let addr = server.address();
    let config = CoordinatorConfig {
        url: format!("http://{}", addr.ip()),
        port: addr.port(),
        ..CoordinatorConfig::default()
    };
    let coordinator = Coordinator::new(config).unwrap();

    assert!(coordinator.setup().await.unwrap().is_empty());
    assert!(coordinator.data().is_empty());
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_key_keeps_previous_data() {
    let (server, config) =
        setup(json!({"FEATURE_FLAG_TASKS": true, "FEATURE_FLAG_CHORES": "1"})).await;
    mount_json(&server, "/api/tasks", json!([{"id": 1, "name": "Taxes"}])).await;
    mount_json(
        &server,
        "/api/chores",
        json!([{"chore_id": 3, "chore_name": "Vacuum", "next_estimated_execution_time": "2999-01-01 10:00:00"}]),
    )
    .await;
    mount_json(&server, "/api/objects/chores", json!([{"id": 3, "name": "Vacuum"}])).await;

    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();

    // Chores start failing; tasks gain a row.
    server.reset().await;
    mount_json(
        &server,
        "/api/tasks",
        json!([{"id": 1, "name": "Taxes"}, {"id": 2, "name": "Laundry"}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/chores"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error_message": "db locked"})))
        .mount(&server)
        .await;

    let report = coordinator.refresh().await;
    let failed: Vec<EntityKey> = report.failed.iter().map(|f| f.key).collect();
    assert_eq!(failed, vec![EntityKey::Chores, EntityKey::OverdueChores]);

    let data = coordinator.data();
    assert_eq!(data.data(EntityKey::Tasks).unwrap().len(), 2);
    let chores = data.get(EntityKey::Chores).unwrap();
    assert!(chores.stale);
    assert_eq!(chores.data.len(), 1);
    assert!(chores.last_error.as_deref().unwrap().contains("db locked"));
    assert!(!data.get(EntityKey::Tasks).unwrap().stale);
    assert_eq!(data.cycle, 2);
}

#[tokio::test]
async fn test_cycle_and_targeted_refresh_of_same_key_do_not_overlap() {
    let delay = Duration::from_millis(300);
    let (server, config) = slow_tasks(delay).await;
    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();
    assert_eq!(hits(&server, "/api/tasks").await, 1);

    let started = Instant::now();
    let (cycle, targeted) = tokio::join!(
        coordinator.refresh(),
        coordinator.refresh_keys(&[EntityKey::Tasks]),
    );
    let elapsed = started.elapsed();

    assert_eq!(cycle.refreshed, vec![EntityKey::Tasks]);
    assert_eq!(targeted.refreshed, vec![EntityKey::Tasks]);
    assert_eq!(hits(&server, "/api/tasks").await, 3);
    // Two delayed fetches back to back, not side by side.
    assert!(elapsed >= delay * 2, "fetches overlapped: {elapsed:?}");
    assert!(!coordinator.data().get(EntityKey::Tasks).unwrap().stale);
}

#[tokio::test]
async fn test_throttled_key_keeps_cached_value() {
    let (server, mut config) = setup(json!({"FEATURE_FLAG_TASKS": true})).await;
    mount_json(&server, "/api/tasks", json!([{"id": 1, "name": "Taxes"}])).await;
    config.disabled_entities = vec![EntityKey::OverdueTasks];
    config.min_refresh_intervals =
        HashMap::from([(EntityKey::Tasks, Duration::from_secs(300))]);

    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();
    assert_eq!(hits(&server, "/api/tasks").await, 1);
    let first = coordinator.data();

    let report = coordinator.refresh().await;
    assert_eq!(report.throttled, vec![EntityKey::Tasks]);
    assert!(report.refreshed.is_empty());
    assert_eq!(hits(&server, "/api/tasks").await, 1);

    let data = coordinator.data();
    assert_eq!(data.cycle, first.cycle + 1);
    let cached = data.get(EntityKey::Tasks).unwrap();
    assert_eq!(cached.data.len(), 1);
    assert_eq!(
        cached.fetched_at,
        first.get(EntityKey::Tasks).unwrap().fetched_at
    );

    // Targeted refreshes ignore the window.
    let report = coordinator.refresh_keys(&[EntityKey::Tasks]).await;
    assert_eq!(report.refreshed, vec![EntityKey::Tasks]);
    assert_eq!(hits(&server, "/api/tasks").await, 2);
}

#[tokio::test]
async fn test_key_disabled_during_cycle_is_not_republished() {
    let (_server, mut config) = slow_tasks(Duration::from_millis(400)).await;
    config.disabled_entities.clear();
    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();
    assert!(coordinator.data().contains(EntityKey::Tasks));

    let cycle = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.set_enabled(EntityKey::Tasks, false).unwrap();
    assert!(!coordinator.data().contains(EntityKey::Tasks));

    cycle.await.unwrap();
    let data = coordinator.data();
    assert_eq!(coordinator.active_keys(), vec![EntityKey::OverdueTasks]);
    assert!(!data.contains(EntityKey::Tasks));
    assert!(data.contains(EntityKey::OverdueTasks));
}

#[tokio::test]
async fn test_key_unregistered_during_targeted_refresh_is_not_republished() {
    let (_server, config) = slow_tasks(Duration::from_millis(400)).await;
    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();

    let targeted = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.refresh_keys(&[EntityKey::Tasks]).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.unregister(EntityKey::Tasks).unwrap();

    targeted.await.unwrap();
    assert!(!coordinator.data().contains(EntityKey::Tasks));
}

#[tokio::test]
async fn test_yesterdays_date_only_chore_is_overdue() {
    let (server, config) = setup(json!({"FEATURE_FLAG_CHORES": true})).await;
    let yesterday = Local::now().date_naive() - ChronoDuration::days(1);
    mount_json(
        &server,
        "/api/chores",
        json!([{
            "chore_id": "1",
            "chore_name": "Water plants",
            "next_estimated_execution_time": format!("{yesterday} 00:00:00"),
            "track_date_only": "1"
        }]),
    )
    .await;
    mount_json(
        &server,
        "/api/objects/chores",
        json!([{"id": "1", "name": "Water plants", "description": "Balcony"}]),
    )
    .await;

    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();

    let data = coordinator.data();
    match data.data(EntityKey::OverdueChores).unwrap() {
        EntityData::Chores(chores) => assert_eq!(chores.len(), 1),
        other => panic!("unexpected {other:?}"),
    }

    let items = coordinator.todo_items(EntityKey::Chores).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, TodoStatus::NeedsAction);
    assert_eq!(items[0].description.as_deref(), Some("Balcony"));
}

#[tokio::test]
async fn test_meal_plan_filtered_and_sorted() {
    let (server, config) = setup(json!({"FEATURE_FLAG_RECIPES": true})).await;
    let today = Local::now().date_naive();
    let day = |offset: i64| (today + ChronoDuration::days(offset)).to_string();

    Mock::given(method("GET"))
        .and(path("/api/objects/meal_plan"))
        .and(query_param("query[]", format!("day>{}", day(-2))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "day": day(2), "type": "recipe", "recipe_id": 7},
            {"id": 2, "day": day(-3), "type": "note", "note": "stale"},
            {"id": 3, "day": day(-1), "type": "note", "note": "leftovers"},
            {"id": 4, "day": day(0), "type": "recipe", "recipe_id": 7},
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        "/api/objects/recipes",
        json!([{"id": 7, "name": "Pancakes", "picture_file_name": "pancakes.jpg"}]),
    )
    .await;

    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();

    let data = coordinator.data();
    let EntityData::MealPlan(entries) = data.data(EntityKey::MealPlan).unwrap() else {
        panic!("expected meal plan data");
    };
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![3, 4, 1]);
    assert_eq!(entries[1].summary(), "Pancakes");
}

// ── Services ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_consume_product_refreshes_stock_family_only() {
    let (server, config) =
        setup(json!({"FEATURE_FLAG_STOCK": true, "FEATURE_FLAG_CHORES": true})).await;
    mount_empty_stock(&server).await;
    mount_json(&server, "/api/chores", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/stock/products/5/consume"))
        .and(body_json(json!({
            "amount": 2.0,
            "spoiled": false,
            "transaction_type": "consume",
            "allow_subproduct_substitution": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = running(config).await;
    let chores_before = hits(&server, "/api/chores").await;
    let stock_before = hits(&server, "/api/stock").await;
    let volatile_before = hits(&server, "/api/stock/volatile").await;

    coordinator
        .call_service(
            "consume_product",
            json!({"product_id": 5, "amount": 2, "spoiled": false}),
        )
        .await
        .unwrap();

    assert_eq!(hits(&server, "/api/chores").await, chores_before);
    assert_eq!(hits(&server, "/api/stock").await, stock_before + 1);
    // Expiring, expired, overdue and missing products read the volatile view.
    assert_eq!(
        hits(&server, "/api/stock/volatile").await,
        volatile_before + 4
    );
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_read_only_delete_rejected_without_request() {
    let (server, config) = setup(json!({"FEATURE_FLAG_STOCK": true})).await;
    mount_empty_stock(&server).await;
    let coordinator = running(config).await;

    let err = coordinator
        .call_service("delete_generic", json!({"entity_type": "stock", "object_id": 1}))
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    let deletes = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .count();
    assert_eq!(deletes, 0);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_service_failure_is_surfaced() {
    let (server, config) = setup(json!({"FEATURE_FLAG_TASKS": true})).await;
    mount_json(&server, "/api/tasks", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/99/complete"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error_message": "Task does not exist"})))
        .mount(&server)
        .await;

    let coordinator = running(config).await;
    let err = coordinator
        .call_service("complete_task", json!({"task_id": 99}))
        .await
        .unwrap_err();
    match err {
        CoreError::Api { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "Task does not exist");
        }
        other => panic!("unexpected {other:?}"),
    }
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_commands_need_running_coordinator() {
    let (server, config) = setup(json!({"FEATURE_FLAG_TASKS": true})).await;
    mount_json(&server, "/api/tasks", json!([])).await;
    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();

    let err = coordinator
        .call_service("complete_task", json!({"task_id": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::CoordinatorStopped));
}

// ── Todo ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_completing_shopping_item_removes_product() {
    let (server, config) = setup(json!({"FEATURE_FLAG_SHOPPINGLIST": true})).await;
    mount_json(
        &server,
        "/api/objects/shopping_list",
        json!([{"id": 11, "product_id": 4, "amount": "3", "shopping_list_id": "2"}]),
    )
    .await;
    mount_json(&server, "/api/objects/products", json!([{"id": 4, "name": "Eggs"}])).await;
    Mock::given(method("POST"))
        .and(path("/api/stock/shoppinglist/remove-product"))
        .and(body_json(json!({"product_id": 4, "list_id": 2, "product_amount": 3.0})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = running(config).await;
    let items = coordinator.todo_items(EntityKey::ShoppingList).unwrap();
    assert_eq!(items[0].summary, "3.00x Eggs");

    coordinator
        .update_todo_item(EntityKey::ShoppingList, "11", TodoStatus::Completed)
        .await
        .unwrap();
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_disabled_key_is_not_fetched() {
    let (server, mut config) = setup(json!({"FEATURE_FLAG_TASKS": true})).await;
    mount_json(&server, "/api/tasks", json!([])).await;
    config.disabled_entities = vec![EntityKey::OverdueTasks];

    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();

    assert_eq!(coordinator.active_keys(), vec![EntityKey::Tasks]);
    assert_eq!(hits(&server, "/api/tasks").await, 1);
    assert!(!coordinator.data().contains(EntityKey::OverdueTasks));

    coordinator.set_enabled(EntityKey::OverdueTasks, true).unwrap();
    coordinator.refresh().await;
    assert!(coordinator.data().contains(EntityKey::OverdueTasks));
}
