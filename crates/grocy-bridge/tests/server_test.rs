#![allow(clippy::unwrap_used)]
// HTTP surface tests: a mock Grocy behind a real coordinator, served on
// an ephemeral port.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use grocy_core::{Coordinator, CoordinatorConfig};

// ── Helpers ─────────────────────────────────────────────────────────

struct TestServer {
    grocy: MockServer,
    base: String,
    client: reqwest::Client,
    coordinator: Coordinator,
    cancel: CancellationToken,
}

impl TestServer {
    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base)
    }

    async fn get(&self, route: &str) -> reqwest::Response {
        self.client.get(self.url(route)).send().await.unwrap()
    }

    async fn post(&self, route: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(route))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    async fn upstream_hits(&self, route: &str) -> usize {
        self.grocy
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }

    async fn stop(self) {
        self.cancel.cancel();
        self.coordinator.shutdown().await;
    }
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Grocy with only the tasks feature and two tasks, a running coordinator
/// and the bridge router on 127.0.0.1:0.
async fn setup() -> TestServer {
    let grocy = MockServer::start().await;
    mount_json(
        &grocy,
        "/api/system/info",
        json!({"grocy_version": {"Version": "4.2.0", "ReleaseDate": "2024-03-01"}}),
    )
    .await;
    mount_json(&grocy, "/api/system/config", json!({"FEATURE_FLAG_TASKS": true})).await;
    mount_json(
        &grocy,
        "/api/tasks",
        json!([
            {"id": 1, "name": "Taxes", "due_date": "2000-01-01"},
            {"id": 2, "name": "Laundry", "due_date": "2999-01-01"}
        ]),
    )
    .await;

    let addr = grocy.address();
    let config = CoordinatorConfig {
        url: format!("http://{}", addr.ip()),
        port: addr.port(),
        api_key: "test-key".to_string().into(),
        poll_interval: Duration::ZERO,
        ..CoordinatorConfig::default()
    };
    let coordinator = Coordinator::new(config).unwrap();
    coordinator.setup().await.unwrap();
    coordinator.start().await.unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let cancel = CancellationToken::new();
    tokio::spawn(grocy_bridge::serve(
        listener,
        coordinator.clone(),
        cancel.clone(),
    ));

    TestServer {
        grocy,
        base: format!("http://127.0.0.1:{port}"),
        client: reqwest::Client::new(),
        coordinator,
        cancel,
    }
}

// ── Picture proxy ───────────────────────────────────────────────────

#[tokio::test]
async fn test_picture_forwards_key_and_filters_headers() {
    let srv = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/files/productpictures/abc.jpg"))
        .and(query_param("force_serve_as", "picture"))
        .and(query_param("best_fit_width", "200"))
        .and(header("GROCY-API-KEY", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .insert_header("cache-control", "max-age=3600")
                .insert_header("x-powered-by", "PHP/8.2")
                .insert_header("set-cookie", "grocy_session=secret")
                .set_body_bytes(b"\xff\xd8jpeg".to_vec()),
        )
        .mount(&srv.grocy)
        .await;

    let resp = srv.get("/api/grocy/productpictures/abc.jpg?width=200").await;

    assert_eq!(resp.status(), 200);
    let headers = resp.headers().clone();
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
    assert_eq!(headers.get("cache-control").unwrap(), "max-age=3600");
    assert!(headers.get("x-powered-by").is_none());
    assert!(headers.get("set-cookie").is_none());
    assert_eq!(resp.bytes().await.unwrap().to_vec(), b"\xff\xd8jpeg".to_vec());
    srv.stop().await;
}

#[tokio::test]
async fn test_picture_width_defaults_to_400() {
    let srv = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/files/recipepictures/cGFuY2FrZXMuanBn"))
        .and(query_param("best_fit_width", "400"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
        .mount(&srv.grocy)
        .await;

    let resp = srv.get("/api/grocy/recipepictures/cGFuY2FrZXMuanBn").await;
    assert_eq!(resp.status(), 200);
    srv.stop().await;
}

#[tokio::test]
async fn test_picture_rejects_non_integer_width() {
    let srv = setup().await;

    let resp = srv.get("/api/grocy/productpictures/abc.jpg?width=wide").await;

    assert_eq!(resp.status(), 400);
    assert_eq!(
        srv.upstream_hits("/api/files/productpictures/abc.jpg").await,
        0
    );
    srv.stop().await;
}

#[tokio::test]
async fn test_picture_upstream_status_passes_through() {
    let srv = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/files/productpictures/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&srv.grocy)
        .await;

    let resp = srv.get("/api/grocy/productpictures/gone.jpg").await;
    assert_eq!(resp.status(), 404);
    srv.stop().await;
}

// ── Views ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_entities_lists_active_keys() {
    let srv = setup().await;

    let body: Vec<Value> = srv.get("/api/entities").await.json().await.unwrap();
    let ids: Vec<&str> = body
        .iter()
        .map(|e| e["entity_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["sensor.grocy_tasks", "binary_sensor.grocy_overdue_tasks"]);

    let tasks: Value = srv.get("/api/entities/tasks").await.json().await.unwrap();
    assert_eq!(tasks["state"], json!(2));
    assert_eq!(tasks["available"], json!(true));

    let overdue: Value = srv
        .get("/api/entities/overdue_tasks")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(overdue["state"], json!(true));
    srv.stop().await;
}

#[tokio::test]
async fn test_unknown_or_unregistered_entity_is_404() {
    let srv = setup().await;
    assert_eq!(srv.get("/api/entities/bogus").await.status(), 404);
    assert_eq!(srv.get("/api/entities/chores").await.status(), 404);
    srv.stop().await;
}

#[tokio::test]
async fn test_todo_list_derives_status() {
    let srv = setup().await;

    let list: Value = srv.get("/api/todo/tasks").await.json().await.unwrap();
    assert_eq!(list["entity_id"], json!("todo.grocy_tasks"));
    let statuses: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["needs_action", "completed"]);
    srv.stop().await;
}

#[tokio::test]
async fn test_health_reports_running() {
    let srv = setup().await;

    let resp = srv.get("/health").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["state"], json!("running"));
    assert_eq!(body["grocy_version"], json!("4.2.0"));
    assert_eq!(body["cycle"], json!(1));
    srv.stop().await;
}

// ── Services ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_service_call_executes_and_refreshes() {
    let srv = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/1/complete"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(204))
        .mount(&srv.grocy)
        .await;
    let before = srv.upstream_hits("/api/tasks").await;

    let resp = srv
        .post("/api/services/complete_task", &json!({"task_id": "1"}))
        .await;

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"result": "ok"}));
    assert!(srv.upstream_hits("/api/tasks").await > before);
    srv.stop().await;
}

#[tokio::test]
async fn test_service_validation_errors_are_400() {
    let srv = setup().await;

    let bad_payload = srv
        .post("/api/services/complete_task", &json!({"task_id": 1, "extra": true}))
        .await;
    assert_eq!(bad_payload.status(), 400);

    let unknown = srv.post("/api/services/make_coffee", &json!({})).await;
    assert_eq!(unknown.status(), 400);

    let read_only = srv
        .post(
            "/api/services/delete_generic",
            &json!({"entity_type": "stock_current_locations", "object_id": 1}),
        )
        .await;
    assert_eq!(read_only.status(), 400);
    srv.stop().await;
}

#[tokio::test]
async fn test_service_remote_failure_is_502() {
    let srv = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/99/complete"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error_message": "Task does not exist"})),
        )
        .mount(&srv.grocy)
        .await;

    let resp = srv
        .post("/api/services/complete_task", &json!({"task_id": 99}))
        .await;

    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Task does not exist"));
    srv.stop().await;
}
