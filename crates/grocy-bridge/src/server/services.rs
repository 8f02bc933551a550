//! Service dispatch and todo edits. Everything here goes through the
//! coordinator's command path, so a successful reply means the affected
//! entities were already refreshed.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use grocy_core::{CommandResult, NewTodoItem, Service, TodoStatus};

use super::AppState;
use super::error::ApiError;
use super::views::parse_key;

/// An empty body is an empty payload.
fn parse_payload(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

#[allow(clippy::unused_async)]
pub(super) async fn list() -> Json<Vec<String>> {
    Json(Service::all().map(|s| s.to_string()).collect())
}

pub(super) async fn call(
    State(state): State<AppState>,
    Path(service): Path<String>,
    body: Bytes,
) -> Result<Json<CommandResult>, ApiError> {
    let payload = parse_payload(&body)?;
    debug!(%service, "service call");
    let result = state.coordinator.call_service(&service, payload).await?;
    Ok(Json(result))
}

pub(super) async fn create_todo_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(item): Json<NewTodoItem>,
) -> Result<(StatusCode, Json<CommandResult>), ApiError> {
    let key = parse_key(&key)?;
    let result = state.coordinator.create_todo_item(key, &item).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusUpdate {
    status: TodoStatus,
}

pub(super) async fn update_todo_item(
    State(state): State<AppState>,
    Path((key, uid)): Path<(String, String)>,
    Json(update): Json<StatusUpdate>,
) -> Result<StatusCode, ApiError> {
    let key = parse_key(&key)?;
    state
        .coordinator
        .update_todo_item(key, &uid, update.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteItems {
    uids: Vec<String>,
}

pub(super) async fn delete_todo_items(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(items): Json<DeleteItems>,
) -> Result<StatusCode, ApiError> {
    let key = parse_key(&key)?;
    state.coordinator.delete_todo_items(key, &items.uids).await?;
    Ok(StatusCode::NO_CONTENT)
}
