//! Read-only views over the latest published data.
#![expect(clippy::unused_async, reason = "axum handlers must be async")]

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

use grocy_core::{CoordinatorState, EntityKey, EntityState, TodoListState};

use super::AppState;
use super::error::ApiError;

pub(super) fn parse_key(raw: &str) -> Result<EntityKey, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("unknown entity '{raw}'")))
}

pub(super) async fn entities(State(state): State<AppState>) -> Json<Vec<EntityState>> {
    Json(state.coordinator.entity_states())
}

pub(super) async fn entity(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntityState>, ApiError> {
    let key = parse_key(&key)?;
    Ok(Json(state.coordinator.entity_state(key)?))
}

pub(super) async fn todo_list(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<TodoListState>, ApiError> {
    let key = parse_key(&key)?;
    Ok(Json(state.coordinator.todo_list(key)?))
}

#[derive(Debug, Serialize)]
pub(super) struct Health {
    state: CoordinatorState,
    #[serde(skip_serializing_if = "Option::is_none")]
    grocy_version: Option<String>,
    cycle: u64,
    refreshed_at: Option<DateTime<Utc>>,
    entities: usize,
    stale: Vec<EntityKey>,
}

/// 200 while the coordinator is serving, 503 otherwise.
pub(super) async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    let coordinator = &state.coordinator;
    let data = coordinator.data();
    let current = coordinator.state();

    let body = Health {
        state: current,
        grocy_version: coordinator
            .system_info()
            .map(|info| info.grocy_version.version.clone()),
        cycle: data.cycle,
        refreshed_at: data.refreshed_at,
        entities: data.len(),
        stale: data
            .iter()
            .filter(|(_, snapshot)| snapshot.stale)
            .map(|(key, _)| key)
            .collect(),
    };
    let status = if matches!(current, CoordinatorState::Running | CoordinatorState::Ready) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
