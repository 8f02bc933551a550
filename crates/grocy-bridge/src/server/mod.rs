// ── HTTP server ──
//
// axum router over one coordinator. Handlers only read published data or
// go through the coordinator's command path; none of them talk to Grocy
// directly except the picture proxy.

mod error;
mod proxy;
mod services;
mod views;

use axum::Router;
use axum::routing::{get, post, put};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use grocy_core::Coordinator;

pub use error::ApiError;
pub use proxy::{DEFAULT_PICTURE_WIDTH, PASSTHROUGH_HEADERS};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
}

/// Build the router for `coordinator`.
pub fn router(coordinator: Coordinator) -> Router {
    Router::new()
        .route(
            "/api/grocy/{picture_type}/{filename}",
            get(proxy::picture),
        )
        .route("/api/entities", get(views::entities))
        .route("/api/entities/{key}", get(views::entity))
        .route(
            "/api/todo/{key}",
            get(views::todo_list)
                .post(services::create_todo_item)
                .delete(services::delete_todo_items),
        )
        .route("/api/todo/{key}/{uid}", put(services::update_todo_item))
        .route("/api/services", get(services::list))
        .route("/api/services/{service}", post(services::call))
        .route("/health", get(views::health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { coordinator })
}

/// Serve until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    coordinator: Coordinator,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }
    axum::serve(listener, router(coordinator))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
