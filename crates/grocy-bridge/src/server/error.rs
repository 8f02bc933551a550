//! Handler errors and their HTTP status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use grocy_core::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Core(err) => core_status(err),
        }
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::ValidationFailed { .. } | CoreError::Unsupported { .. } => {
            StatusCode::BAD_REQUEST
        }
        CoreError::NotAvailable { .. }
        | CoreError::NotRegistered { .. }
        | CoreError::NoData { .. }
        | CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::CoordinatorStopped => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Config { .. } | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::ConnectionFailed { .. }
        | CoreError::AuthenticationFailed { .. }
        | CoreError::Timeout
        | CoreError::Api { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocy_core::EntityKey;

    #[test]
    fn client_errors_are_4xx() {
        let err = ApiError::from(CoreError::ValidationFailed {
            message: "amount must be positive".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(CoreError::NotRegistered {
            key: EntityKey::Stock,
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn remote_failures_are_bad_gateway() {
        let err = ApiError::from(CoreError::Api {
            message: "Product does not exist".into(),
            status: Some(400),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::from(CoreError::Timeout).status(), StatusCode::BAD_GATEWAY);
    }
}
