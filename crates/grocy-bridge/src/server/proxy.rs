// ── Picture proxy ──
//
// Forwards picture requests to Grocy's file endpoint with the API key the
// client already carries. Callers are not authenticated. Only a fixed set
// of response headers is passed back.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{
    CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HeaderName,
};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use grocy_core::CoreError;

use super::AppState;
use super::error::ApiError;

pub const DEFAULT_PICTURE_WIDTH: u32 = 400;

/// Upstream headers copied onto the proxied response.
pub const PASSTHROUGH_HEADERS: [HeaderName; 5] = [
    CACHE_CONTROL,
    CONTENT_DISPOSITION,
    CONTENT_LENGTH,
    CONTENT_TYPE,
    CONTENT_ENCODING,
];

#[derive(Debug, Deserialize)]
pub(super) struct PictureQuery {
    width: Option<String>,
}

fn parse_width(raw: Option<&str>) -> Result<u32, ApiError> {
    match raw {
        None => Ok(DEFAULT_PICTURE_WIDTH),
        Some(w) => w
            .trim()
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("width must be an integer, got '{w}'"))),
    }
}

pub(super) async fn picture(
    State(state): State<AppState>,
    Path((picture_type, filename)): Path<(String, String)>,
    Query(query): Query<PictureQuery>,
) -> Result<Response, ApiError> {
    let width = parse_width(query.width.as_deref())?;
    let upstream = state
        .coordinator
        .client()
        .picture(&picture_type, &filename, width)
        .await
        .map_err(CoreError::from)?;
    debug!(%picture_type, %filename, width, status = %upstream.status, "proxied picture");

    let mut builder = Response::builder().status(upstream.status);
    for name in &PASSTHROUGH_HEADERS {
        if let Some(value) = upstream.headers.get(name) {
            builder = builder.header(name, value.clone());
        }
    }
    builder
        .body(Body::from(upstream.body))
        .map_err(|e| ApiError::Upstream(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_defaults_and_parses() {
        assert!(matches!(parse_width(None), Ok(DEFAULT_PICTURE_WIDTH)));
        assert!(matches!(parse_width(Some("250")), Ok(250)));
    }

    #[test]
    fn non_integer_width_rejected() {
        assert!(matches!(parse_width(Some("wide")), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_width(Some("12.5")), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_width(Some("-3")), Err(ApiError::BadRequest(_))));
    }
}
