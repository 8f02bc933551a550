// ── Core error types ──
//
// User-facing errors from grocy-core. Consumers never see raw HTTP status
// codes or JSON parse failures directly; the `From<grocy_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::entity::EntityKey;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Grocy at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Grocy request timed out")]
    Timeout,

    #[error("Coordinator is not running")]
    CoordinatorStopped,

    // ── Entity errors ────────────────────────────────────────────────
    #[error("Entity '{key}' is not available on this Grocy instance")]
    NotAvailable { key: EntityKey },

    #[error("Entity '{key}' is not registered")]
    NotRegistered { key: EntityKey },

    #[error("No data for entity '{key}'")]
    NoData { key: EntityKey },

    #[error("Not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} ({reason})")]
    Unsupported { operation: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Grocy API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the server answered).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// `true` when the request was rejected before anything was sent to
    /// Grocy (bad payload, unsupported combination, unknown entity).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed { .. }
                | Self::Unsupported { .. }
                | Self::NotAvailable { .. }
                | Self::NotRegistered { .. }
                | Self::NoData { .. }
                | Self::NotFound { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<grocy_api::Error> for CoreError {
    fn from(err: grocy_api::Error) -> Self {
        match err {
            grocy_api::Error::InvalidApiKey => Self::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            grocy_api::Error::Authentication { message } => Self::AuthenticationFailed { message },
            grocy_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    Self::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            grocy_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid Grocy URL: {e}"),
            },
            grocy_api::Error::Tls(message) => Self::ConnectionFailed {
                url: "<tls>".into(),
                reason: message,
            },
            grocy_api::Error::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            grocy_api::Error::Deserialization { message, .. } => Self::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
