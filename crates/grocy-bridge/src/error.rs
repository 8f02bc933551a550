//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use grocy_config::ConfigError;
use grocy_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code, unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to Grocy at {url}")]
    #[diagnostic(
        code(grocy::connection_failed),
        help(
            "Check that Grocy is running and reachable.\n\
             Reason: {reason}\n\
             Try: grocy-bridge check --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to Grocy timed out")]
    #[diagnostic(
        code(grocy::timeout),
        help("Increase the timeout with --timeout or check Grocy's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(grocy::auth_failed),
        help(
            "Verify the API key under Manage API keys in Grocy.\n\
             Store a new one with: grocy-bridge config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(grocy::no_credentials),
        help(
            "Configure one with: grocy-bridge config init\n\
             Or set the GROCY_BRIDGE_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Entities ─────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(grocy::not_found),
        help("Run: grocy-bridge {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No data for '{key}'")]
    #[diagnostic(
        code(grocy::no_data),
        help("The last fetch for this entity failed. Re-run with -v for details.")
    )]
    NoData { key: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Grocy API error ({status}): {message}")]
    #[diagnostic(code(grocy::api_error))]
    ApiError { status: String, message: String },

    #[error("Operation not supported: {operation}")]
    #[diagnostic(code(grocy::unsupported), help("{reason}"))]
    Unsupported { operation: String, reason: String },

    #[error("Coordinator stopped before the command completed")]
    #[diagnostic(code(grocy::stopped))]
    Stopped,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(grocy::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(grocy::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: grocy-bridge config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No Grocy server configured")]
    #[diagnostic(
        code(grocy::no_config),
        help(
            "Create a config with: grocy-bridge config init\n\
             Or pass --url and --api-key.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(grocy::config))]
    Config { message: String },

    #[error("Keyring error: {reason}")]
    #[diagnostic(
        code(grocy::keyring),
        help("Set api_key or api_key_env in the profile instead.")
    )]
    Keyring { reason: String },

    // ── Server ───────────────────────────────────────────────────────

    #[error("Could not listen on {addr}")]
    #[diagnostic(code(grocy::bind), help("{reason}"))]
    Bind { addr: String, reason: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(grocy::json), help("Check the JSON and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Bind { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoData { .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::Json(_)
            | Self::NoConfig { .. }
            | Self::Config { .. } => exit_code::USAGE,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            _ => exit_code::GENERAL,
        }
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },

            CoreError::Timeout => Self::Timeout,

            CoreError::CoordinatorStopped => Self::Stopped,

            CoreError::NotAvailable { key } => Self::NotFound {
                resource_type: "entity".into(),
                identifier: key.to_string(),
                list_command: "features".into(),
            },

            CoreError::NotRegistered { key } => Self::NotFound {
                resource_type: "entity".into(),
                identifier: key.to_string(),
                list_command: "entities".into(),
            },

            CoreError::NoData { key } => Self::NoData {
                key: key.to_string(),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                resource_type: entity_type,
                identifier,
                list_command: "entities".into(),
            },

            CoreError::Unsupported { operation, reason } => Self::Unsupported { operation, reason },

            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => Self::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => Self::Config { message },

            CoreError::Internal(message) => Self::ApiError {
                status: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: join_or_none(&available),
            },
            ConfigError::Keyring(e) => Self::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocy_core::EntityKey;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "Invalid API key".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(CoreError::NotRegistered {
            key: EntityKey::Chores,
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);

        let err = CliError::from(CoreError::ValidationFailed {
            message: "amount must be positive".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn missing_profile_lists_available() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "x".into(),
            available: vec![],
        });
        match err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "(none)"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
