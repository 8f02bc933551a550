// ── Runtime coordinator configuration ──
//
// These types describe *how* to reach a Grocy instance and how often to
// poll it. They carry credential data and tuning, but never touch disk.
// The bridge binary builds a `CoordinatorConfig` and hands it in.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;

use grocy_api::{TlsMode, TransportConfig};

use crate::entity::EntityKey;
use crate::error::CoreError;
use crate::features::MissingFlagPolicy;

pub const DEFAULT_PORT: u16 = 9192;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one Grocy instance.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Server URL, optionally with a sub-path (`https://host/grocy`).
    pub url: String,
    pub port: u16,
    pub api_key: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout handed to the HTTP client.
    pub timeout: Duration,
    /// Periodic refresh interval. `Duration::ZERO` disables the task.
    pub poll_interval: Duration,
    pub missing_flag_policy: MissingFlagPolicy,
    /// Window for "expiring" products.
    pub due_soon_days: u32,
    /// Upper bound on concurrent Grocy requests.
    pub max_concurrent_requests: usize,
    /// Keys fetched more recently than this are skipped by periodic cycles.
    pub min_refresh_intervals: HashMap<EntityKey, Duration>,
    /// Available keys that start administratively disabled.
    pub disabled_entities: Vec<EntityKey>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost".into(),
            port: DEFAULT_PORT,
            api_key: SecretString::from(String::new()),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
            missing_flag_policy: MissingFlagPolicy::default(),
            due_soon_days: 5,
            max_concurrent_requests: 4,
            min_refresh_intervals: HashMap::new(),
            disabled_entities: Vec::new(),
        }
    }
}

impl CoordinatorConfig {
    /// Reject settings outside supported bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.url.trim().is_empty() {
            return Err(CoreError::Config {
                message: "Grocy URL is empty".into(),
            });
        }
        if !self.poll_interval.is_zero()
            && !(MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&self.poll_interval)
        {
            return Err(CoreError::Config {
                message: format!(
                    "poll interval must be between {}s and {}s, got {}s",
                    MIN_POLL_INTERVAL.as_secs(),
                    MAX_POLL_INTERVAL.as_secs(),
                    self.poll_interval.as_secs()
                ),
            });
        }
        if self.max_concurrent_requests == 0 {
            return Err(CoreError::Config {
                message: "max_concurrent_requests must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig::default()
            .with_tls(tls)
            .with_timeout(self.timeout)
    }

    pub(crate) fn min_refresh_interval(&self, key: EntityKey) -> Duration {
        self.min_refresh_intervals
            .get(&key)
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}
