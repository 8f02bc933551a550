//! CLI configuration: thin wrapper around `grocy_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--url, --api-key, etc.).

use secrecy::SecretString;

use grocy_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use grocy_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_api_key,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Apply flag overrides onto a profile.
fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    profile
}

/// Build the coordinator config from config file, profile and flags.
///
/// With no matching profile, `--url` and `--api-key` alone are enough.
pub fn resolve_coordinator_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<CoordinatorConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => apply_overrides(profile.clone(), global),
        None if global.url.is_some() => apply_overrides(Profile::default(), global),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: if cfg.profiles.is_empty() {
                    "(none)".into()
                } else {
                    cfg.profile_names().join(", ")
                },
                name: profile_name,
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // CLI flag takes priority over the credential chain.
    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => grocy_config::resolve_api_key(&profile, &profile_name)?,
    };

    Ok(grocy_config::build_coordinator_config(
        &profile,
        &cfg.defaults,
        api_key,
    )?)
}
