//! Feature flag report.

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use grocy_core::features::FEATURE_FLAGS;
use grocy_core::{Coordinator, CoordinatorConfig, EntityKey, resolve_available};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct FeatureStatus {
    flag: &'static str,
    value: Option<Value>,
    enabled: bool,
    entities: Vec<EntityKey>,
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Flag")]
    flag: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Entities")]
    entities: String,
}

fn to_row(status: &FeatureStatus, color: bool) -> FeatureRow {
    FeatureRow {
        flag: status.flag.to_owned(),
        value: status
            .value
            .as_ref()
            .map_or_else(|| "(missing)".into(), ToString::to_string),
        enabled: output::highlight(
            if status.enabled { "yes" } else { "no" },
            !status.enabled,
            color,
        ),
        entities: status
            .entities
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let policy = config.missing_flag_policy;
    let coordinator = Coordinator::new(config)?;
    let flags = coordinator.fetch_system_config().await?;
    let available = resolve_available(&flags, policy);

    let statuses: Vec<FeatureStatus> = FEATURE_FLAGS
        .iter()
        .map(|&(flag, keys)| FeatureStatus {
            flag,
            value: flags.get(flag).cloned(),
            enabled: keys.first().is_some_and(|k| available.contains(k)),
            entities: keys.to_vec(),
        })
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &statuses,
        |s| to_row(s, color),
        |s| s.flag.to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
