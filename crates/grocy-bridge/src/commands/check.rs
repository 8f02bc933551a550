//! Connection check.

use std::fmt::Write;

use grocy_api::models::SystemInfo;
use grocy_core::{Coordinator, CoordinatorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(base_url: &str, info: &SystemInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Server:   {base_url}");
    let _ = writeln!(
        out,
        "Grocy:    {} ({})",
        info.grocy_version.version, info.grocy_version.release_date
    );
    let _ = writeln!(out, "PHP:      {}", info.php_version);
    let _ = write!(out, "SQLite:   {}", info.sqlite_version);
    if let Some(ref os) = info.os {
        let _ = write!(out, "\nOS:       {os}");
    }
    out
}

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = Coordinator::new(config)?;
    let info = coordinator.fetch_system_info().await?;
    let base_url = coordinator.client().base_url().to_string();

    let out = output::render_single(
        &global.output,
        &info,
        |i| detail(&base_url, i),
        |i| i.grocy_version.version.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
