//! Named service calls.

use grocy_core::{Coordinator, CoordinatorConfig, Service};

use crate::cli::{CallArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

/// Print every accepted service name. Needs no connection.
pub fn list_services(global: &GlobalOpts) {
    let names: Vec<String> = Service::all().map(|s| s.to_string()).collect();
    output::print_output(&names.join("\n"), global.quiet);
}

pub async fn handle(
    config: CoordinatorConfig,
    args: CallArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let Some(service) = args.service else {
        list_services(global);
        return Ok(());
    };

    let payload = util::read_payload(args.data.as_deref(), args.from_file.as_deref())?;
    tracing::debug!(%service, %payload, "calling service");

    let result =
        Coordinator::oneshot(config, |c| async move { c.call_service(&service, payload).await })
            .await?;

    let out = output::render_single(
        &global.output,
        &result,
        util::result_detail,
        |_| "ok".into(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
