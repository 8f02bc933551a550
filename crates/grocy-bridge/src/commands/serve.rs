//! Long-running mode: periodic refresh plus the HTTP surface.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use grocy_core::{Coordinator, CoordinatorConfig};

use crate::cli::{GlobalOpts, ServeArgs};
use crate::config::Config;
use crate::error::CliError;

pub async fn handle(
    mut config: CoordinatorConfig,
    args: ServeArgs,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(interval) = args.poll_interval {
        config.poll_interval = interval;
        config.validate()?;
    }

    let addr = args.listen.unwrap_or_else(|| cfg.defaults.listen.clone());
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| CliError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

    let coordinator = Coordinator::new(config)?;
    let keys = coordinator.setup().await?;
    info!(entities = keys.len(), "coordinator ready");
    coordinator.start().await?;

    if !global.quiet {
        eprintln!("Serving {} entities on http://{addr}", keys.len());
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "could not listen for shutdown signal");
        }
        info!("shutdown requested");
        on_signal.cancel();
    });

    let served = grocy_bridge::serve(listener, coordinator.clone(), cancel).await;
    coordinator.shutdown().await;
    served?;
    Ok(())
}
