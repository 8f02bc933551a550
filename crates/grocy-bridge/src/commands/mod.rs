//! Command dispatch: bridges CLI args -> coordinator calls -> output formatting.

pub mod call;
pub mod check;
pub mod config_cmd;
pub mod entities;
pub mod features;
pub mod fetch;
pub mod serve;
pub mod todo;
pub mod util;

use grocy_core::CoordinatorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a Grocy-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: CoordinatorConfig,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Serve(args) => serve::handle(config, args, cfg, global).await,
        Command::Check => check::handle(config, global).await,
        Command::Features => features::handle(config, global).await,
        Command::Fetch { key } => fetch::handle(config, key, global).await,
        Command::Entities { key } => entities::handle(config, key, global).await,
        Command::Todo(args) => todo::handle(config, args, global).await,
        Command::Call(args) => call::handle(config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
