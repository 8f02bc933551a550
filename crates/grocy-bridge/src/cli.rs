//! Clap derive structures for the `grocy-bridge` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use grocy_core::EntityKey;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// grocy-bridge -- Grocy data as sensors, binary sensors and todo lists
#[derive(Debug, Parser)]
#[command(
    name = "grocy-bridge",
    version,
    about = "Bridge a Grocy server to sensors, todo lists and service calls",
    long_about = "Polls a Grocy server and exposes its stock, chores, tasks, batteries,\n\
        meal plan, shopping list and equipment as entities over HTTP,\n\
        together with a picture proxy and service calls that mutate Grocy.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "GROCY_BRIDGE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Grocy URL, optionally with a sub-path (overrides profile)
    #[arg(long, short = 'u', env = "GROCY_BRIDGE_URL", global = true)]
    pub url: Option<String>,

    /// Grocy port (overrides profile; default 9192)
    #[arg(long, env = "GROCY_BRIDGE_PORT", global = true)]
    pub port: Option<u16>,

    /// Grocy API key
    #[arg(long, env = "GROCY_BRIDGE_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GROCY_BRIDGE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GROCY_BRIDGE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "GROCY_BRIDGE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server with periodic refresh
    Serve(ServeArgs),

    /// Check the connection and show server info
    Check,

    /// Show feature flags and the entities they enable
    Features,

    /// Fetch one entity's records from Grocy
    Fetch {
        /// Entity key (e.g. stock, overdue_chores, meal_plan)
        key: EntityKey,
    },

    /// Show entity states
    #[command(alias = "ls")]
    Entities {
        /// Only this entity
        key: Option<EntityKey>,
    },

    /// Work with todo lists
    Todo(TodoArgs),

    /// Call a service (e.g. execute_chore, consume_product)
    Call(CallArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long, short = 'l', env = "GROCY_BRIDGE_LISTEN")]
    pub listen: Option<String>,

    /// Refresh interval, e.g. "60s" or "2m" (30s to 5m; 0 disables)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TODO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TodoArgs {
    #[command(subcommand)]
    pub command: TodoCommand,
}

#[derive(Debug, Subcommand)]
pub enum TodoCommand {
    /// List items of a todo list
    #[command(alias = "ls")]
    List {
        /// batteries, chores, meal_plan, shopping_list, stock or tasks
        key: EntityKey,
    },

    /// Create an item (batteries, chores, tasks)
    Add {
        key: EntityKey,

        /// Item name
        summary: String,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Mark an item completed
    Complete {
        key: EntityKey,

        /// Item uid
        uid: String,
    },

    /// Delete items
    #[command(alias = "rm")]
    Delete {
        key: EntityKey,

        /// Item uids
        #[arg(required = true)]
        uids: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CALL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Service name; omit to list services
    pub service: Option<String>,

    /// JSON payload
    #[arg(long, short = 'd', conflicts_with = "from_file")]
    pub data: Option<String>,

    /// Read the JSON payload from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Config key (url, port, api_key, api_key_env, ca_cert, insecure,
        /// timeout, poll_interval, due_soon_days)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an API key in the system keyring
    SetKey {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
