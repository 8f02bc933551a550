//! Polling and service layer between `grocy-api` and host consumers.
//!
//! - **[`Coordinator`]**: one per Grocy server.
//!   [`setup()`](Coordinator::setup) checks the connection, resolves which
//!   entity keys the server's feature flags allow, registers them and runs
//!   the first refresh; [`start()`](Coordinator::start) spawns periodic
//!   refresh and the command processor.
//!   [`Coordinator::oneshot()`](Coordinator::oneshot) covers single CLI
//!   invocations.
//!
//! - **[`CoordinatorData`]**: the immutable snapshot readers get. Each
//!   refresh cycle publishes a whole new value; a failed key keeps its last
//!   data, marked stale.
//!
//! - **[`Command`]** / **[`Service`]**: typed mutations parsed from named
//!   service calls, routed through an `mpsc` channel, followed by a targeted
//!   refresh of the keys they affect.
//!
//! - **Adapters** ([`adapters`], [`todo`]): sensor, binary sensor, todo
//!   list and equipment field views over the latest data, with records
//!   rendered through [`ToAttributes`].

pub mod adapters;
pub mod attributes;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod features;
pub mod fetch;
pub mod store;
pub mod todo;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapters::{EntityState, TodoListState};
pub use attributes::{AttributeValue, Attributes, ToAttributes};
pub use command::{Command, CommandResult, Service};
pub use config::{CoordinatorConfig, DEFAULT_PORT, TlsVerification};
pub use coordinator::{
    Coordinator, CoordinatorState, KeyFailure, RefreshReport, Registration,
};
pub use entity::{EntityKey, EntityKind, STOCK_KEYS};
pub use error::CoreError;
pub use features::{MissingFlagPolicy, resolve_available};
pub use fetch::{DataAccess, FetchContext};
pub use store::{CoordinatorData, EntityData, KeySnapshot};
pub use todo::{NewTodoItem, TodoItem, TodoStatus};
