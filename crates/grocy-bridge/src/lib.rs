//! HTTP surface of grocy-bridge.
//!
//! Serves a running [`grocy_core::Coordinator`]: the picture proxy, entity
//! and todo views, service dispatch and a health check. The binary wires
//! this to a listener; tests drive [`server::router`] directly.

pub mod server;

pub use server::{AppState, router, serve};
