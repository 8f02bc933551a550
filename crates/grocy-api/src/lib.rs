// grocy-api: Async Rust client for the Grocy REST API

pub mod client;
pub mod endpoints;
pub mod error;
pub mod filter;
pub mod models;
pub mod transport;

pub use client::{API_KEY_HEADER, GrocyClient};
pub use endpoints::FileResponse;
pub use error::Error;
pub use filter::{Condition, QueryFilter};
pub use transport::{TlsMode, TransportConfig};
