//! HTTP API.
//!
//! Exposes the appointment store and the AI assistant as JSON endpoints
//! under `/api/`, plus a WebSocket change feed at `/ws/changes`.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
pub mod websocket;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
