//! HTTP server layer
//!
//! Axum server with:
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses matching the search contract

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig};
