//! Axum server setup
//!
//! Server skeleton with:
//! - Request tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C
//! - Environment-driven bind address and search credentials

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use quarry_search::MeiliClient;

use super::routes;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3030";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Configuration from the HOST and PORT environment variables.
    pub fn from_env() -> Result<Self, ServerError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let bind_addr = format!("{}:{}", host, port).parse()?;
        Ok(Self { bind_addr })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Search client, `None` when credentials are not configured.
    /// Search requests answer 500 until both variables are present;
    /// the process still boots.
    pub search: Option<MeiliClient>,
}

impl AppState {
    /// Build state from MEILI_HOST and MEILI_MASTER_KEY.
    pub fn from_env() -> Self {
        let search = match MeiliClient::from_env() {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Search disabled: {}", e);
                None
            }
        };
        Self { search }
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::search::router())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = AppState::from_env();
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),
}
