//! quarry-server binary entry point

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use quarry_server::db;
use quarry_server::http::{self, ServerConfig};

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    // Fail loud on a missing or malformed connection string. Connections
    // themselves are opened on first use.
    db::pool()
        .await
        .context("database pool initialization failed")?;
    tracing::info!("Database pool initialized");

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    http::run_server(config).await.context("server error")?;

    db::close().await;
    tracing::info!("Database pool closed");
    Ok(())
}
