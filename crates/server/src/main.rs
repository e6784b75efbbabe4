//! MGNREGA mirror server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to
//! avoid interfering with the JSON-RPC protocol on stdout. The sync
//! scheduler runs in the background: once at startup, then on a fixed
//! interval.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod resolve;
mod state;
mod sync;
#[cfg(test)]
mod testutil;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = mgnrega_core::AppConfig::load()?;
    tracing::info!(
        db_path = %config.db_path.display(),
        target_state = ?config.target_state,
        policy = ?config.derivation_policy,
        "starting mgnrega-mirror server on stdio transport"
    );

    let app = state::AppState::build(config).await?;

    let sync = app.sync.clone();
    let interval = app.config.sync_interval();
    tokio::spawn(async move {
        // First tick fires immediately, covering the startup sync.
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            sync.run_once().await;
        }
    });

    let db = app.db.clone();
    let handler = handler::MgnregaServer::new(app);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    if let Err(e) = db.close().await {
        tracing::warn!(error = %e, "database close failed");
    }

    Ok(())
}
