//! Parley server - standalone entry point for the debate orchestration API
//!
//! Thin wrapper around `parley-api`: builds the model gateway, wires the
//! engine state and runs the HTTP/WebSocket shell until shutdown.

use std::sync::Arc;

use anyhow::Result;

use parley_api::{init_tracing, run, AppState, ServerConfig};
use parley_llm::ModelGateway;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("starting Parley debate service");

    let config = ServerConfig::from_env();
    let gateway = Arc::new(ModelGateway::new());
    let state = AppState::new(gateway);

    run(config, state).await?;
    Ok(())
}
