use anyhow::{Context, Result};
use colored::Colorize;

use workstation_core::execution::ExecutionBackend;
use workstation_infrastructure::load_config;
use workstation_interaction::ExecutionApiClient;

async fn client() -> Result<ExecutionApiClient> {
    let config = load_config().await.context("Failed to load configuration")?;
    Ok(ExecutionApiClient::new(&config.execution)?)
}

/// Stops and releases `session_id`.
pub async fn stop(session_id: &str) -> Result<()> {
    let client = client().await?;
    client
        .stop(session_id)
        .await
        .with_context(|| format!("Failed to stop session {}", session_id))?;
    client
        .release(session_id)
        .await
        .with_context(|| format!("Failed to release session {}", session_id))?;

    println!("{} session {}", "Stopped".green(), session_id);
    Ok(())
}

pub async fn health() -> Result<()> {
    let client = client().await?;
    let status = client
        .health()
        .await
        .with_context(|| format!("Execution backend at {} is not reachable", client.base_url()))?;

    println!("{} {} ({})", "✓".green(), client.base_url(), status.status);
    Ok(())
}
