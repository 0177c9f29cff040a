//! Ledger server binary

use anyhow::Context;
use token_ledger::{config::LogFormat, Config, Ledger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::var("TOKEN_LEDGER_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        Err(_) => Config::from_env().context("loading config from environment")?,
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        minters = config.minters.len(),
        "Starting token ledger"
    );

    let ledger = Ledger::open(config).await?;
    tracing::info!(
        token = %ledger.metadata().name,
        symbol = %ledger.metadata().symbol,
        decimals = ledger.metadata().decimals,
        "Ledger ready"
    );

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down token ledger");
    ledger.shutdown().await?;
    Ok(())
}
