use cashflow_valuation::{api::start_server, config::AppConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    info!("🚀 Cash Flow Valuation API");
    info!("📍 Address: {}", config.server_address());
    info!(
        environment = ?config.environment,
        horizon = config.horizon.months(),
        multiple = config.multiple.value(),
        max_upload_bytes = config.max_upload_bytes,
        "📊 Valuation settings"
    );

    start_server(Arc::new(config)).await?;

    Ok(())
}
