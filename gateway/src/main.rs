//! Ratefeed Gateway Binary
//!
//! Serves USD-based rates from a cached provider fallback chain.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratefeed_fx::Credentials;
use ratefeed_gateway::metrics::Metrics;
use ratefeed_gateway::store::MemoryCacheConfig;
use ratefeed_gateway::{server, DeferredTasks, GatewayConfig, MemoryCacheStore, RequestHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Ratefeed Gateway");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let store = Arc::new(MemoryCacheStore::with_config(MemoryCacheConfig {
        max_entries: config.cache_max_entries,
    }));
    let tasks = DeferredTasks::new();
    let metrics = Arc::new(Metrics::new());
    let handler = Arc::new(RequestHandler::from_config(
        &config,
        store,
        tasks.clone(),
        Credentials::from_env(),
        metrics.clone(),
    )?);

    info!(
        providers = ?config.fx.providers,
        symbols = config.fx.symbols.len(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Provider chain ready"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    server::serve(listener, handler, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    })
    .await?;

    // Cache writes scheduled after the last responses still have to land.
    tasks.shutdown().await;

    info!(metrics = ?metrics.snapshot(), "Gateway shutdown complete");
    Ok(())
}
