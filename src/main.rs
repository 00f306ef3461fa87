use dotenv::dotenv;
use lightbnb_db::{AppState, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Connects to the configured store, proves it answers, and reports pool health.
#[tokio::main]
async fn main() -> lightbnb_db::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = Settings::new()?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!(environment = %config.environment, "configuration loaded");

    let state = AppState::new(config).await?;
    let queries = state.queries();

    if let Err(e) = queries.ping().await {
        error!("database connectivity check failed: {}", e);
        state.shutdown().await?;
        return Err(e);
    }

    let status = queries.get_pool_status().await?;
    info!(
        total = status.total_connections,
        active = status.active_connections,
        idle = status.idle_connections,
        "database reachable"
    );

    state.shutdown().await
}
