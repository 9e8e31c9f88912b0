use std::net::SocketAddr;
use std::sync::Arc;

use folio::db::{create_pool, Catalog, MemoryCatalog, PgCatalog};
use folio::{config::Config, routes::create_router, storage, utils::init_logger, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Connect to database, or fall back to an in-process catalog
    let catalog: Arc<dyn Catalog> = match config.database.url.as_deref() {
        Some(url) => {
            let pool = create_pool(&config.database, url).await?;
            Arc::new(PgCatalog::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory catalog, data will not persist");
            Arc::new(MemoryCatalog::new())
        }
    };

    let store = storage::build_store(&config.storage, config.timeouts.storage())?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create shared state
    let state = AppState::new(config, catalog, store);

    // Create router
    let app = create_router(state);

    // Start server
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
