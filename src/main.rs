//! formdesk - Main Entry Point

use formdesk::{build_router, AppState, Renderer, ServerConfig, SqliteFormStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("formdesk v{}", env!("CARGO_PKG_VERSION"));

    // Load config
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "formdesk.json".into());
    let config = ServerConfig::load(&config_path).unwrap_or_else(|e| {
        tracing::warn!(path = %config_path, error = %e, "config not loaded, using defaults");
        ServerConfig::default()
    });

    // Store and renderer live for the whole process
    let store = SqliteFormStore::open(&config.database_path)?;
    let renderer = Renderer::new(config.site_title.clone())?;
    let state = AppState::new(Arc::new(store), renderer);

    let app = build_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.listen_addr.as_str()).await?;
    tracing::info!("formdesk listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
