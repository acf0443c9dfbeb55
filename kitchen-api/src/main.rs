use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use kitchen_api::{app, AppState};
use kitchen_order::OrderManager;
use kitchen_store::{app_config::Config, StoreOrderRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kitchen_api=debug,kitchen_store=debug,kitchen_order=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        port = config.server.port,
        table = %config.store.table_name,
        backend = ?config.store.backend,
        "Starting kitchen API"
    );

    // Provisioning blocks here until the orders table is usable
    let table = kitchen_store::connect_table(&config.store).await;
    let repo = StoreOrderRepository::connect(table, config.store.table_name.clone())
        .await
        .with_context(|| format!("Failed to provision table {}", config.store.table_name))?;

    let app_state = AppState::new(OrderManager::new(Arc::new(repo)));
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
