use anyhow::Context;
use dotenv::dotenv;
use tokio::signal;
use tracing::info;

use kb_catalog::{app, app_state::AppState, config, db, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init()?;
    let telemetry = telemetry::init_telemetry(telemetry::TelemetryConfig::from_config(config))
        .await
        .context("Failed to initialize telemetry")?;

    let pool = db::init_pool(&config.database).await?;
    let state = AppState::new(pool.clone(), config.clone());
    let app = app::create_router(state);

    let addr = config.server_addr();
    info!("{} ({}) listening on {}", config.app.name, config.app.environment.as_str(), addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve application")?;

    info!("Server stopped, closing database pool");
    pool.close().await;
    telemetry.shutdown().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
