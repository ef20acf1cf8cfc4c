use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;

use seatlock_api::{app, AppState};
use seatlock_engine::{EngineConfig, SeatEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatlock_api=debug,seatlock_engine=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = seatlock_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting SeatLock API on port {}", config.server.port);

    let engine = Arc::new(SeatEngine::new(EngineConfig::from(&config.engine))?);
    let sweeper = engine.start_sweeper()?;

    let app = app(AppState::new(engine, config.engine.default_hold()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("SeatLock API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
