use anyhow::Context;
use std::sync::Arc;

use seatlock_engine::{EngineConfig, SeatEngine};
use seatlock_sim::{init_tracing, run_simulation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("seatlock_sim=info,seatlock_engine=info");

    let config = seatlock_store::app_config::Config::load().context("Failed to load config")?;
    let engine = Arc::new(SeatEngine::new(EngineConfig::from(&config.engine))?);
    let sweeper = engine.start_sweeper()?;

    let settings = config.simulation.clone();
    let report = {
        let engine = engine.clone();
        tokio::task::spawn_blocking(move || run_simulation(&engine, &settings)).await?
    };

    sweeper.shutdown().await;
    println!("{}", report);
    Ok(())
}
