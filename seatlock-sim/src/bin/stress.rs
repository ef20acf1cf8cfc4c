use anyhow::Context;

use seatlock_engine::{EngineConfig, SeatEngine};
use seatlock_sim::{init_tracing, run_stress};

fn main() -> anyhow::Result<()> {
    init_tracing("seatlock_sim=info,seatlock_engine=info");

    let config = seatlock_store::app_config::Config::load().context("Failed to load config")?;
    // No sweeper: expired holds are reclaimed lazily by the ops themselves.
    let engine = SeatEngine::new(EngineConfig::from(&config.engine))?;

    let report = run_stress(&engine, &config.simulation)?;
    println!("{}", report);
    Ok(())
}
