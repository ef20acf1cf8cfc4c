use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::Backend;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    pub total_seats: u32,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    #[serde(default = "default_hold_seconds")]
    pub default_hold_seconds: u64,
}

fn default_sweep_interval_ms() -> u64 { 1_000 }
fn default_hold_seconds() -> u64 { 10 }

impl EngineSettings {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn default_hold(&self) -> Duration {
        Duration::from_secs(self.default_hold_seconds)
    }
}

/// Load-driver knobs. Only the simulation binaries read these.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationSettings {
    pub users: u32,
    pub ops_per_user: u32,
    pub hold_seconds: u64,
    pub think_time_ms: u64,
    pub stress_threads: u32,
    pub stress_ops_per_thread: u32,
    pub stress_hold_ms: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            users: 20,
            ops_per_user: 50,
            hold_seconds: 2,
            think_time_ms: 10,
            stress_threads: 16,
            stress_ops_per_thread: 100_000,
            stress_hold_ms: 500,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SEATLOCK_ENGINE__BACKEND=atomic`
            .add_source(
                config::Environment::with_prefix("SEATLOCK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Parse a config from a TOML string with no file or environment layering.
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [engine]
            total_seats = 100
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.total_seats, 100);
        assert_eq!(config.engine.backend, Backend::Locking);
        assert_eq!(config.engine.sweep_interval(), Duration::from_secs(1));
        assert_eq!(config.engine.default_hold(), Duration::from_secs(10));
        assert_eq!(config.simulation.users, 20);
    }

    #[test]
    fn test_backend_and_simulation_overrides() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [engine]
            total_seats = 1000
            backend = "atomic"
            sweep_interval_ms = 250

            [simulation]
            stress_threads = 4
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.engine.backend, Backend::Atomic);
        assert_eq!(config.engine.sweep_interval(), Duration::from_millis(250));
        assert_eq!(config.simulation.stress_threads, 4);
        assert_eq!(config.simulation.stress_ops_per_thread, 100_000);
    }
}
