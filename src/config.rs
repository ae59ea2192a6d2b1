//! Configuration types for gmo-ticks

use crate::feed::Symbol;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub telemetry: TelemetryConfig,
}

/// Tick feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub ws_endpoint: String,
    pub symbol: Symbol,
}

/// Persisted store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

/// Buffer-to-store pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Flush cadence in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Drained-batch size that triggers a slow-storage warning
    #[serde(default = "default_high_water_mark")]
    pub buffer_high_water_mark: usize,
}

fn default_flush_interval_ms() -> u64 {
    30
}
fn default_high_water_mark() -> usize {
    100_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 30,
            buffer_high_water_mark: 100_000,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [feed]
            ws_endpoint = "wss://api.coin.z.com/ws/public/v1"
            symbol = "BTC_JPY"

            [store]
            db_path = "./rates.db"

            [pipeline]
            flush_interval_ms = 30
            buffer_high_water_mark = 50000

            [telemetry]
            log_level = "info"
            metrics_port = 9090
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.symbol, Symbol::BtcJpy);
        assert_eq!(config.store.db_path, PathBuf::from("./rates.db"));
        assert_eq!(config.pipeline.flush_interval_ms, 30);
        assert_eq!(config.pipeline.buffer_high_water_mark, 50_000);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
    }

    #[test]
    fn test_pipeline_section_defaults() {
        let toml = r#"
            [feed]
            ws_endpoint = "wss://api.coin.z.com/ws/public/v1"
            symbol = "ETH_JPY"

            [store]
            db_path = "/var/lib/gmo-ticks/rates.db"

            [telemetry]
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.pipeline.flush_interval_ms, 30);
        assert_eq!(config.pipeline.buffer_high_water_mark, 100_000);
        assert!(config.telemetry.metrics_port.is_none());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(include_str!("../config.toml.example")).unwrap();
        assert_eq!(config.feed.symbol, Symbol::BtcJpy);
    }

    #[test]
    fn test_invalid_symbol_rejected() {
        let toml = r#"
            [feed]
            ws_endpoint = "wss://api.coin.z.com/ws/public/v1"
            symbol = "DOGE_JPY"

            [store]
            db_path = "./rates.db"

            [telemetry]
            log_level = "info"
        "#;

        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }
}
