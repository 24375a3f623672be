//! Simulation configuration loaded from a TOML file.

use serde::Deserialize;
use std::path::Path;

/// Default path for the simulation config file.
pub const DEFAULT_CONFIG_PATH: &str = "simulation_config.toml";

/// Top-level configuration for a simulation run.
///
/// Range constraints on the individual values are enforced by
/// [`SenderManager::new`](crate::runner::SenderManager::new) before any
/// task is spawned; loading only checks that the file exists, has the
/// right extension, and parses with the required keys.
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Initial message pool parameters.
    pub msg_producer: ProducerConfig,

    /// Sender worker parameters.
    pub msg_sender: SenderConfig,

    /// Progress monitor parameters.
    pub progress_monitor: MonitorConfig,
}

/// Parameters for the initial message pool.
#[derive(Clone, Debug, Deserialize)]
pub struct ProducerConfig {
    /// Number of messages in the initial pool.
    pub num_msgs_to_send: usize,
}

/// Parameters shared by all sender workers.
#[derive(Clone, Debug, Deserialize)]
pub struct SenderConfig {
    /// Average seconds a simulated send takes. Must be 2 or greater.
    pub average_send_time: u64,

    /// Seconds randomly added to or subtracted from the average.
    pub average_send_time_factor: u64,

    /// Approximate failure rate as a percent, 0-100.
    pub failure_rate: u8,

    /// Number of concurrent sender workers. Must be 1 or greater.
    pub num_senders: usize,
}

/// Parameters for the progress monitor.
#[derive(Clone, Debug, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between progress reports. Must be 1 or greater.
    pub refresh_rate: u64,
}

impl SimulationConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            return Err(ConfigError::InvalidExtension(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Ok(toml::from_str(&contents)?)
    }
}

/// Errors while loading the simulation config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {0} not found, check that the correct config file was used")]
    NotFound(String),

    #[error("config file {0} has an invalid extension, should be a toml file")]
    InvalidExtension(String),

    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
