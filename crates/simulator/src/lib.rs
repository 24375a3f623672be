//! Bulk SMS delivery simulator.
//!
//! Simulates draining a pool of synthetic messages with a configurable
//! number of concurrent sender workers while a progress monitor reports
//! aggregate throughput on a fixed cadence.
//!
//! # Architecture
//!
//! - **Configuration**: TOML-backed simulation parameters
//! - **Sender Manager**: owns the shared pool, statistics, and lock;
//!   spawns the workers and the monitor and joins them
//! - **Sender Workers**: claim messages, simulate randomized send
//!   latency, and record success or failure
//! - **Progress Monitor**: periodic statistics snapshots to stdout
//!
//! # Example
//!
//! ```ignore
//! use sms_simulator::{SenderManager, SimulationConfig};
//!
//! let config = SimulationConfig::load("simulation_config.toml")?;
//! let mut rng = rand::thread_rng();
//! let pool = sms_messages::generate_pool(config.msg_producer.num_msgs_to_send, &mut rng)?;
//!
//! let manager = SenderManager::from_config(&config, pool)?;
//! let report = manager.run().await;
//! report.print();
//! ```

pub mod config;
pub mod runner;

pub use config::{ConfigError, SimulationConfig};
pub use runner::{SendStats, SenderManager, SenderManagerError, SimulationReport};
