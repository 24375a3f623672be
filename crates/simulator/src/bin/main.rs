//! SMS Simulator CLI
//!
//! Loads the simulation config, generates the initial message pool, and
//! runs the senders to completion.

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sms_simulator::config::DEFAULT_CONFIG_PATH;
use sms_simulator::{SenderManager, SimulationConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sms-sim")]
#[command(about = "Bulk SMS delivery simulator")]
#[command(version)]
struct Cli {
    /// Path to the simulation config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seed for the simulation RNG (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = SimulationConfig::load(&cli.config)?;

    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let pool = sms_messages::generate_pool(config.msg_producer.num_msgs_to_send, &mut rng)?;

    let mut manager = SenderManager::from_config(&config, pool)?;
    if let Some(seed) = cli.seed {
        manager = manager.with_seed(seed);
    }

    println!("Starting simulation...");
    let report = manager.run().await;
    report.print();
    println!("End of simulation...");

    Ok(())
}
