//! meshgym Random Agent
//!
//! Connects to `meshgym-env` and plays a uniform random policy.
//!
//! # Example
//!
//! ```bash
//! meshgym-agent --episodes 5 --seed 7
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use meshgym_gym::GymClient;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// meshgym Random Agent
#[derive(Parser, Debug)]
#[command(name = "meshgym-agent")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Environment address
    #[arg(long, default_value = "127.0.0.1:5555")]
    addr: String,

    /// Number of training episodes
    #[arg(short = 'n', long, default_value = "5")]
    episodes: u32,

    /// Policy seed. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Connection attempts, one second apart
    #[arg(long, default_value = "30")]
    connect_attempts: u32,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long, default_value = "warn,meshgym_agent=info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut client =
        GymClient::connect_with_retry(cli.addr.as_str(), cli.connect_attempts, Duration::from_secs(1))
            .with_context(|| format!("Failed to connect to {}", cli.addr))?;

    let observation_space = client.observation_space()?;
    let action_space = client.action_space()?;
    info!(%observation_space, %action_space, seed, "Environment spaces");

    let mut totals = Vec::with_capacity(cli.episodes as usize);
    for episode in 0..cli.episodes {
        client.reset()?;
        let mut total = 0.0;
        let mut steps = 0u64;
        loop {
            let action = action_space.sample(&mut rng);
            let result = client.step(&action)?;
            total += result.reward;
            steps += 1;
            if result.done {
                break;
            }
        }
        info!(episode, steps, total, "Episode finished");
        totals.push(total);
    }

    if !totals.is_empty() {
        let mean = totals.iter().sum::<f64>() / totals.len() as f64;
        info!(episodes = totals.len(), mean, "Mean episode reward");
    }

    client.close()?;
    Ok(())
}
