//! meshgym Environment
//!
//! Runs the simulated mesh and serves one agent over TCP.
//!
//! # Example
//!
//! ```bash
//! # Reference scenario, agent on port 5555
//! meshgym-env
//!
//! # From a config file, with a shorter episode and paced bursts
//! meshgym-env --config meshgym.toml --episode-steps 10 --pace-burst
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use meshgym_gym::TcpAgentTransport;
use meshgym_simulator::{build_runner, SimulatorConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// meshgym Environment
///
/// Deterministic for a given seed and agent.
#[derive(Parser, Debug)]
#[command(name = "meshgym-env")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Agent port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Network RNG seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Steps per episode (overrides config)
    #[arg(long)]
    episode_steps: Option<u64>,

    /// Simulated time limit in seconds (overrides config)
    #[arg(long)]
    sim_time: Option<f64>,

    /// Time to wait for the agent to connect in milliseconds, 0 to wait forever (overrides config)
    #[arg(long)]
    accept_timeout_ms: Option<u64>,

    /// Agent response timeout in milliseconds, 0 to wait forever (overrides config)
    #[arg(long)]
    agent_timeout_ms: Option<u64>,

    /// Spread each burst over the step instead of sending it at once
    #[arg(long)]
    pace_burst: bool,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long, default_value = "warn,meshgym_env=info,meshgym_simulation=info,meshgym_gym=info")]
    log_level: String,
}

fn apply_overrides(config: &mut SimulatorConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        config.agent.port = port;
    }

    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    if let Some(steps) = cli.episode_steps {
        config.env.episode_steps = steps;
    }

    if let Some(limit) = cli.sim_time {
        config.sim_time_limit_s = limit;
    }

    if let Some(timeout) = cli.accept_timeout_ms {
        config.agent.accept_timeout_ms = timeout;
    }

    if let Some(timeout) = cli.agent_timeout_ms {
        config.agent.agent_timeout_ms = timeout;
    }

    if cli.pace_burst {
        config.traffic.pace_burst = true;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    let server_config = config.server_config()?;
    let time_limit = config.sim_time_limit()?;
    let transport = TcpAgentTransport::bind(server_config.clone())
        .with_context(|| format!("Failed to listen on {}", server_config.bind_addr))?;
    let mut runner = build_runner(&config, transport)?;

    info!(
        seed = config.seed,
        episode_steps = config.env.episode_steps,
        step_interval_ms = config.env.step_interval_ms,
        ?time_limit,
        "Starting environment"
    );

    runner.start();
    runner.run_until(time_limit)?;

    let stats = runner.stats();
    info!(
        sim_time = ?runner.now(),
        events = stats.events_processed,
        round_trips = stats.agent_round_trips,
        episodes = stats.episodes_completed,
        sent = stats.messages_sent,
        delivered = stats.messages_delivered,
        dropped = stats.messages_dropped(),
        delivery_rate = stats.delivery_rate(),
        "Environment finished"
    );
    Ok(())
}
