//! meshgym Simulator
//!
//! Run configuration and wiring for the two meshgym processes:
//!
//! - **`meshgym-env`**: builds the node world and network model from a
//!   [`SimulatorConfig`], listens for an agent over TCP, and drives the step
//!   loop until the agent closes or the simulated time limit is reached.
//! - **`meshgym-agent`**: connects to `meshgym-env` and plays a seeded
//!   uniform random policy for a number of episodes.
//!
//! # Example
//!
//! ```ignore
//! use meshgym_gym::TcpAgentTransport;
//! use meshgym_simulator::{build_runner, SimulatorConfig};
//!
//! let config = SimulatorConfig::load("meshgym.toml".as_ref())?;
//! let transport = TcpAgentTransport::bind(config.server_config()?)?;
//! let mut runner = build_runner(&config, transport)?;
//! runner.start();
//! runner.run_until(config.sim_time_limit()?)?;
//! println!("episodes: {}", runner.stats().episodes_completed);
//! ```

mod config;

pub use config::{
    AgentSection, EnvSection, GroupSection, NetworkSection, SimulatorConfig, TopologySection,
    TrafficSection,
};

use anyhow::Result;
use meshgym_core::AgentTransport;
use meshgym_simulation::SimulationRunner;

/// Build a runner for `config` talking to `agent`.
pub fn build_runner<A: AgentTransport>(
    config: &SimulatorConfig,
    agent: A,
) -> Result<SimulationRunner<A>> {
    let runner = SimulationRunner::new(
        config.env_config()?,
        config.topology().build(),
        config.network_config()?,
        config.seed,
        agent,
    )?;
    Ok(runner)
}
