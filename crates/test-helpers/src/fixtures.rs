//! Fixture worlds and runners.

use meshgym_core::{AgentTransport, EnvConfig};
use meshgym_simulation::{NetworkConfig, NodeWorld, SimulationRunner, Topology};
use std::time::Duration;

/// Seed used by the fixture runners.
pub const SEED: u64 = 42;

/// The default 18-node scenario: six relays and three clusters.
pub fn default_world() -> NodeWorld {
    Topology::default().build()
}

/// Network without jitter or loss, so delivery depends only on positions.
pub fn quiet_network() -> NetworkConfig {
    NetworkConfig {
        hop_latency: Duration::from_millis(2),
        jitter_fraction: 0.0,
        packet_loss_rate: 0.0,
        ..Default::default()
    }
}

/// Runner over the default scenario with the default step loop settings.
pub fn default_runner<A: AgentTransport>(agent: A) -> SimulationRunner<A> {
    runner_with(EnvConfig::default(), agent)
}

/// Runner over the default scenario with a custom step loop configuration.
///
/// # Panics
///
/// Panics if `config` is invalid for the default scenario.
pub fn runner_with<A: AgentTransport>(config: EnvConfig, agent: A) -> SimulationRunner<A> {
    SimulationRunner::new(config, default_world(), quiet_network(), SEED, agent)
        .unwrap_or_else(|e| panic!("fixture runner: {e}"))
}
