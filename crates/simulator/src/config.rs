//! TOML run configuration.
//!
//! Every section is optional; missing fields take the defaults of the
//! reference scenario. Example:
//!
//! ```toml
//! seed = 42
//! sim_time_limit_s = 100.0
//!
//! [env]
//! step_interval_ms = 600
//! entity_count = 6
//! low = 400.0
//! high = 800.0
//! element_type = "uint32"
//! episode_steps = 20
//!
//! [traffic]
//! source = 17
//! sink = 6
//! burst_size = 6
//! pace_burst = false
//!
//! [network]
//! hop_latency_ms = 2.0
//! radio_range = 225.0
//!
//! [agent]
//! listen_addr = "0.0.0.0"
//! port = 5555
//! accept_timeout_ms = 60000
//! agent_timeout_ms = 60000
//! ```

use anyhow::{bail, Context, Result};
use meshgym_core::{EnvConfig, TrafficConfig};
use meshgym_gym::AgentServerConfig;
use meshgym_simulation::{GridLayout, NetworkConfig, NodeGroup, Topology};
use meshgym_types::{ElementType, PartitionId};
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Top-level run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Seed of the network model's RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated time after which the run stops, in seconds.
    #[serde(default = "default_sim_time_limit_s")]
    pub sim_time_limit_s: f64,

    #[serde(default)]
    pub env: EnvSection,

    #[serde(default)]
    pub traffic: TrafficSection,

    #[serde(default)]
    pub network: NetworkSection,

    #[serde(default)]
    pub topology: TopologySection,

    #[serde(default)]
    pub agent: AgentSection,
}

fn default_seed() -> u64 {
    42
}

fn default_sim_time_limit_s() -> f64 {
    100.0
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            sim_time_limit_s: default_sim_time_limit_s(),
            env: EnvSection::default(),
            traffic: TrafficSection::default(),
            network: NetworkSection::default(),
            topology: TopologySection::default(),
            agent: AgentSection::default(),
        }
    }
}

/// Step loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvSection {
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Partition holding the controllable entities.
    #[serde(default)]
    pub partition: u32,

    #[serde(default = "default_entity_count")]
    pub entity_count: u32,

    #[serde(default = "default_low")]
    pub low: f64,

    #[serde(default = "default_high")]
    pub high: f64,

    /// Element type name, e.g. `uint32` or `float64`.
    #[serde(default = "default_element_type")]
    pub element_type: String,

    #[serde(default = "default_episode_steps")]
    pub episode_steps: u64,
}

fn default_step_interval_ms() -> u64 {
    600
}

fn default_entity_count() -> u32 {
    6
}

fn default_low() -> f64 {
    400.0
}

fn default_high() -> f64 {
    800.0
}

fn default_element_type() -> String {
    ElementType::U32.name().to_string()
}

fn default_episode_steps() -> u64 {
    20
}

impl Default for EnvSection {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
            partition: 0,
            entity_count: default_entity_count(),
            low: default_low(),
            high: default_high(),
            element_type: default_element_type(),
            episode_steps: default_episode_steps(),
        }
    }
}

/// Synthetic traffic settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TrafficSection {
    #[serde(default = "default_source")]
    pub source: u32,

    #[serde(default = "default_sink")]
    pub sink: u32,

    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    #[serde(default = "default_payload_size")]
    pub payload_size: u32,

    #[serde(default = "default_spacing_ms")]
    pub spacing_ms: u64,

    /// Spread each burst over `burst_size * spacing_ms`.
    #[serde(default)]
    pub pace_burst: bool,
}

fn default_source() -> u32 {
    17
}

fn default_sink() -> u32 {
    6
}

fn default_burst_size() -> u32 {
    6
}

fn default_payload_size() -> u32 {
    1000
}

fn default_spacing_ms() -> u64 {
    100
}

impl Default for TrafficSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            sink: default_sink(),
            burst_size: default_burst_size(),
            payload_size: default_payload_size(),
            spacing_ms: default_spacing_ms(),
            pace_burst: false,
        }
    }
}

/// Simulated network settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSection {
    #[serde(default = "default_hop_latency_ms")]
    pub hop_latency_ms: f64,

    #[serde(default = "default_jitter_fraction")]
    pub jitter_fraction: f64,

    #[serde(default)]
    pub packet_loss_rate: f64,

    /// Maximum link distance in metres. Zero or negative links every pair.
    #[serde(default = "default_radio_range")]
    pub radio_range: f64,
}

fn default_hop_latency_ms() -> f64 {
    2.0
}

fn default_jitter_fraction() -> f64 {
    0.1
}

fn default_radio_range() -> f64 {
    225.0
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            hop_latency_ms: default_hop_latency_ms(),
            jitter_fraction: default_jitter_fraction(),
            packet_loss_rate: 0.0,
            radio_range: default_radio_range(),
        }
    }
}

/// Node groups, created in order. Empty means the reference scenario.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopologySection {
    #[serde(default)]
    pub groups: Vec<GroupSection>,
}

/// One group of nodes on a row-first grid.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSection {
    pub partition: u32,
    pub count: u32,
    pub min_x: f64,
    pub min_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub grid_width: u32,
}

/// Agent listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSection {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long to wait for the agent to connect. Zero waits forever.
    #[serde(default = "default_agent_timeout_ms")]
    pub accept_timeout_ms: u64,

    /// Per-request agent timeout. Zero waits forever.
    #[serde(default = "default_agent_timeout_ms")]
    pub agent_timeout_ms: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5555
}

fn default_agent_timeout_ms() -> u64 {
    60_000
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            accept_timeout_ms: default_agent_timeout_ms(),
            agent_timeout_ms: default_agent_timeout_ms(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Step loop configuration.
    pub fn env_config(&self) -> Result<EnvConfig> {
        let env = &self.env;
        let Some(element_type) = ElementType::from_name(&env.element_type) else {
            bail!("Unknown element type: {}", env.element_type);
        };
        let config = EnvConfig {
            step_interval: Duration::from_millis(env.step_interval_ms),
            partition: PartitionId(env.partition),
            entity_count: env.entity_count,
            low: env.low,
            high: env.high,
            element_type,
            episode_steps: env.episode_steps,
            traffic: TrafficConfig {
                source: self.traffic.source,
                sink: self.traffic.sink,
                burst_size: self.traffic.burst_size,
                payload_size: self.traffic.payload_size,
                spacing: Duration::from_millis(self.traffic.spacing_ms),
                pace_burst: self.traffic.pace_burst,
            },
        };
        config
            .observation_space()
            .context("Invalid observation space")?;
        Ok(config)
    }

    /// Network model configuration.
    pub fn network_config(&self) -> Result<NetworkConfig> {
        let network = &self.network;
        let hop_latency = Duration::try_from_secs_f64(network.hop_latency_ms / 1000.0)
            .with_context(|| format!("Invalid hop latency: {} ms", network.hop_latency_ms))?;
        Ok(NetworkConfig {
            hop_latency,
            jitter_fraction: network.jitter_fraction.clamp(0.0, 1.0),
            packet_loss_rate: network.packet_loss_rate.clamp(0.0, 1.0),
            radio_range: (network.radio_range > 0.0).then_some(network.radio_range),
        })
    }

    /// Node placement.
    pub fn topology(&self) -> Topology {
        if self.topology.groups.is_empty() {
            return Topology::default();
        }
        Topology::new(
            self.topology
                .groups
                .iter()
                .map(|group| NodeGroup {
                    partition: PartitionId(group.partition),
                    count: group.count,
                    layout: GridLayout {
                        min_x: group.min_x,
                        min_y: group.min_y,
                        delta_x: group.delta_x,
                        delta_y: group.delta_y,
                        grid_width: group.grid_width,
                    },
                })
                .collect(),
        )
    }

    /// Agent listener configuration.
    pub fn server_config(&self) -> Result<AgentServerConfig> {
        let ip: IpAddr = self
            .agent
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.agent.listen_addr))?;
        let millis = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        Ok(AgentServerConfig::default()
            .with_bind_addr(SocketAddr::new(ip, self.agent.port))
            .with_accept_timeout(millis(self.agent.accept_timeout_ms))
            .with_response_timeout(millis(self.agent.agent_timeout_ms)))
    }

    /// Outer stop time of the run.
    pub fn sim_time_limit(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.sim_time_limit_s)
            .with_context(|| format!("Invalid simulation time limit: {} s", self.sim_time_limit_s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_file_uses_reference_scenario() {
        let file = write_config("");
        let config = SimulatorConfig::load(file.path()).unwrap();

        let env = config.env_config().unwrap();
        assert_eq!(env.step_interval, Duration::from_millis(600));
        assert_eq!(env.entity_count, 6);
        assert_eq!(env.element_type, ElementType::U32);
        assert_eq!(env.episode_steps, 20);
        assert_eq!(env.traffic.source, 17);
        assert_eq!(env.traffic.sink, 6);
        assert_eq!(env.traffic.pacing(), None);

        assert_eq!(config.topology(), Topology::default());
        assert_eq!(config.network_config().unwrap().radio_range, Some(225.0));
        assert_eq!(
            config.server_config().unwrap().bind_addr,
            SocketAddr::from(([0, 0, 0, 0], 5555))
        );
        assert_eq!(config.sim_time_limit().unwrap(), Duration::from_secs(100));
    }

    #[test]
    fn test_sections_override_defaults() {
        let file = write_config(
            r#"
seed = 7
sim_time_limit_s = 12.5

[env]
episode_steps = 5
element_type = "float64"

[traffic]
pace_burst = true
spacing_ms = 50

[network]
radio_range = 0.0
packet_loss_rate = 2.0

[[topology.groups]]
partition = 0
count = 3
min_x = 0.0
min_y = 0.0
delta_x = 10.0
delta_y = 10.0
grid_width = 3

[agent]
listen_addr = "127.0.0.1"
port = 6000
accept_timeout_ms = 1500
agent_timeout_ms = 0
"#,
        );
        let config = SimulatorConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.sim_time_limit().unwrap(), Duration::from_millis(12_500));

        let env = config.env_config().unwrap();
        assert_eq!(env.episode_steps, 5);
        assert_eq!(env.element_type, ElementType::F64);
        assert_eq!(env.traffic.pacing(), Some(Duration::from_millis(50)));

        let network = config.network_config().unwrap();
        assert_eq!(network.radio_range, None);
        assert_eq!(network.packet_loss_rate, 1.0);

        assert_eq!(config.topology().node_count(), 3);

        let server = config.server_config().unwrap();
        assert_eq!(server.bind_addr, SocketAddr::from(([127, 0, 0, 1], 6000)));
        assert_eq!(server.accept_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(server.response_timeout, None);
    }

    #[test]
    fn test_unknown_element_type() {
        let mut config = SimulatorConfig::default();
        config.env.element_type = "complex128".to_string();
        let err = config.env_config().unwrap_err();
        assert!(err.to_string().contains("complex128"));
    }

    #[test]
    fn test_inverted_bounds() {
        let mut config = SimulatorConfig::default();
        config.env.low = 900.0;
        assert!(config.env_config().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = SimulatorConfig::load(Path::new("/nonexistent/meshgym.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("[env]\nepisode_steps = \"many\"\n");
        let err = SimulatorConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
