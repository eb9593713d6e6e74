//! Environment configuration.

use meshgym_types::{ElementType, NodeIndex, PartitionId, SpaceDescriptor, SpaceError};
use std::time::Duration;

/// Synthetic traffic settings.
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// Node emitting the burst.
    pub source: NodeIndex,
    /// Node receiving the burst.
    pub sink: NodeIndex,
    /// Messages per step.
    pub burst_size: u32,
    /// Bytes per message.
    pub payload_size: u32,
    /// Gap between consecutive burst messages when pacing is enabled.
    pub spacing: Duration,
    /// Send the n-th message at `tick + n * spacing` instead of all at once.
    pub pace_burst: bool,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            source: 17,
            sink: 6,
            burst_size: 6,
            payload_size: 1000,
            spacing: Duration::from_millis(100),
            pace_burst: false,
        }
    }
}

impl TrafficConfig {
    /// Delay step between burst messages, if pacing is enabled.
    pub fn pacing(&self) -> Option<Duration> {
        self.pace_burst.then_some(self.spacing)
    }
}

/// Step loop configuration.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Simulated time between steps.
    pub step_interval: Duration,
    /// Partition holding the controllable entities.
    pub partition: PartitionId,
    /// Controllable entity count, `shape[0]` of both spaces.
    pub entity_count: u32,
    /// Advertised lower bound of both spaces.
    pub low: f64,
    /// Advertised upper bound of both spaces.
    pub high: f64,
    /// Element type of both spaces.
    pub element_type: ElementType,
    /// Steps per episode.
    pub episode_steps: u64,
    pub traffic: TrafficConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(600),
            partition: PartitionId(0),
            entity_count: 6,
            low: 400.0,
            high: 800.0,
            element_type: ElementType::U32,
            episode_steps: 20,
            traffic: TrafficConfig::default(),
        }
    }
}

impl EnvConfig {
    pub fn with_step_interval(mut self, interval: Duration) -> Self {
        self.step_interval = interval;
        self
    }

    pub fn with_entity_count(mut self, count: u32) -> Self {
        self.entity_count = count;
        self
    }

    pub fn with_bounds(mut self, low: f64, high: f64) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    pub fn with_element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = element_type;
        self
    }

    pub fn with_episode_steps(mut self, steps: u64) -> Self {
        self.episode_steps = steps;
        self
    }

    pub fn with_traffic(mut self, traffic: TrafficConfig) -> Self {
        self.traffic = traffic;
        self
    }

    /// Space descriptor advertised for observations.
    pub fn observation_space(&self) -> Result<SpaceDescriptor, SpaceError> {
        self.space()
    }

    /// Space descriptor advertised for actions. Same box as observations:
    /// one element per controllable entity.
    pub fn action_space(&self) -> Result<SpaceDescriptor, SpaceError> {
        self.space()
    }

    fn space(&self) -> Result<SpaceDescriptor, SpaceError> {
        SpaceDescriptor::vector(self.low, self.high, self.entity_count, self.element_type)
    }
}
