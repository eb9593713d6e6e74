//! Simulated network with deterministic latency, packet loss, and link blocking.

use meshgym_types::{NodeIndex, Position};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::time::Duration;
use tracing::trace;

/// Configuration for simulated network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Base latency of a single hop.
    pub hop_latency: Duration,
    /// Jitter as a fraction of base latency (0.0 - 1.0).
    pub jitter_fraction: f64,
    /// Packet loss rate (0.0 - 1.0). Messages are dropped with this probability.
    pub packet_loss_rate: f64,
    /// Maximum link distance in metres. `None` links every pair directly.
    pub radio_range: Option<f64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hop_latency: Duration::from_millis(2),
            jitter_fraction: 0.1,
            packet_loss_rate: 0.0,
            radio_range: Some(225.0),
        }
    }
}

/// Why a message was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No chain of links connects the endpoints.
    Unreachable,
    /// Lost to the configured packet loss rate.
    Loss,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Unreachable => "unreachable",
            DropReason::Loss => "loss",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated network for deterministic message delivery.
///
/// Supports:
/// - Per-hop latency with jitter
/// - Packet loss (probabilistic message drops)
/// - Radio range (links only between nodes within range)
/// - Link blocking (directional, independent of range)
#[derive(Debug)]
pub struct SimulatedNetwork {
    config: NetworkConfig,
    /// Blocked links. If (a, b) is in this set, a cannot transmit to b.
    /// Blocks are directional - add both (a, b) and (b, a) for a bidirectional block.
    blocked: HashSet<(NodeIndex, NodeIndex)>,
}

impl SimulatedNetwork {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            blocked: HashSet::new(),
        }
    }

    /// Get network configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    // ─── Link Blocking ───

    /// Check if the direct link `from` -> `to` is blocked.
    pub fn is_blocked(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.blocked.contains(&(from, to))
    }

    /// Block the direct link `from` -> `to`.
    pub fn block_unidirectional(&mut self, from: NodeIndex, to: NodeIndex) {
        self.blocked.insert((from, to));
    }

    /// Block the direct link between two nodes in both directions.
    pub fn block_bidirectional(&mut self, a: NodeIndex, b: NodeIndex) {
        self.blocked.insert((a, b));
        self.blocked.insert((b, a));
    }

    /// Block every link of `node` to the other `node_count - 1` nodes.
    pub fn isolate_node(&mut self, node: NodeIndex, node_count: usize) {
        for other in 0..node_count as NodeIndex {
            if other != node {
                self.block_bidirectional(node, other);
            }
        }
    }

    /// Unblock the direct link `from` -> `to`.
    pub fn heal_unidirectional(&mut self, from: NodeIndex, to: NodeIndex) {
        self.blocked.remove(&(from, to));
    }

    /// Remove every block.
    pub fn heal_all(&mut self) {
        self.blocked.clear();
    }

    /// Get the number of blocked directional links.
    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    // ─── Packet Loss ───

    /// Check if a packet should be dropped based on the configured loss rate.
    /// Returns true if the packet should be dropped.
    pub fn should_drop_packet(&self, rng: &mut ChaCha8Rng) -> bool {
        self.config.packet_loss_rate > 0.0 && rng.gen::<f64>() < self.config.packet_loss_rate
    }

    /// Set the packet loss rate (0.0 - 1.0).
    pub fn set_packet_loss_rate(&mut self, rate: f64) {
        self.config.packet_loss_rate = rate.clamp(0.0, 1.0);
    }

    /// Get the current packet loss rate.
    pub fn packet_loss_rate(&self) -> f64 {
        self.config.packet_loss_rate
    }

    // ─── Reachability ───

    /// Whether `from` can transmit directly to `to`.
    pub fn has_link(&self, from: NodeIndex, to: NodeIndex, positions: &[Position]) -> bool {
        if from == to || self.is_blocked(from, to) {
            return false;
        }
        let (Some(a), Some(b)) = (positions.get(from as usize), positions.get(to as usize)) else {
            return false;
        };
        match self.config.radio_range {
            Some(range) => a.distance(b) <= range,
            None => true,
        }
    }

    /// Fewest links on any path from `from` to `to`, or `None` when no path
    /// exists. `positions` is indexed by node.
    pub fn hop_count(&self, from: NodeIndex, to: NodeIndex, positions: &[Position]) -> Option<u32> {
        let n = positions.len();
        if from as usize >= n || to as usize >= n {
            return None;
        }
        if from == to {
            return Some(0);
        }

        let mut hops = vec![None; n];
        hops[from as usize] = Some(0u32);
        let mut queue = VecDeque::from([from]);
        while let Some(node) = queue.pop_front() {
            let next = hops[node as usize].unwrap_or(0) + 1;
            for neighbour in 0..n as NodeIndex {
                if hops[neighbour as usize].is_none() && self.has_link(node, neighbour, positions) {
                    if neighbour == to {
                        return Some(next);
                    }
                    hops[neighbour as usize] = Some(next);
                    queue.push_back(neighbour);
                }
            }
        }
        None
    }

    // ─── Message Delivery Decision ───

    /// Determine if a message should be delivered from `from` to `to`.
    ///
    /// Returns the sampled end-to-end latency, or why the message is dropped.
    /// Reachability is checked before loss so an unreachable sink never
    /// consumes randomness.
    pub fn should_deliver(
        &self,
        from: NodeIndex,
        to: NodeIndex,
        positions: &[Position],
        rng: &mut ChaCha8Rng,
    ) -> Result<Duration, DropReason> {
        let Some(hops) = self.hop_count(from, to, positions) else {
            trace!(from, to, "No path");
            return Err(DropReason::Unreachable);
        };

        if self.should_drop_packet(rng) {
            return Err(DropReason::Loss);
        }

        let latency = self.sample_latency(hops, rng);
        trace!(from, to, hops, ?latency, "Delivering");
        Ok(latency)
    }

    /// Sample the latency of a path of `hops` links.
    pub fn sample_latency(&self, hops: u32, rng: &mut ChaCha8Rng) -> Duration {
        let base = self.config.hop_latency.as_secs_f64() * f64::from(hops.max(1));

        // Add jitter
        let jitter_range = base * self.config.jitter_fraction;
        let jitter = if jitter_range > 0.0 {
            rng.gen_range(-jitter_range..jitter_range)
        } else {
            0.0
        };
        let latency_secs = (base + jitter).max(0.000_1);

        Duration::from_secs_f64(latency_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Three nodes on a line, 200 m apart.
    fn line() -> Vec<Position> {
        vec![
            Position::new(0.0, 0.0, 0.0),
            Position::new(200.0, 0.0, 0.0),
            Position::new(400.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_latency_is_deterministic() {
        let network = SimulatedNetwork::new(NetworkConfig::default());
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);

        let latency1 = network.sample_latency(2, &mut rng1);
        let latency2 = network.sample_latency(2, &mut rng2);

        assert_eq!(latency1, latency2, "Same seed should produce same latency");
        // 4 ms +/- 10%
        assert!(latency1 >= Duration::from_micros(3600) && latency1 <= Duration::from_micros(4400));
    }

    #[test]
    fn test_hop_count_over_range_graph() {
        let network = SimulatedNetwork::new(NetworkConfig::default());
        let positions = line();

        assert_eq!(network.hop_count(0, 0, &positions), Some(0));
        assert_eq!(network.hop_count(0, 1, &positions), Some(1));
        assert_eq!(network.hop_count(0, 2, &positions), Some(2));
        assert_eq!(network.hop_count(0, 7, &positions), None);
    }

    #[test]
    fn test_out_of_range_is_unreachable() {
        let network = SimulatedNetwork::new(NetworkConfig {
            radio_range: Some(150.0),
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            network.should_deliver(0, 2, &line(), &mut rng),
            Err(DropReason::Unreachable)
        );
    }

    #[test]
    fn test_unlimited_range_is_single_hop() {
        let network = SimulatedNetwork::new(NetworkConfig {
            radio_range: None,
            ..Default::default()
        });
        assert_eq!(network.hop_count(0, 2, &line()), Some(1));
    }

    // ─── Blocking Tests ───

    #[test]
    fn test_unidirectional_block() {
        let mut network = SimulatedNetwork::new(NetworkConfig::default());
        let positions = line();

        network.block_unidirectional(0, 1);
        assert!(network.is_blocked(0, 1));
        assert!(!network.is_blocked(1, 0)); // Reverse direction still works

        assert_eq!(network.hop_count(0, 2, &positions), None);
        assert_eq!(network.hop_count(2, 0, &positions), Some(2));

        network.heal_unidirectional(0, 1);
        assert_eq!(network.hop_count(0, 2, &positions), Some(2));
    }

    #[test]
    fn test_isolate_node() {
        let mut network = SimulatedNetwork::new(NetworkConfig {
            radio_range: None,
            ..Default::default()
        });
        network.isolate_node(1, 3);
        assert_eq!(network.blocked_count(), 4);
        assert_eq!(network.hop_count(0, 1, &line()), None);
        assert_eq!(network.hop_count(0, 2, &line()), Some(1));

        network.heal_all();
        assert_eq!(network.blocked_count(), 0);
    }

    // ─── Packet Loss Tests ───

    #[test]
    fn test_no_packet_loss_by_default() {
        let network = SimulatedNetwork::new(NetworkConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..100 {
            assert!(!network.should_drop_packet(&mut rng));
        }
    }

    #[test]
    fn test_packet_loss_rate() {
        let mut network = SimulatedNetwork::new(NetworkConfig {
            packet_loss_rate: 0.5,
            ..Default::default()
        });

        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut drops = 0;
        let iterations = 10000;
        for _ in 0..iterations {
            if network.should_drop_packet(&mut rng) {
                drops += 1;
            }
        }

        let drop_rate = drops as f64 / iterations as f64;
        assert!(
            (0.45..0.55).contains(&drop_rate),
            "Expected ~50% drop rate, got {:.2}%",
            drop_rate * 100.0
        );

        // Clamping
        network.set_packet_loss_rate(1.5);
        assert_eq!(network.packet_loss_rate(), 1.0);
        network.set_packet_loss_rate(-0.5);
        assert_eq!(network.packet_loss_rate(), 0.0);
    }

    #[test]
    fn test_total_loss_drops_reachable_messages() {
        let network = SimulatedNetwork::new(NetworkConfig {
            packet_loss_rate: 1.0,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(
            network.should_deliver(0, 1, &line(), &mut rng),
            Err(DropReason::Loss)
        );
    }
}
