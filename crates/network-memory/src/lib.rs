//! Deterministic in-memory network for simulation.
//!
//! Provides [`SimulatedNetwork`] with configurable per-hop latency, packet
//! loss, directional link blocking and radio-range reachability, all driven
//! by a seeded RNG for reproducibility.
//!
//! Reachability is evaluated over the unit-disk graph of the nodes' current
//! positions: two nodes share a link when they are within radio range of
//! each other. This is an idealised predicate, not a propagation or routing
//! model.

mod network;

pub use network::{DropReason, NetworkConfig, SimulatedNetwork};
