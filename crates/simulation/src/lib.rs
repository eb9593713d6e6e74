//! Deterministic simulation runner.
//!
//! This crate provides the discrete-event engine the step loop runs inside.
//! Given the same seed and the same agent decisions, it produces identical
//! results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Event Queue (BTreeMap<EventKey, SimEvent>)     │ │
//! │  │     Ordered by: time, priority, node, sequence     │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     StepScheduler                                  │ │
//! │  │     NodeWorld (entities) + SimulatedNetwork        │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     StepActions → schedule events, notify agent    │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Agent notifications run inline: the engine thread blocks on the
//! [`AgentTransport`](meshgym_core::AgentTransport) and no event is processed
//! until the round-trip completes.

mod event_queue;
mod runner;
mod topology;
mod world;

pub use meshgym_network_memory::{DropReason, NetworkConfig, SimulatedNetwork};
pub use runner::{RunnerError, SimulationRunner, SimulationStats};
pub use topology::{GridLayout, NodeGroup, Topology};
pub use world::{Node, NodeWorld};
