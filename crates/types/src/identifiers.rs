//! Identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in the environment's entity registry.
///
/// Indices are dense and assigned in creation order, so ascending index
/// order is the stable order observations and actions agree on.
pub type NodeIndex = u32;

/// Partition (cluster / hierarchy level) a node belongs to.
///
/// Observation and action builders select the entities of one designated
/// partition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PartitionId(pub u32);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition-{}", self.0)
    }
}

impl From<u32> for PartitionId {
    fn from(value: u32) -> Self {
        PartitionId(value)
    }
}
