//! Node placement.

use crate::world::NodeWorld;
use meshgym_types::{NodeIndex, PartitionId, Position};
use std::ops::Range;

/// Row-first grid placement: nodes fill a row of `grid_width` columns before
/// starting the next row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub min_x: f64,
    pub min_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub grid_width: u32,
}

impl GridLayout {
    /// Position of the `n`-th node placed on this grid.
    pub fn position(&self, n: u32) -> Position {
        let width = self.grid_width.max(1);
        Position::new(
            self.min_x + f64::from(n % width) * self.delta_x,
            self.min_y + f64::from(n / width) * self.delta_y,
            0.0,
        )
    }
}

/// A group of nodes sharing a partition and a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroup {
    pub partition: PartitionId,
    pub count: u32,
    pub layout: GridLayout,
}

/// Groups of nodes created in order. Node indices follow creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    groups: Vec<NodeGroup>,
}

impl Default for Topology {
    /// Six relays in partition 0 on a row at y = 0, 16 m apart, between three
    /// four-node clusters (partitions 1-3) on 5 m grids.
    fn default() -> Self {
        let cluster = |partition, min_x, min_y| NodeGroup {
            partition: PartitionId(partition),
            count: 4,
            layout: GridLayout {
                min_x,
                min_y,
                delta_x: 5.0,
                delta_y: 5.0,
                grid_width: 5,
            },
        };
        Self {
            groups: vec![
                NodeGroup {
                    partition: PartitionId(0),
                    count: 6,
                    layout: GridLayout {
                        min_x: 600.0,
                        min_y: 0.0,
                        delta_x: 16.0,
                        delta_y: 5.0,
                        grid_width: 6,
                    },
                },
                cluster(1, 500.0, 205.0),
                cluster(2, 650.0, -205.0),
                cluster(3, 750.0, 205.0),
            ],
        }
    }
}

impl Topology {
    pub fn new(groups: Vec<NodeGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[NodeGroup] {
        &self.groups
    }

    /// Indices the `group`-th group's nodes receive.
    pub fn group_range(&self, group: usize) -> Option<Range<NodeIndex>> {
        let start: u32 = self.groups.get(..group)?.iter().map(|g| g.count).sum();
        let count = self.groups.get(group)?.count;
        Some(start..start + count)
    }

    pub fn node_count(&self) -> usize {
        self.groups.iter().map(|g| g.count as usize).sum()
    }

    /// Create every node.
    pub fn build(&self) -> NodeWorld {
        let mut world = NodeWorld::new();
        for group in &self.groups {
            for n in 0..group.count {
                world.add_node(group.partition, group.layout.position(n));
            }
        }
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgym_core::{select_partition, Entity};

    #[test]
    fn test_default_layout() {
        let topology = Topology::default();
        let world = topology.build();
        assert_eq!(world.len(), 18);
        assert_eq!(topology.node_count(), 18);

        let relays = select_partition(&world, PartitionId(0));
        assert_eq!(relays, vec![0, 1, 2, 3, 4, 5]);
        let xs: Vec<f64> = relays
            .iter()
            .map(|&i| world.node(i).unwrap().scalar_attribute())
            .collect();
        assert_eq!(xs, vec![600.0, 616.0, 632.0, 648.0, 664.0, 680.0]);

        assert_eq!(topology.group_range(1), Some(6..10));
        assert_eq!(topology.group_range(3), Some(14..18));
        assert_eq!(topology.group_range(4), None);
        assert_eq!(world.node(6).unwrap().position(), Position::new(500.0, 205.0, 0.0));
        assert_eq!(world.node(17).unwrap().position(), Position::new(765.0, 205.0, 0.0));
    }

    #[test]
    fn test_default_range_links_clusters_only_through_relays() {
        use meshgym_network_memory::{NetworkConfig, SimulatedNetwork};

        let network = SimulatedNetwork::new(NetworkConfig::default());
        let mut world = Topology::default().build();
        let positions = world.positions();

        // Clusters 1 and 3 are 235 m apart at their closest.
        assert!(!network.has_link(9, 14, &positions));
        assert!(!network.has_link(17, 9, &positions));
        assert_eq!(network.hop_count(17, 6, &positions), Some(4));

        for (i, x) in (0..6).zip([450.0, 460.0, 470.0, 480.0, 490.0, 500.0]) {
            world.node_mut(i).unwrap().set_scalar_attribute(x);
        }
        assert_eq!(network.hop_count(17, 6, &world.positions()), None);
    }

    #[test]
    fn test_grid_wraps_rows() {
        let layout = GridLayout {
            min_x: 0.0,
            min_y: 0.0,
            delta_x: 5.0,
            delta_y: 5.0,
            grid_width: 2,
        };
        assert_eq!(layout.position(3), Position::new(5.0, 5.0, 0.0));
    }
}
