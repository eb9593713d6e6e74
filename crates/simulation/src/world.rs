//! Simulated nodes: the controllable entities of the environment.

use meshgym_core::{Entity, EntityRegistry};
use meshgym_types::{NodeIndex, PartitionId, Position};

/// A simulated network node.
///
/// Its controllable attribute is the x coordinate of its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    index: NodeIndex,
    partition: PartitionId,
    position: Position,
    initial_position: Position,
}

impl Node {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Position the node was created at.
    pub fn initial_position(&self) -> Position {
        self.initial_position
    }
}

impl Entity for Node {
    fn partition(&self) -> PartitionId {
        self.partition
    }

    fn scalar_attribute(&self) -> f64 {
        self.position.x
    }

    fn set_scalar_attribute(&mut self, value: f64) {
        self.position.x = value;
    }
}

/// Registry of every node in the simulation, indexed by creation order.
#[derive(Debug, Clone, Default)]
pub struct NodeWorld {
    nodes: Vec<Node>,
}

impl NodeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node and return its index.
    pub fn add_node(&mut self, partition: PartitionId, position: Position) -> NodeIndex {
        let index = self.nodes.len() as NodeIndex;
        self.nodes.push(Node {
            index,
            partition,
            position,
            initial_position: position,
        });
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.as_slice().get(index as usize)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.as_mut_slice().get_mut(index as usize)
    }

    /// Current positions, indexed by node.
    pub fn positions(&self) -> Vec<Position> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Move every node back to where it was created.
    pub fn restore_initial_positions(&mut self) {
        for node in &mut self.nodes {
            node.position = node.initial_position;
        }
    }
}

impl EntityRegistry for NodeWorld {
    type Entity = Node;

    fn count(&self) -> usize {
        self.nodes.len()
    }

    fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.node(index)
    }

    fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.node_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_attribute_is_x() {
        let mut world = NodeWorld::new();
        let i = world.add_node(PartitionId(0), Position::new(600.0, 0.0, 0.0));
        let node = world.get_mut(i).unwrap();
        node.set_scalar_attribute(450.0);
        assert_eq!(node.position(), Position::new(450.0, 0.0, 0.0));

        world.restore_initial_positions();
        assert_eq!(world.node(i).unwrap().scalar_attribute(), 600.0);
    }

    #[test]
    fn test_lookup_by_index() {
        let mut world = NodeWorld::new();
        world.add_node(PartitionId(0), Position::new(600.0, 0.0, 0.0));
        let i = world.add_node(PartitionId(1), Position::new(500.0, 205.0, 0.0));

        assert_eq!(world.node(i).map(Node::index), Some(1));
        assert_eq!(world.get(i).map(Entity::partition), Some(PartitionId(1)));
        assert!(world.node(2).is_none());
        assert!(world.node_mut(2).is_none());
        assert!(world.get_mut(2).is_none());
    }
}
