//! Seams onto the externally owned set of controllable entities.

use meshgym_types::{NodeIndex, PartitionId};

/// A controllable unit of the environment.
///
/// The core never creates or destroys entities. It reads and writes exactly
/// one scalar attribute per entity per step.
pub trait Entity {
    fn partition(&self) -> PartitionId;

    fn scalar_attribute(&self) -> f64;

    fn set_scalar_attribute(&mut self, value: f64);
}

/// Indexed access to the environment's entities.
pub trait EntityRegistry {
    type Entity: Entity;

    fn count(&self) -> usize;

    fn get(&self, index: NodeIndex) -> Option<&Self::Entity>;

    fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Self::Entity>;
}

impl<E: Entity> EntityRegistry for Vec<E> {
    type Entity = E;

    fn count(&self) -> usize {
        self.len()
    }

    fn get(&self, index: NodeIndex) -> Option<&E> {
        self.as_slice().get(index as usize)
    }

    fn get_mut(&mut self, index: NodeIndex) -> Option<&mut E> {
        self.as_mut_slice().get_mut(index as usize)
    }
}

/// Indices of every entity in `partition`, in ascending index order.
///
/// This is the stable order shared by observations and actions.
pub fn select_partition<R: EntityRegistry + ?Sized>(
    registry: &R,
    partition: PartitionId,
) -> Vec<NodeIndex> {
    (0..registry.count() as NodeIndex)
        .filter(|&i| {
            registry
                .get(i)
                .is_some_and(|entity| entity.partition() == partition)
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixture::*;
    use super::*;

    #[test]
    fn test_select_partition_is_ascending_and_filtered() {
        let mut dots = eighteen();
        // Interleave a partition-0 entity after the clusters.
        dots.push(Dot {
            partition: PartitionId(0),
            x: 1.0,
        });
        assert_eq!(
            select_partition(&dots, PartitionId(0)),
            vec![0, 1, 2, 3, 4, 5, 18]
        );
        assert_eq!(select_partition(&dots, PartitionId(2)), vec![10, 11, 12, 13]);
        assert!(select_partition(&dots, PartitionId(9)).is_empty());
    }
}
