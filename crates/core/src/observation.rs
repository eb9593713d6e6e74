//! Observation building.

use crate::entity::{select_partition, Entity, EntityRegistry};
use meshgym_types::{BoxContainer, BoxData, NodeIndex, PartitionId, SpaceDescriptor};
use thiserror::Error;

/// The controllable entity set no longer matches the advertised shape.
///
/// Indicates the registry's cardinality drifted after the spaces were
/// advertised. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observation space advertises {expected} entities but {actual} are selected")]
pub struct SpaceMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Packs the scalar attribute of every entity in one partition into a
/// container matching the observation space.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    space: SpaceDescriptor,
    partition: PartitionId,
}

impl ObservationBuilder {
    pub fn new(space: SpaceDescriptor, partition: PartitionId) -> Self {
        Self { space, partition }
    }

    pub fn space(&self) -> &SpaceDescriptor {
        &self.space
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    /// Stable entity order: ascending index, filtered to the partition.
    pub fn select<R: EntityRegistry + ?Sized>(&self, registry: &R) -> Vec<NodeIndex> {
        select_partition(registry, self.partition)
    }

    /// Build the observation from current entity state.
    ///
    /// Values are converted to the advertised element type but not clamped
    /// into the space bounds.
    pub fn build<R: EntityRegistry + ?Sized>(
        &self,
        registry: &R,
    ) -> Result<BoxContainer, SpaceMismatch> {
        let selected = self.select(registry);
        let expected = self.space.num_elements();
        if selected.len() != expected {
            return Err(SpaceMismatch {
                expected,
                actual: selected.len(),
            });
        }

        let values: Vec<f64> = selected
            .iter()
            .filter_map(|&i| registry.get(i))
            .map(Entity::scalar_attribute)
            .collect();

        BoxContainer::new(
            self.space.shape().to_vec(),
            BoxData::from_f64(self.space.element_type(), &values),
        )
        .map_err(|_| SpaceMismatch {
            expected,
            actual: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::fixture::*;
    use meshgym_types::ElementType;

    fn builder() -> ObservationBuilder {
        let space = SpaceDescriptor::vector(400.0, 800.0, 6, ElementType::U32).unwrap();
        ObservationBuilder::new(space, PartitionId(0))
    }

    #[test]
    fn test_build_length_matches_leading_dim() {
        let dots = eighteen();
        let obs = builder().build(&dots).unwrap();
        assert_eq!(obs.len(), 6);
        assert_eq!(obs.shape(), &[6]);
        assert_eq!(obs.element_type(), ElementType::U32);
        assert_eq!(
            obs.data(),
            &BoxData::U32(vec![600, 616, 632, 648, 664, 680])
        );
    }

    #[test]
    fn test_build_does_not_clamp_to_bounds() {
        let mut dots = eighteen();
        dots[0].x = 950.7;
        dots[1].x = 12.0;
        let obs = builder().build(&dots).unwrap();
        assert_eq!(obs.get(0), Some(950.0));
        assert_eq!(obs.get(1), Some(12.0));
    }

    #[test]
    fn test_build_is_idempotent() {
        let dots = eighteen();
        let b = builder();
        assert_eq!(b.build(&dots).unwrap(), b.build(&dots).unwrap());
    }

    #[test]
    fn test_build_reports_cardinality_drift() {
        let mut dots = eighteen();
        dots[5].partition = PartitionId(1);
        assert_eq!(
            builder().build(&dots),
            Err(SpaceMismatch {
                expected: 6,
                actual: 5
            })
        );
    }
}
