//! Action validation and application.

use crate::entity::{select_partition, Entity, EntityRegistry};
use meshgym_types::{BoxContainer, ElementType, PartitionId, SpaceDescriptor};
use thiserror::Error;

/// Reasons an action is rejected. A rejected action changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("action has {actual} elements, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("action shape {actual:?} does not match advertised {expected:?}")]
    Shape { expected: Vec<u32>, actual: Vec<u32> },

    #[error("action element type {actual} does not match advertised {expected}")]
    ElementType {
        expected: ElementType,
        actual: ElementType,
    },

    #[error("action space expects {expected} entities but {actual} are selected")]
    EntityCount { expected: usize, actual: usize },
}

/// Validates actions against the action space and writes them onto the
/// selected entities.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    space: SpaceDescriptor,
    partition: PartitionId,
}

impl ActionExecutor {
    pub fn new(space: SpaceDescriptor, partition: PartitionId) -> Self {
        Self { space, partition }
    }

    pub fn space(&self) -> &SpaceDescriptor {
        &self.space
    }

    /// Check `action` against the space and the current entity selection.
    pub fn validate<R: EntityRegistry + ?Sized>(
        &self,
        action: &BoxContainer,
        registry: &R,
    ) -> Result<(), ValidationError> {
        let expected = self.space.num_elements();
        if action.len() != expected {
            return Err(ValidationError::Length {
                expected,
                actual: action.len(),
            });
        }
        if action.shape() != self.space.shape() {
            return Err(ValidationError::Shape {
                expected: self.space.shape().to_vec(),
                actual: action.shape().to_vec(),
            });
        }
        if action.element_type() != self.space.element_type() {
            return Err(ValidationError::ElementType {
                expected: self.space.element_type(),
                actual: action.element_type(),
            });
        }
        let selected = select_partition(registry, self.partition).len();
        if selected != expected {
            return Err(ValidationError::EntityCount {
                expected,
                actual: selected,
            });
        }
        Ok(())
    }

    /// Apply `action` all-or-nothing.
    ///
    /// Element `k` is written to the `k`-th selected entity. Values outside
    /// the space bounds are written as-is.
    pub fn apply<R: EntityRegistry + ?Sized>(
        &self,
        action: &BoxContainer,
        registry: &mut R,
    ) -> Result<(), ValidationError> {
        self.validate(action, registry)?;

        let selected = select_partition(registry, self.partition);
        for (&index, value) in selected.iter().zip(action.to_f64()) {
            if let Some(entity) = registry.get_mut(index) {
                entity.set_scalar_attribute(value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::fixture::*;
    use meshgym_types::BoxData;

    fn executor() -> ActionExecutor {
        let space = SpaceDescriptor::vector(400.0, 800.0, 6, ElementType::U32).unwrap();
        ActionExecutor::new(space, PartitionId(0))
    }

    #[test]
    fn test_apply_writes_in_entity_order() {
        let mut dots = eighteen();
        let action = BoxContainer::vector(BoxData::U32(vec![450, 460, 470, 480, 490, 500]));

        executor().apply(&action, &mut dots).unwrap();

        let xs: Vec<f64> = dots[..6].iter().map(|d| d.x).collect();
        assert_eq!(xs, vec![450.0, 460.0, 470.0, 480.0, 490.0, 500.0]);
        // Other partitions untouched.
        assert_eq!(dots[6..], eighteen()[6..]);
    }

    #[test]
    fn test_short_action_changes_nothing() {
        let mut dots = eighteen();
        let before = dots.clone();
        let action = BoxContainer::vector(BoxData::U32(vec![450, 460, 470, 480, 490]));

        assert_eq!(
            executor().apply(&action, &mut dots),
            Err(ValidationError::Length {
                expected: 6,
                actual: 5
            })
        );
        assert_eq!(dots, before);
    }

    #[test]
    fn test_reshaped_action_changes_nothing() {
        let mut dots = eighteen();
        let action =
            BoxContainer::new(vec![2, 3], BoxData::U32(vec![450, 460, 470, 480, 490, 500])).unwrap();

        assert_eq!(
            executor().apply(&action, &mut dots),
            Err(ValidationError::Shape {
                expected: vec![6],
                actual: vec![2, 3],
            })
        );
        assert_eq!(dots, eighteen());
    }

    #[test]
    fn test_wrong_element_type_rejected() {
        let mut dots = eighteen();
        let action = BoxContainer::vector(BoxData::F32(vec![450.0; 6]));
        assert_eq!(
            executor().apply(&action, &mut dots),
            Err(ValidationError::ElementType {
                expected: ElementType::U32,
                actual: ElementType::F32,
            })
        );
        assert_eq!(dots, eighteen());
    }

    #[test]
    fn test_entity_drift_rejected() {
        let mut dots = eighteen();
        dots.truncate(4);
        let action = BoxContainer::vector(BoxData::U32(vec![450; 6]));
        assert_eq!(
            executor().apply(&action, &mut dots),
            Err(ValidationError::EntityCount {
                expected: 6,
                actual: 4
            })
        );
        assert_eq!(dots[0].x, 600.0);
    }

    #[test]
    fn test_out_of_bounds_values_are_written() {
        let mut dots = eighteen();
        let action = BoxContainer::vector(BoxData::U32(vec![0, 1, 2, 3, 4, 9000]));
        executor().apply(&action, &mut dots).unwrap();
        assert_eq!(dots[5].x, 9000.0);
    }
}
