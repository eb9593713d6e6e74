//! Bounded box space descriptors.

use crate::container::{BoxContainer, BoxData};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Numeric element type of a box space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    U8,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ElementType {
    /// Canonical lowercase name, e.g. `uint32`.
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::U8 => "uint8",
            ElementType::I32 => "int32",
            ElementType::U32 => "uint32",
            ElementType::I64 => "int64",
            ElementType::U64 => "uint64",
            ElementType::F32 => "float32",
            ElementType::F64 => "float64",
        }
    }

    /// Whether values of this type are integral.
    pub fn is_integer(&self) -> bool {
        !matches!(self, ElementType::F32 | ElementType::F64)
    }

    /// Parse a canonical name (as returned by [`name`](Self::name)).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uint8" => Some(ElementType::U8),
            "int32" => Some(ElementType::I32),
            "uint32" => Some(ElementType::U32),
            "int64" => Some(ElementType::I64),
            "uint64" => Some(ElementType::U64),
            "float32" => Some(ElementType::F32),
            "float64" => Some(ElementType::F64),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors constructing a [`SpaceDescriptor`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    #[error("space shape must have at least one dimension")]
    EmptyShape,

    #[error("space dimension {index} is zero")]
    ZeroDimension { index: usize },

    #[error("space bounds are invalid: low {low} must be finite and below high {high}")]
    InvalidBounds { low: f64, high: f64 },
}

/// A bounded, fixed-shape, typed numeric box.
///
/// Immutable once constructed. Bounds are advisory metadata for the agent:
/// containers built from live state are not clamped into `[low, high)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpaceDescriptor")]
pub struct SpaceDescriptor {
    low: f64,
    high: f64,
    shape: Vec<u32>,
    element_type: ElementType,
}

#[derive(Deserialize)]
struct RawSpaceDescriptor {
    low: f64,
    high: f64,
    shape: Vec<u32>,
    element_type: ElementType,
}

impl TryFrom<RawSpaceDescriptor> for SpaceDescriptor {
    type Error = SpaceError;

    fn try_from(raw: RawSpaceDescriptor) -> Result<Self, Self::Error> {
        Self::new(raw.low, raw.high, raw.shape, raw.element_type)
    }
}

impl SpaceDescriptor {
    /// Create a new box space.
    pub fn new(
        low: f64,
        high: f64,
        shape: Vec<u32>,
        element_type: ElementType,
    ) -> Result<Self, SpaceError> {
        if shape.is_empty() {
            return Err(SpaceError::EmptyShape);
        }
        if let Some(index) = shape.iter().position(|&d| d == 0) {
            return Err(SpaceError::ZeroDimension { index });
        }
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(SpaceError::InvalidBounds { low, high });
        }
        Ok(Self {
            low,
            high,
            shape,
            element_type,
        })
    }

    /// One-dimensional box of `len` elements.
    pub fn vector(
        low: f64,
        high: f64,
        len: u32,
        element_type: ElementType,
    ) -> Result<Self, SpaceError> {
        Self::new(low, high, vec![len], element_type)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn shape(&self) -> &[u32] {
        &self.shape
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Size of the leading dimension (`shape[0]`): the controllable entity count.
    pub fn leading_dim(&self) -> usize {
        self.shape[0] as usize
    }

    /// Total number of elements (product of the shape).
    pub fn num_elements(&self) -> usize {
        self.shape.iter().map(|&d| d as usize).product()
    }

    /// Whether a container matches this space's shape and type and every
    /// value lies within `[low, high)`.
    pub fn contains(&self, container: &BoxContainer) -> bool {
        container.shape() == self.shape.as_slice()
            && container.element_type() == self.element_type
            && container
                .to_f64()
                .iter()
                .all(|&v| v >= self.low && v < self.high)
    }

    /// Sample a container uniformly from `[low, high)`.
    ///
    /// Integer element types take the floor of the sampled value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BoxContainer {
        let values: Vec<f64> = (0..self.num_elements())
            .map(|_| {
                let v = rng.gen_range(self.low..self.high);
                if self.element_type.is_integer() {
                    v.floor()
                } else {
                    v
                }
            })
            .collect();
        BoxContainer::from_parts(
            self.shape.clone(),
            BoxData::from_f64(self.element_type, &values),
        )
    }
}

impl fmt::Display for SpaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Box(low={}, high={}, shape={:?}, dtype={})",
            self.low, self.high, self.shape, self.element_type
        )
    }
}
