//! Fixed-shape numeric containers.

use crate::space::ElementType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors constructing a [`BoxContainer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("container holds {actual} elements but shape {shape:?} requires {expected}")]
    ShapeMismatch {
        shape: Vec<u32>,
        expected: usize,
        actual: usize,
    },
}

/// Typed element storage of a [`BoxContainer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoxData {
    U8(Vec<u8>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl BoxData {
    /// Convert `f64` values into storage of the given element type.
    ///
    /// Integer conversions use saturating `as` casts: fractional parts are
    /// truncated toward zero and out-of-range values clamp to the type bounds.
    pub fn from_f64(element_type: ElementType, values: &[f64]) -> Self {
        match element_type {
            ElementType::U8 => BoxData::U8(values.iter().map(|&v| v as u8).collect()),
            ElementType::I32 => BoxData::I32(values.iter().map(|&v| v as i32).collect()),
            ElementType::U32 => BoxData::U32(values.iter().map(|&v| v as u32).collect()),
            ElementType::I64 => BoxData::I64(values.iter().map(|&v| v as i64).collect()),
            ElementType::U64 => BoxData::U64(values.iter().map(|&v| v as u64).collect()),
            ElementType::F32 => BoxData::F32(values.iter().map(|&v| v as f32).collect()),
            ElementType::F64 => BoxData::F64(values.to_vec()),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            BoxData::U8(_) => ElementType::U8,
            BoxData::I32(_) => ElementType::I32,
            BoxData::U32(_) => ElementType::U32,
            BoxData::I64(_) => ElementType::I64,
            BoxData::U64(_) => ElementType::U64,
            BoxData::F32(_) => ElementType::F32,
            BoxData::F64(_) => ElementType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BoxData::U8(v) => v.len(),
            BoxData::I32(v) => v.len(),
            BoxData::U32(v) => v.len(),
            BoxData::I64(v) => v.len(),
            BoxData::U64(v) => v.len(),
            BoxData::F32(v) => v.len(),
            BoxData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            BoxData::U8(v) => v.get(index).map(|&x| f64::from(x)),
            BoxData::I32(v) => v.get(index).map(|&x| f64::from(x)),
            BoxData::U32(v) => v.get(index).map(|&x| f64::from(x)),
            BoxData::I64(v) => v.get(index).map(|&x| x as f64),
            BoxData::U64(v) => v.get(index).map(|&x| x as f64),
            BoxData::F32(v) => v.get(index).map(|&x| f64::from(x)),
            BoxData::F64(v) => v.get(index).copied(),
        }
    }

    /// All elements widened to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get_f64(i)).collect()
    }
}

/// A fixed-shape numeric container: an observation or an action.
///
/// Deserialization goes through [`BoxContainer::new`], so a decoded container
/// always holds exactly the element count its shape requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoxContainer")]
pub struct BoxContainer {
    shape: Vec<u32>,
    data: BoxData,
}

#[derive(Deserialize)]
struct RawBoxContainer {
    shape: Vec<u32>,
    data: BoxData,
}

impl TryFrom<RawBoxContainer> for BoxContainer {
    type Error = ContainerError;

    fn try_from(raw: RawBoxContainer) -> Result<Self, Self::Error> {
        Self::new(raw.shape, raw.data)
    }
}

impl BoxContainer {
    /// Create a container, checking the element count against the shape.
    pub fn new(shape: Vec<u32>, data: BoxData) -> Result<Self, ContainerError> {
        let expected: usize = shape.iter().map(|&d| d as usize).product();
        if shape.is_empty() || data.len() != expected {
            return Err(ContainerError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional container over `data`.
    pub fn vector(data: BoxData) -> Self {
        Self {
            shape: vec![data.len() as u32],
            data,
        }
    }

    /// Build a container of `element_type` from `f64` values.
    pub fn from_f64(
        element_type: ElementType,
        shape: Vec<u32>,
        values: &[f64],
    ) -> Result<Self, ContainerError> {
        Self::new(shape, BoxData::from_f64(element_type, values))
    }

    pub(crate) fn from_parts(shape: Vec<u32>, data: BoxData) -> Self {
        Self { shape, data }
    }

    pub fn shape(&self) -> &[u32] {
        &self.shape
    }

    pub fn data(&self) -> &BoxData {
        &self.data
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.data.get_f64(index)
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.data.to_f64()
    }
}

impl fmt::Display for BoxContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}[", self.element_type(), self.shape)?;
        for (i, v) in self.to_f64().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_element_count() {
        let err = BoxContainer::new(vec![6], BoxData::U32(vec![1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            ContainerError::ShapeMismatch {
                shape: vec![6],
                expected: 6,
                actual: 3,
            }
        );

        let ok = BoxContainer::new(vec![2, 2], BoxData::F32(vec![1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(ok.len(), 4);
        assert_eq!(ok.shape(), &[2, 2]);
    }

    #[test]
    fn test_from_f64_truncates_integers() {
        let c = BoxContainer::from_f64(ElementType::U32, vec![3], &[600.9, 616.0, -3.0]).unwrap();
        assert_eq!(c.data(), &BoxData::U32(vec![600, 616, 0]));
        assert_eq!(c.to_f64(), vec![600.0, 616.0, 0.0]);
    }

    #[test]
    fn test_vector_shape_follows_data() {
        let c = BoxContainer::vector(BoxData::F64(vec![0.5; 4]));
        assert_eq!(c.shape(), &[4]);
        assert_eq!(c.element_type(), ElementType::F64);
        assert_eq!(c.get(3), Some(0.5));
        assert_eq!(c.get(4), None);
    }

    #[test]
    fn test_display() {
        let c = BoxContainer::vector(BoxData::U32(vec![450, 460]));
        assert_eq!(c.to_string(), "uint32[2][450, 460]");
    }

    #[test]
    fn test_bincode_preserves_element_type() {
        let c = BoxContainer::vector(BoxData::I64(vec![-1, 2]));
        let config = bincode::config::standard();
        let bytes = bincode::serde::encode_to_vec(&c, config).unwrap();
        let (decoded, _): (BoxContainer, usize) =
            bincode::serde::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(decoded.element_type(), ElementType::I64);
        assert_eq!(decoded, c);
    }

    #[test]
    fn test_decode_rejects_inconsistent_shape() {
        let config = bincode::config::standard();
        for shape in [vec![99u32, 3], vec![]] {
            let bytes =
                bincode::serde::encode_to_vec((shape, BoxData::U32(vec![450; 6])), config).unwrap();
            let decoded: Result<(BoxContainer, usize), _> =
                bincode::serde::decode_from_slice(&bytes, config);
            assert!(decoded.is_err());
        }
    }
}
