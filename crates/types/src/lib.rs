//! Core value types for meshgym.
//!
//! This crate provides the foundational types used throughout the
//! environment-agent loop:
//!
//! - **Identifiers**: [`NodeIndex`], [`PartitionId`]
//! - **Spaces**: [`SpaceDescriptor`] and [`ElementType`], the bounded box
//!   description advertised to the agent before the first step
//! - **Containers**: [`BoxContainer`], the fixed-shape numeric payload used
//!   for both observations and actions
//! - **Geometry**: [`Position`] of a simulated node
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend on
//! any other workspace crates, making it the foundation layer.

mod container;
mod identifiers;
mod position;
mod space;

pub use container::{BoxContainer, BoxData, ContainerError};
pub use identifiers::{NodeIndex, PartitionId};
pub use position::Position;
pub use space::{ElementType, SpaceDescriptor, SpaceError};
