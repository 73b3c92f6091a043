//! CPU-side geometry types, accessors and generators.
//!
//! This module provides GPU-agnostic geometry data:
//!
//! - [`BufferGeometry`] - Flat position/normal/uv streams with optional indices
//! - [`IndexBuffer`] / [`IndexFormat`] - Face index stream and its width
//! - [`accessor`] - Validated attribute, vertex and face access
//! - Generators for common shapes (sphere, quad, box)

pub mod accessor;
pub mod generators;
mod geometry;

pub use geometry::{BufferGeometry, IndexBuffer, IndexFormat};

use crate::pool::Handle;

/// Handle to a [`BufferGeometry`] stored in a [`SceneGraph`](crate::scene::SceneGraph).
pub type GeometryHandle = Handle<BufferGeometry>;
