//! # Scene Utils
//!
//! Geometry access and scene-graph maintenance for retained-mode 3D scenes.
//!
//! - [`mesh::accessor`]: validated position/normal/uv/index access, vertex
//!   and face addressing, surface area
//! - [`scene`]: arena scene graph with reference-counted resources, mesh
//!   queries, ungrouping, bounding boxes, recursive disposal
//! - [`math`]: nalgebra aliases, transform helpers, decimal rounding

pub mod error;
pub mod material;
pub mod math;
pub mod mesh;
pub mod pool;
pub mod profiling;
pub mod scene;
pub mod texture;

pub use error::{Outcome, SceneError, SceneResult, SceneWarning};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
