//! Error and warning types.
//!
//! Failures come in two severities:
//!
//! - [`SceneError`]: hard failures (malformed geometry, unknown nodes,
//!   missing attributes, out-of-range indices). Returned through
//!   [`SceneResult`] and abort the current operation.
//! - [`SceneWarning`]: soft failures (deleting a non-mesh, ungrouping a
//!   parentless node, rounding a non-vector). Collected in an [`Outcome`]
//!   next to the fallback value and logged with `log::warn!`, so batch
//!   callers can skip the entry and continue.

use std::fmt;

use thiserror::Error;

use crate::scene::NodeId;

/// Optional geometry attribute streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Per-vertex normals.
    Normal,
    /// Per-vertex texture coordinates.
    Uv,
    /// Face index stream.
    Index,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Uv => write!(f, "uv"),
            Self::Index => write!(f, "index"),
        }
    }
}

/// Why a geometry is not a usable buffer geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryDefect {
    #[error("geometry has been disposed")]
    Disposed,
    #[error("position stream length {len} is not a multiple of 3")]
    PositionLength { len: usize },
    #[error("non-indexed position stream length {len} is not a multiple of 9")]
    NonIndexedLayout { len: usize },
    #[error("index stream length {len} is not a multiple of 3")]
    IndexLength { len: usize },
    #[error("index {value} at offset {offset} exceeds vertex count {vertex_count}")]
    IndexOutOfBounds {
        offset: usize,
        value: u32,
        vertex_count: usize,
    },
    #[error("normal stream length {actual} does not match expected {expected}")]
    NormalLength { expected: usize, actual: usize },
    #[error("uv stream length {actual} does not match expected {expected}")]
    UvLength { expected: usize, actual: usize },
}

/// Hard failures of the geometry accessor and scene utilities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("not a buffer geometry: {0}")]
    NotBufferGeometry(#[from] GeometryDefect),
    #[error("{0} is not a live scene object")]
    NotObject(NodeId),
    #[error("{0} is not a mesh")]
    NotMesh(NodeId),
    #[error("material has been disposed")]
    DisposedMaterial,
    #[error("no {0} attribute found")]
    MissingAttribute(AttributeKind),
    #[error("index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot parent {child} under {parent}: hierarchy would contain a cycle")]
    CyclicHierarchy { child: NodeId, parent: NodeId },
    #[error("world matrix of {0} is not invertible")]
    SingularTransform(NodeId),
}

/// Result alias for hard-failing operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Soft failures: reported and skipped, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneWarning {
    #[error("{0} does not exist, nothing to do")]
    MissingNode(NodeId),
    #[error("{0} is not a mesh, nothing to dispose")]
    NotAMesh(NodeId),
    #[error("{0} has no parent, relocated meshes were promoted to scene roots")]
    NoParent(NodeId),
    #[error("expected a 3-component vector, got {components} components")]
    NotAVector { components: usize },
    #[error("{0} has non-uniform scale, baked normals may be distorted")]
    NonUniformScaleBake(NodeId),
    #[error("geometry of {0} is shared, baking into a private copy")]
    SharedGeometryCloned(NodeId),
    #[error("{0} references a resource that was already disposed")]
    StaleResource(NodeId),
}

/// A value produced by a soft-failing operation, plus any warnings raised.
///
/// Warnings are logged as they are recorded.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    /// The produced (or fallback) value.
    pub value: T,
    /// Soft failures encountered while producing it.
    pub warnings: Vec<SceneWarning>,
}

impl<T> Outcome<T> {
    /// A clean outcome.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// An outcome carrying a single warning.
    pub fn warned(value: T, warning: SceneWarning) -> Self {
        let mut outcome = Self::ok(value);
        outcome.warn(warning);
        outcome
    }

    /// Record a warning.
    pub fn warn(&mut self, warning: SceneWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Returns `true` if no warning was raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SceneError::MissingAttribute(AttributeKind::Uv);
        assert_eq!(err.to_string(), "no uv attribute found");

        let err = SceneError::IndexOutOfRange { index: 3, len: 3 };
        assert_eq!(err.to_string(), "index 3 out of range (0..3)");

        let err: SceneError = GeometryDefect::NonIndexedLayout { len: 12 }.into();
        assert_eq!(
            err.to_string(),
            "not a buffer geometry: non-indexed position stream length 12 is not a multiple of 9"
        );
    }

    #[test]
    fn test_outcome_collects_warnings() {
        let mut outcome = Outcome::ok(1);
        assert!(outcome.is_clean());

        outcome.warn(SceneWarning::NotAVector { components: 2 });
        assert!(!outcome.is_clean());

        let warned = Outcome::warned("x", SceneWarning::NotAVector { components: 4 });
        assert_eq!(warned.value, "x");
        assert_eq!(
            [outcome.warnings, warned.warnings].concat(),
            vec![
                SceneWarning::NotAVector { components: 2 },
                SceneWarning::NotAVector { components: 4 },
            ]
        );
    }
}
