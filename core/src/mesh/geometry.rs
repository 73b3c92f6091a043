//! Buffer-backed geometry.
//!
//! This module provides:
//! - [`IndexFormat`] - Index data format (u16 or u32)
//! - [`IndexBuffer`] - Typed face index stream
//! - [`BufferGeometry`] - Flat attribute streams backing a mesh surface

use crate::math::{self, Mat4, Vec3};

/// Index format for indexed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned integers (max 65535 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers (max ~4 billion vertices).
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// Face index stream. Every consecutive triple names one triangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuffer {
    /// 16-bit indices.
    U16(Vec<u16>),
    /// 32-bit indices.
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Storage format of the indices.
    pub fn format(&self) -> IndexFormat {
        match self {
            Self::U16(_) => IndexFormat::Uint16,
            Self::U32(_) => IndexFormat::Uint32,
        }
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    /// Returns `true` if there are no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index at `position`, widened to `u32`.
    pub fn get(&self, position: usize) -> Option<u32> {
        match self {
            Self::U16(v) => v.get(position).map(|&i| u32::from(i)),
            Self::U32(v) => v.get(position).copied(),
        }
    }

    /// Iterate over all indices, widened to `u32`.
    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Self::U16(v) => Box::new(v.iter().map(|&i| u32::from(i))),
            Self::U32(v) => Box::new(v.iter().copied()),
        }
    }

    /// Raw index bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U16(v) => bytemuck::cast_slice(v),
            Self::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// A mesh surface described by flat attribute streams.
///
/// - `position`: xyz triples, one per vertex (required)
/// - `normal`: xyz triples, one per vertex (optional)
/// - `uv`: uv pairs, one per vertex (optional)
/// - index stream: vertex index triples, one per face (optional)
///
/// Without an index stream, vertices are laid out in face-contiguous
/// triples. Construction does not validate the streams; the geometry
/// accessor checks them on every access (see
/// [`accessor::validate`](super::accessor::validate)).
#[derive(Clone, PartialEq)]
pub struct BufferGeometry {
    positions: Vec<f32>,
    normals: Option<Vec<f32>>,
    uvs: Option<Vec<f32>>,
    indices: Option<IndexBuffer>,
    label: Option<String>,
}

impl BufferGeometry {
    /// Create a non-indexed geometry from a flat position stream.
    pub fn new(positions: Vec<f32>) -> Self {
        Self {
            positions,
            normals: None,
            uvs: None,
            indices: None,
            label: None,
        }
    }

    /// Create a geometry from a list of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        Self::new(points.iter().flat_map(|p| [p.x, p.y, p.z]).collect())
    }

    /// Set the normal stream.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Set the uv stream.
    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<f32>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Set index data as u16 indices.
    #[must_use]
    pub fn with_indices_u16(mut self, indices: &[u16]) -> Self {
        self.indices = Some(IndexBuffer::U16(indices.to_vec()));
        self
    }

    /// Set index data as u32 indices.
    #[must_use]
    pub fn with_indices_u32(mut self, indices: &[u32]) -> Self {
        self.indices = Some(IndexBuffer::U32(indices.to_vec()));
        self
    }

    /// Set a debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Flat position stream.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat normal stream, if any.
    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    /// Flat uv stream, if any.
    pub fn uvs(&self) -> Option<&[f32]> {
        self.uvs.as_deref()
    }

    /// Index stream, if any.
    pub fn indices(&self) -> Option<&IndexBuffer> {
        self.indices.as_ref()
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Check if this geometry has an index stream.
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Raw position bytes, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Transform positions by `matrix` and normals by its normal matrix.
    ///
    /// Normals are renormalized. If the upper 3x3 of `matrix` is singular
    /// the normals are left untouched.
    pub fn apply_matrix(&mut self, matrix: &Mat4) {
        for p in self.positions.chunks_exact_mut(3) {
            let moved = math::transform_point(matrix, &Vec3::new(p[0], p[1], p[2]));
            p.copy_from_slice(moved.as_slice());
        }

        let Some(normals) = self.normals.as_mut() else {
            return;
        };
        let Some(normal_matrix) = math::normal_matrix(matrix) else {
            log::warn!("singular transform, normals of {:?} left untouched", self.label);
            return;
        };
        for n in normals.chunks_exact_mut(3) {
            let turned = (normal_matrix * Vec3::new(n[0], n[1], n[2]))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vec3::zeros);
            n.copy_from_slice(turned.as_slice());
        }
    }
}

impl std::fmt::Debug for BufferGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferGeometry")
            .field("label", &self.label)
            .field("position_len", &self.positions.len())
            .field("normal_len", &self.normals.as_ref().map(Vec::len))
            .field("uv_len", &self.uvs.as_ref().map(Vec::len))
            .field("index_format", &self.indices.as_ref().map(IndexBuffer::format))
            .field("index_len", &self.indices.as_ref().map(IndexBuffer::len))
            .finish()
    }
}
