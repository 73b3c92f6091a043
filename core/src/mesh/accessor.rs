//! Validated access to [`BufferGeometry`] streams.
//!
//! Every function checks the geometry with [`validate`] before touching it,
//! so callers get a [`SceneError::NotBufferGeometry`] instead of reading a
//! malformed stream. [`GeometryView`] holds a geometry that was validated
//! once, for loops that read many vertices or faces. Faces are triangles: for indexed geometry face `i` is
//! named by index entries `3i..3i+3`, otherwise by vertices `3i..3i+3`.

use crate::error::{AttributeKind, GeometryDefect, SceneError, SceneResult};
use crate::math::{Aabb, Vec3};

use super::geometry::{BufferGeometry, IndexBuffer};

/// Check that `geometry` has well-formed attribute streams.
pub fn validate(geometry: &BufferGeometry) -> SceneResult<()> {
    let len = geometry.positions().len();
    if len % 3 != 0 {
        return Err(GeometryDefect::PositionLength { len }.into());
    }
    let vertex_count = len / 3;

    match geometry.indices() {
        None if len % 9 != 0 => {
            return Err(GeometryDefect::NonIndexedLayout { len }.into());
        }
        None => {}
        Some(indices) => {
            if indices.len() % 3 != 0 {
                return Err(GeometryDefect::IndexLength {
                    len: indices.len(),
                }
                .into());
            }
            if let Some((offset, value)) = indices
                .iter()
                .enumerate()
                .find(|&(_, value)| value as usize >= vertex_count)
            {
                return Err(GeometryDefect::IndexOutOfBounds {
                    offset,
                    value,
                    vertex_count,
                }
                .into());
            }
        }
    }

    if let Some(normals) = geometry.normals() {
        if normals.len() != len {
            return Err(GeometryDefect::NormalLength {
                expected: len,
                actual: normals.len(),
            }
            .into());
        }
    }
    if let Some(uvs) = geometry.uvs() {
        if uvs.len() != vertex_count * 2 {
            return Err(GeometryDefect::UvLength {
                expected: vertex_count * 2,
                actual: uvs.len(),
            }
            .into());
        }
    }

    Ok(())
}

/// Returns `true` if `geometry` passes [`validate`].
pub fn is_buffer_geometry(geometry: &BufferGeometry) -> bool {
    validate(geometry).is_ok()
}

/// A geometry that passed [`validate`].
///
/// The free functions of this module validate on every call, which costs
/// a pass over the index stream. Loops over many vertices or faces should
/// validate once with [`GeometryView::new`] and read through the view.
#[derive(Debug, Clone, Copy)]
pub struct GeometryView<'a> {
    geometry: &'a BufferGeometry,
}

impl<'a> GeometryView<'a> {
    /// Validate `geometry` and borrow it.
    pub fn new(geometry: &'a BufferGeometry) -> SceneResult<Self> {
        validate(geometry)?;
        Ok(Self { geometry })
    }

    /// The underlying geometry.
    pub fn geometry(&self) -> &'a BufferGeometry {
        self.geometry
    }

    pub fn positions(&self) -> &'a [f32] {
        self.geometry.positions()
    }

    pub fn normals(&self) -> SceneResult<&'a [f32]> {
        self.geometry
            .normals()
            .ok_or(SceneError::MissingAttribute(AttributeKind::Normal))
    }

    pub fn uvs(&self) -> SceneResult<&'a [f32]> {
        self.geometry
            .uvs()
            .ok_or(SceneError::MissingAttribute(AttributeKind::Uv))
    }

    pub fn indices(&self) -> SceneResult<&'a IndexBuffer> {
        self.geometry
            .indices()
            .ok_or(SceneError::MissingAttribute(AttributeKind::Index))
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.positions().len() / 3
    }

    pub fn face_count(&self) -> usize {
        match self.geometry.indices() {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    pub fn point(&self, index: usize) -> SceneResult<Vec3> {
        let len = self.vertex_count();
        if index >= len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        Ok(self.point_unchecked(index))
    }

    pub fn face_point_indices(&self, face: usize) -> SceneResult<[usize; 3]> {
        self.check_face(face)?;
        Ok(self.face_indices_unchecked(face))
    }

    pub fn face_points(&self, face: usize) -> SceneResult<[Vec3; 3]> {
        self.check_face(face)?;
        Ok(self.face_points_unchecked(face))
    }

    /// Unit normal of face `face` from its counter-clockwise winding.
    ///
    /// Degenerate faces have a zero normal.
    pub fn face_normal(&self, face: usize) -> SceneResult<Vec3> {
        let [a, b, c] = self.face_points(face)?;
        Ok((b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::zeros))
    }

    /// Total face area, accumulated in `f64`.
    pub fn surface_area(&self) -> f32 {
        let total: f64 = (0..self.face_count())
            .map(|face| {
                let [a, b, c] = self.face_points_unchecked(face);
                f64::from((b - a).cross(&(c - a)).norm()) * 0.5
            })
            .sum();
        total as f32
    }

    /// Bounding box of all vertices; empty without vertices.
    pub fn bounding_box(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for i in 0..self.vertex_count() {
            aabb.expand_by_point(&self.point_unchecked(i));
        }
        aabb
    }

    fn check_face(&self, face: usize) -> SceneResult<()> {
        let len = self.face_count();
        if face >= len {
            return Err(SceneError::IndexOutOfRange { index: face, len });
        }
        Ok(())
    }

    fn point_unchecked(&self, index: usize) -> Vec3 {
        Vec3::from_column_slice(&self.geometry.positions()[index * 3..index * 3 + 3])
    }

    fn face_indices_unchecked(&self, face: usize) -> [usize; 3] {
        let base = face * 3;
        match self.geometry.indices() {
            Some(indices) => [base, base + 1, base + 2]
                .map(|offset| indices.get(offset).map_or(0, |i| i as usize)),
            None => [base, base + 1, base + 2],
        }
    }

    fn face_points_unchecked(&self, face: usize) -> [Vec3; 3] {
        self.face_indices_unchecked(face)
            .map(|i| self.point_unchecked(i))
    }
}

/// The flat xyz position stream.
pub fn get_position_array(geometry: &BufferGeometry) -> SceneResult<&[f32]> {
    Ok(GeometryView::new(geometry)?.positions())
}

/// The flat xyz normal stream.
pub fn get_normal_array(geometry: &BufferGeometry) -> SceneResult<&[f32]> {
    GeometryView::new(geometry)?.normals()
}

/// The flat uv stream.
pub fn get_uv_array(geometry: &BufferGeometry) -> SceneResult<&[f32]> {
    GeometryView::new(geometry)?.uvs()
}

/// The face index stream, in its stored width.
pub fn get_indices_array(geometry: &BufferGeometry) -> SceneResult<&IndexBuffer> {
    GeometryView::new(geometry)?.indices()
}

/// Number of vertices (position stream length / 3).
pub fn get_number_of_vertices(geometry: &BufferGeometry) -> SceneResult<usize> {
    Ok(GeometryView::new(geometry)?.vertex_count())
}

/// Number of triangular faces.
pub fn get_number_of_faces(geometry: &BufferGeometry) -> SceneResult<usize> {
    Ok(GeometryView::new(geometry)?.face_count())
}

/// Position of vertex `index`.
pub fn get_point(geometry: &BufferGeometry, index: usize) -> SceneResult<Vec3> {
    GeometryView::new(geometry)?.point(index)
}

/// Vertex indices of face `face`.
pub fn get_face_point_indices(geometry: &BufferGeometry, face: usize) -> SceneResult<[usize; 3]> {
    GeometryView::new(geometry)?.face_point_indices(face)
}

/// Vertex positions of face `face`.
pub fn get_face_points(geometry: &BufferGeometry, face: usize) -> SceneResult<[Vec3; 3]> {
    GeometryView::new(geometry)?.face_points(face)
}

/// Unit normal of face `face`. See [`GeometryView::face_normal`].
pub fn get_face_normal(geometry: &BufferGeometry, face: usize) -> SceneResult<Vec3> {
    GeometryView::new(geometry)?.face_normal(face)
}

/// Total area of all faces, or `None` if the geometry is malformed.
///
/// Face areas are accumulated in `f64`. Degenerate faces contribute zero.
pub fn get_surface_area(geometry: &BufferGeometry) -> Option<f32> {
    crate::profile_function!();

    match GeometryView::new(geometry) {
        Ok(view) => Some(view.surface_area()),
        Err(err) => {
            log::warn!("cannot compute surface area: {err}");
            None
        }
    }
}

/// Bounding box of all vertices in geometry space.
///
/// Geometry with no vertex yields the empty box.
pub fn compute_bounding_box(geometry: &BufferGeometry) -> SceneResult<Aabb> {
    Ok(GeometryView::new(geometry)?.bounding_box())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> BufferGeometry {
        BufferGeometry::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }

    fn indexed_square() -> BufferGeometry {
        BufferGeometry::new(vec![
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            2.0, 2.0, 0.0, //
            0.0, 2.0, 0.0,
        ])
        .with_indices_u16(&[0, 1, 2, 2, 3, 0])
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(is_buffer_geometry(&unit_triangle()));
        assert!(is_buffer_geometry(&indexed_square()));
        assert!(is_buffer_geometry(&BufferGeometry::new(Vec::new())));
    }

    #[test]
    fn test_validate_rejects_defects() {
        let err = validate(&BufferGeometry::new(vec![0.0; 4])).unwrap_err();
        assert_eq!(err, SceneError::from(GeometryDefect::PositionLength { len: 4 }));

        let err = validate(&BufferGeometry::new(vec![0.0; 12])).unwrap_err();
        assert_eq!(err, SceneError::from(GeometryDefect::NonIndexedLayout { len: 12 }));

        let err = validate(&BufferGeometry::new(vec![0.0; 12]).with_indices_u32(&[0, 1])).unwrap_err();
        assert_eq!(err, SceneError::from(GeometryDefect::IndexLength { len: 2 }));

        let err = validate(&BufferGeometry::new(vec![0.0; 12]).with_indices_u32(&[0, 1, 4])).unwrap_err();
        assert_eq!(
            err,
            SceneError::from(GeometryDefect::IndexOutOfBounds {
                offset: 2,
                value: 4,
                vertex_count: 4
            })
        );

        let err = validate(&unit_triangle().with_normals(vec![0.0; 3])).unwrap_err();
        assert_eq!(err, SceneError::from(GeometryDefect::NormalLength { expected: 9, actual: 3 }));

        let err = validate(&unit_triangle().with_uvs(vec![0.0; 9])).unwrap_err();
        assert_eq!(err, SceneError::from(GeometryDefect::UvLength { expected: 6, actual: 9 }));
    }

    #[test]
    fn test_missing_attributes() {
        let geometry = unit_triangle();
        assert_eq!(
            get_normal_array(&geometry),
            Err(SceneError::MissingAttribute(AttributeKind::Normal))
        );
        assert_eq!(
            get_uv_array(&geometry),
            Err(SceneError::MissingAttribute(AttributeKind::Uv))
        );
        assert_eq!(
            get_indices_array(&geometry).err(),
            Some(SceneError::MissingAttribute(AttributeKind::Index))
        );
    }

    #[test]
    fn test_arrays_returned_as_stored() {
        let geometry = indexed_square().with_uvs(vec![0.5f32; 8]);
        assert_eq!(get_position_array(&geometry).unwrap().len(), 12);
        assert_eq!(get_uv_array(&geometry).unwrap(), &[0.5f32; 8][..]);
        let indices = get_indices_array(&geometry).unwrap();
        assert!(matches!(indices, IndexBuffer::U16(_)));
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_counts() {
        let tri = unit_triangle();
        assert_eq!(get_number_of_vertices(&tri).unwrap(), 3);
        assert_eq!(get_number_of_faces(&tri).unwrap(), 1);

        let square = indexed_square();
        assert_eq!(get_number_of_vertices(&square).unwrap(), 4);
        assert_eq!(get_number_of_faces(&square).unwrap(), 2);
    }

    #[test]
    fn test_get_point_bounds() {
        let geometry = unit_triangle();
        assert_eq!(get_point(&geometry, 1).unwrap(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(
            get_point(&geometry, 3),
            Err(SceneError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_face_lookup() {
        let square = indexed_square();
        assert_eq!(get_face_point_indices(&square, 1).unwrap(), [2, 3, 0]);
        assert_eq!(
            get_face_points(&square, 1).unwrap(),
            [
                Vec3::new(2.0, 2.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0)
            ]
        );
        assert_eq!(
            get_face_point_indices(&square, 2),
            Err(SceneError::IndexOutOfRange { index: 2, len: 2 })
        );

        assert_eq!(get_face_point_indices(&unit_triangle(), 0).unwrap(), [0, 1, 2]);
        assert_eq!(get_face_normal(&square, 0).unwrap(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_surface_area() {
        assert_eq!(get_surface_area(&unit_triangle()), Some(0.5));
        assert_eq!(get_surface_area(&indexed_square()), Some(4.0));
        assert_eq!(get_surface_area(&BufferGeometry::new(Vec::new())), Some(0.0));
        assert_eq!(get_surface_area(&BufferGeometry::new(vec![0.0; 4])), None);
    }

    #[test]
    fn test_degenerate_face() {
        let geometry = BufferGeometry::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
        assert_eq!(get_surface_area(&geometry), Some(0.0));
        assert_eq!(get_face_normal(&geometry, 0).unwrap(), Vec3::zeros());
    }

    #[test]
    fn test_view_validates_once_and_reads() {
        assert_eq!(
            GeometryView::new(&BufferGeometry::new(vec![0.0; 6])).err(),
            Some(SceneError::from(GeometryDefect::NonIndexedLayout { len: 6 }))
        );

        let square = indexed_square();
        let view = GeometryView::new(&square).unwrap();
        assert_eq!(view.vertex_count(), 4);
        assert_eq!(view.face_count(), 2);
        for face in 0..view.face_count() {
            assert_eq!(view.face_points(face), get_face_points(&square, face));
            assert_eq!(view.face_normal(face).unwrap(), Vec3::new(0.0, 0.0, 1.0));
        }
        assert_eq!(view.point(4), Err(SceneError::IndexOutOfRange { index: 4, len: 4 }));
        assert_eq!(view.surface_area(), 4.0);
        assert_eq!(view.bounding_box(), compute_bounding_box(&square).unwrap());
    }

    #[test]
    fn test_bounding_box() {
        let bounds = compute_bounding_box(&indexed_square()).unwrap();
        assert_eq!(bounds.min, Vec3::zeros());
        assert_eq!(bounds.max, Vec3::new(2.0, 2.0, 0.0));
        assert!(compute_bounding_box(&BufferGeometry::new(Vec::new())).unwrap().is_empty());
    }
}
