//! Math type aliases, transform helpers, bounding boxes, and rounding.
//!
//! All rendering math is `f32` on top of `nalgebra`. Scalar rounding is
//! carried out in `f64` so results are reproducible for decimal inputs.

pub use nalgebra;

use crate::error::{Outcome, SceneWarning};

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// `Quaternion::new` takes `(w, x, y, z)`.
pub type Quat = nalgebra::Quaternion<f32>;

/// Decimal places used by the rounding helpers when callers have no preference.
pub const DEFAULT_DECIMALS: i32 = 2;

// ===== Transform helpers =====

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::new_normalize(rotation);
    let m = r.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Decompose a 4x4 affine matrix into (scale, rotation, translation).
///
/// A negative determinant is folded into the X scale. Zero-length axes keep
/// a zero scale and contribute an identity column to the rotation.
pub fn to_scale_rotation_translation(m: &Mat4) -> (Vec3, Quat, Vec3) {
    let translation = Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let col0 = Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
    let col1 = Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let col2 = Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);

    let mut sx = col0.norm();
    let sy = col1.norm();
    let sz = col2.norm();
    if m.fixed_view::<3, 3>(0, 0).into_owned().determinant() < 0.0 {
        sx = -sx;
    }

    let axis = |col: Vec3, s: f32, fallback: Vec3| {
        if s.abs() > f32::EPSILON {
            col / s
        } else {
            fallback
        }
    };
    let rot_mat = Mat3::from_columns(&[
        axis(col0, sx, Vec3::x()),
        axis(col1, sy, Vec3::y()),
        axis(col2, sz, Vec3::z()),
    ]);
    let rotation = nalgebra::UnitQuaternion::from_rotation_matrix(
        &nalgebra::Rotation3::from_matrix_unchecked(rot_mat),
    )
    .into_inner();
    (Vec3::new(sx, sy, sz), rotation, translation)
}

/// Transform a point by an affine 4x4 matrix.
pub fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    m.transform_point(&nalgebra::Point3::from(*p)).coords
}

/// Normal matrix (inverse-transpose of the upper 3x3), if invertible.
pub fn normal_matrix(m: &Mat4) -> Option<Mat3> {
    m.fixed_view::<3, 3>(0, 0)
        .into_owned()
        .try_inverse()
        .map(|inv| inv.transpose())
}

/// Returns `true` if the linear part of `m` is a rotation times a uniform
/// scale, with no shear and no per-axis scale, up to a relative `1e-4`.
pub fn is_similarity(m: &Mat4) -> bool {
    let linear = m.fixed_view::<3, 3>(0, 0).into_owned();
    let gram = linear.transpose() * linear;
    let scale_sq = gram.trace() / 3.0;
    let tolerance = 1e-4 * scale_sq.max(f32::MIN_POSITIVE);
    (gram - Mat3::identity() * scale_sq).amax() <= tolerance
}

/// Create a quaternion from rotation around the Y axis.
pub fn quat_from_rotation_y(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::y_axis(), angle).into_inner()
}

/// Create a quaternion from rotation around the Z axis.
pub fn quat_from_rotation_z(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::z_axis(), angle).into_inner()
}

// ===== Bounding boxes =====

/// Axis-aligned bounding box.
///
/// The empty box has `min = +MAX` and `max = -MAX`, so the first point
/// expanded into it becomes both corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new AABB from min and max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The empty box.
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(f32::MIN),
        }
    }

    /// Returns `true` if the box contains no point.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow the box to contain `p`.
    pub fn expand_by_point(&mut self, p: &Vec3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Box enclosing the 8 corners of `self` transformed by `matrix`.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ];

        let mut out = Aabb::empty();
        for corner in &corners {
            out.expand_by_point(&transform_point(matrix, corner));
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

// ===== Rounding =====

/// Round `value` to `decimals` decimal places.
///
/// Computes `(value * 10^decimals).round() / 10^decimals` in `f64`.
/// `f64::round` rounds half away from zero, and the rule applies to the
/// binary product: `1.005 * 100` is `100.49999999999999`, so
/// `round_to_decimals(1.005, 2)` is `1.0`, while `0.125 * 100` is exactly
/// `12.5` and rounds to `0.13`. Negative `decimals` round to tens, hundreds...
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round each component of `v` with [`round_to_decimals`].
pub fn round_vector(v: &Vec3, decimals: i32) -> Vec3 {
    v.map(|c| round_to_decimals(f64::from(c), decimals) as f32)
}

/// Round a component slice that is expected to hold a 3-vector.
///
/// Anything other than exactly 3 components is returned unchanged with a
/// [`SceneWarning::NotAVector`] warning.
pub fn round_vector_components(values: &[f32], decimals: i32) -> Outcome<Vec<f32>> {
    if values.len() != 3 {
        return Outcome::warned(
            values.to_vec(),
            SceneWarning::NotAVector {
                components: values.len(),
            },
        );
    }
    let rounded = round_vector(&Vec3::from_column_slice(values), decimals);
    Outcome::ok(rounded.as_slice().to_vec())
}
