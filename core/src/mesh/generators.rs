//! Geometry generators for common shapes.
//!
//! These generators produce [`BufferGeometry`] values ready to be added
//! to a [`SceneGraph`](crate::scene::SceneGraph).

use std::f32::consts::PI;

use super::geometry::BufferGeometry;
use crate::math::Vec3;

/// Generate a UV sphere geometry.
///
/// Creates a sphere with the given radius, number of longitudinal segments,
/// and number of latitudinal rings. The geometry carries normals and uvs
/// with u32 indices.
///
/// # Arguments
///
/// * `radius` - Sphere radius
/// * `segments` - Number of longitudinal segments (around the equator)
/// * `rings` - Number of latitudinal rings (from pole to pole)
pub fn generate_sphere(radius: f32, segments: u32, rings: u32) -> BufferGeometry {
    let vertex_count = ((rings + 1) * (segments + 1)) as usize;
    let mut positions = Vec::with_capacity(vertex_count * 3);
    let mut normals = Vec::with_capacity(vertex_count * 3);
    let mut uvs = Vec::with_capacity(vertex_count * 2);
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let theta = ring as f32 * PI / rings as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for segment in 0..=segments {
            let phi = segment as f32 * 2.0 * PI / segments as f32;
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            positions.extend_from_slice(&[x * radius, y * radius, z * radius]);
            normals.extend_from_slice(&[x, y, z]);
            uvs.extend_from_slice(&[
                segment as f32 / segments as f32,
                ring as f32 / rings as f32,
            ]);
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }

    BufferGeometry::new(positions)
        .with_normals(normals)
        .with_uvs(uvs)
        .with_indices_u32(&indices)
        .with_label("sphere")
}

/// Generate a quad geometry on the XY plane.
///
/// Creates a quad centered at the origin with the given half-width and
/// half-height, facing +Z, with u16 indices.
///
/// UV coordinates go from (0,0) at top-left to (1,1) at bottom-right.
pub fn generate_quad(half_width: f32, half_height: f32) -> BufferGeometry {
    #[rustfmt::skip]
    let positions = vec![
        -half_width, -half_height, 0.0,
         half_width, -half_height, 0.0,
         half_width,  half_height, 0.0,
        -half_width,  half_height, 0.0,
    ];
    let normals = [0.0f32, 0.0, 1.0].repeat(4);
    let uvs = vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

    BufferGeometry::new(positions)
        .with_normals(normals)
        .with_uvs(uvs)
        .with_indices_u16(&[0, 1, 2, 2, 3, 0])
        .with_label("quad")
}

/// Generate a non-indexed axis-aligned box centered at the origin.
///
/// Every face is two triangles with their own three vertices and a flat
/// outward normal, 36 vertices in total.
pub fn generate_box(half_extents: Vec3) -> BufferGeometry {
    let h = half_extents;
    // Corner of the unit cube for each of the 4 corners of each face,
    // counter-clockwise when viewed from outside.
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([1.0, 0.0, 0.0], [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]]),
        ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
        ([0.0, 1.0, 0.0], [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]]),
        ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
        ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        ([0.0, 0.0, -1.0], [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]]),
    ];

    let mut positions = Vec::with_capacity(36 * 3);
    let mut normals = Vec::with_capacity(36 * 3);
    for (normal, corners) in &faces {
        for &corner in &[0, 1, 2, 2, 3, 0] {
            let [x, y, z] = corners[corner];
            positions.extend_from_slice(&[x * h.x, y * h.y, z * h.z]);
            normals.extend_from_slice(normal);
        }
    }

    BufferGeometry::new(positions)
        .with_normals(normals)
        .with_label("box")
}
