//! Shared fixtures for scene-utils integration tests.

#![allow(dead_code)]

use scene_utils::material::{Material, MaterialHandle, TextureSlot};
use scene_utils::math::{Vec3, transform_point};
use scene_utils::mesh::{BufferGeometry, GeometryHandle};
use scene_utils::scene::{Node, NodeId, SceneGraph, Transform};
use scene_utils::texture::Texture;

/// Initialize logging for test output.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Right triangle with legs of length 1 on the XY plane.
pub fn unit_triangle() -> BufferGeometry {
    BufferGeometry::from_points(&[
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ])
}

/// `faces` non-indexed triangles with distinct, predictable coordinates.
pub fn triangle_soup(faces: usize) -> BufferGeometry {
    BufferGeometry::new((0..faces * 9).map(|i| i as f32 * 0.5).collect())
}

/// Translation-only transform.
pub fn at(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_translation(Vec3::new(x, y, z))
}

/// World-space origin of a node, from its cached world matrix.
pub fn world_position(graph: &SceneGraph, id: NodeId) -> Vec3 {
    transform_point(&graph.world_matrix(id).expect("node is live"), &Vec3::zeros())
}

/// Assert two vectors agree within `1e-5`.
pub fn assert_vec3_near(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).norm() < 1e-5,
        "expected {expected:?}, got {actual:?}"
    );
}

/// A mesh node with its own geometry and a textured material.
pub struct MeshFixture {
    pub node: NodeId,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
}

/// Spawn a mesh with private geometry and a material holding one texture.
pub fn spawn_textured_mesh(graph: &mut SceneGraph, name: &str) -> MeshFixture {
    let geometry = graph.add_geometry(unit_triangle().with_label(name));
    let texture = graph.add_texture(Texture::solid([255, 255, 255, 255]).with_label(name));
    let material = graph.add_material(
        Material::new()
            .with_name(name)
            .with_texture(TextureSlot::Map, texture),
    );
    let node = graph.spawn(Node::mesh(Some(geometry), Some(material)).with_name(name));
    MeshFixture {
        node,
        geometry,
        material,
    }
}

/// Scene used by the recursive disposal tests.
///
/// ```text
/// scene
/// ├── subtree
/// │   ├── m1
/// │   ├── m2
/// │   │   └── m3
/// │   └── group
/// │       ├── m4
/// │       └── m5
/// └── outsider
/// ```
pub struct DisposalScene {
    pub graph: SceneGraph,
    pub scene: NodeId,
    pub subtree: NodeId,
    pub group: NodeId,
    pub meshes: Vec<MeshFixture>,
    pub outsider: MeshFixture,
}

pub fn disposal_scene() -> DisposalScene {
    let mut graph = SceneGraph::new();
    let scene = graph.spawn(Node::group().with_name("scene"));
    let subtree = graph.spawn(Node::group().with_name("subtree"));
    let group = graph.spawn(Node::group().with_name("group"));

    let meshes: Vec<MeshFixture> = ["m1", "m2", "m3", "m4", "m5"]
        .iter()
        .map(|name| spawn_textured_mesh(&mut graph, name))
        .collect();
    let outsider = spawn_textured_mesh(&mut graph, "outsider");

    graph.add_child(scene, subtree).unwrap();
    graph.add_child(scene, outsider.node).unwrap();
    graph.add_child(subtree, meshes[0].node).unwrap();
    graph.add_child(subtree, meshes[1].node).unwrap();
    graph.add_child(meshes[1].node, meshes[2].node).unwrap();
    graph.add_child(subtree, group).unwrap();
    graph.add_child(group, meshes[3].node).unwrap();
    graph.add_child(group, meshes[4].node).unwrap();

    DisposalScene {
        graph,
        scene,
        subtree,
        group,
        meshes,
        outsider,
    }
}
