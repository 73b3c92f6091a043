//! Scene graph and the utilities that operate on it.
//!
//! - [`SceneGraph`]: Arena of nodes plus pooled geometries, materials, textures
//! - [`Node`] / [`NodeId`]: A node in the tree and its generational id
//! - [`NodeRole`] / [`MeshRole`]: What a node renders (group, mesh, camera, light)
//! - [`Transform`]: TRS local transform
//! - [`utils`]: Mesh queries, ungrouping, bounding boxes, disposal

mod graph;
mod types;
pub mod utils;

pub use graph::{MaterialRelease, NodeId, SceneGraph};
pub use types::{CameraProjection, LightKind, MeshRole, Node, NodeKind, NodeRole, Transform};
pub use utils::{
    BoundsSpace, DisposalReport, UngroupOptions, UngroupReport, delete_mesh_with_data,
    delete_object_with_data, find_objects, get_all_meshes, get_bounding_box,
    get_class_instance_objects, is_mesh, is_object, ungroup_all_meshes,
};
