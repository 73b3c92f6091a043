//! Scene node data types.
//!
//! Nodes carry an explicit [`NodeRole`] instead of runtime type flags.
//! Mesh roles reference pooled resources through handles, so a geometry or
//! material shared by several meshes is visible as such in the pool's
//! referrer count.

use crate::material::MaterialHandle;
use crate::math::{self, Mat4, Quat, Vec3};
use crate::mesh::GeometryHandle;

use super::graph::NodeId;

/// Node transform decomposed into translation, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation in parent units.
    pub translation: Vec3,
    /// Rotation quaternion.
    pub rotation: Quat,
    /// Non-uniform scale.
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::repeat(1.0),
        }
    }

    /// Create from translation, rotation, and scale.
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Create from translation only (identity rotation and scale).
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Decompose an affine matrix.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = math::to_scale_rotation_translation(matrix);
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Returns this transform with a different translation.
    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Compose into a local-to-parent matrix.
    pub fn to_matrix(&self) -> Mat4 {
        math::mat4_from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

// -- Roles --

/// Camera projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraProjection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        yfov: f32,
        /// Aspect ratio (width/height), if specified.
        aspect: Option<f32>,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance, if specified.
        zfar: Option<f32>,
    },
    /// Orthographic projection.
    Orthographic {
        /// Horizontal magnification.
        xmag: f32,
        /// Vertical magnification.
        ymag: f32,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance.
        zfar: f32,
    },
}

/// Light source parameters. Position and direction come from the node's
/// world matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Parallel light along the node's -Z axis.
    Directional {
        /// Light color (linear RGB).
        color: Vec3,
        /// Intensity in lux.
        intensity: f32,
    },
    /// Omnidirectional light.
    Point {
        /// Light color (linear RGB).
        color: Vec3,
        /// Intensity in candela.
        intensity: f32,
        /// Maximum range, zero for infinite.
        range: f32,
    },
    /// Cone light along the node's -Z axis.
    Spot {
        /// Light color (linear RGB).
        color: Vec3,
        /// Intensity in candela.
        intensity: f32,
        /// Maximum range, zero for infinite.
        range: f32,
        /// Half-angle of the full-intensity cone in radians.
        inner_cone_angle: f32,
        /// Half-angle of the falloff cone in radians.
        outer_cone_angle: f32,
    },
}

/// Resources rendered by a mesh node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshRole {
    /// Surface geometry, if assigned.
    pub geometry: Option<GeometryHandle>,
    /// Surface material, if assigned.
    pub material: Option<MaterialHandle>,
}

/// What a node is, beyond its place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeRole {
    /// Plain transform node.
    #[default]
    Group,
    /// Renderable geometry + material pair.
    Mesh(MeshRole),
    /// Camera.
    Camera(CameraProjection),
    /// Light source.
    Light(LightKind),
}

impl NodeRole {
    /// The selector this role answers to.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Group => NodeKind::Group,
            Self::Mesh(_) => NodeKind::Mesh,
            Self::Camera(_) => NodeKind::Camera,
            Self::Light(_) => NodeKind::Light,
        }
    }

    /// Mesh resources, if this is a mesh.
    pub fn as_mesh(&self) -> Option<&MeshRole> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Returns `true` for mesh roles.
    pub fn is_mesh(&self) -> bool {
        matches!(self, Self::Mesh(_))
    }
}

/// Role selector used by node queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Every node.
    Any,
    /// [`NodeRole::Group`] nodes.
    Group,
    /// [`NodeRole::Mesh`] nodes.
    Mesh,
    /// [`NodeRole::Camera`] nodes.
    Camera,
    /// [`NodeRole::Light`] nodes.
    Light,
}

impl NodeKind {
    /// Returns `true` if `role` is selected by `self`.
    pub fn matches(self, role: &NodeRole) -> bool {
        self == Self::Any || self == role.kind()
    }
}

// -- Nodes --

/// A node in a [`SceneGraph`](super::SceneGraph).
///
/// Hierarchy links and the cached world matrix are owned by the graph and
/// read through accessors. The role is fixed at spawn time except for the
/// mesh resources, which change through
/// [`SceneGraph::set_mesh_geometry`](super::SceneGraph::set_mesh_geometry) and
/// [`SceneGraph::set_mesh_material`](super::SceneGraph::set_mesh_material) so
/// referrer counts stay exact.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name, if any.
    pub name: Option<String>,
    /// Local transform relative to parent.
    pub transform: Transform,
    pub(crate) role: NodeRole,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) world_matrix: Mat4,
}

impl Node {
    /// Creates a detached node with identity transform.
    pub fn new(role: NodeRole) -> Self {
        Self {
            name: None,
            transform: Transform::identity(),
            role,
            parent: None,
            children: Vec::new(),
            world_matrix: Mat4::identity(),
        }
    }

    /// A plain group node.
    pub fn group() -> Self {
        Self::new(NodeRole::Group)
    }

    /// A mesh node rendering `geometry` with `material`.
    pub fn mesh(geometry: Option<GeometryHandle>, material: Option<MaterialHandle>) -> Self {
        Self::new(NodeRole::Mesh(MeshRole { geometry, material }))
    }

    /// A camera node.
    pub fn camera(projection: CameraProjection) -> Self {
        Self::new(NodeRole::Camera(projection))
    }

    /// A light node.
    pub fn light(light: LightKind) -> Self {
        Self::new(NodeRole::Light(light))
    }

    /// Set the node name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// The node's role.
    pub fn role(&self) -> &NodeRole {
        &self.role
    }

    /// Parent node, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World matrix as of the last refresh.
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::group()
    }
}
