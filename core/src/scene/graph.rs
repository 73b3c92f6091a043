//! Arena-backed scene graph.
//!
//! [`SceneGraph`] owns every node and every pooled resource. Nodes live in
//! generational slots addressed by [`NodeId`]; parent and child links are
//! ids, so removing nodes while walking a snapshot of a child list never
//! invalidates anything. Resources live in [`ResourcePool`]s whose referrer
//! counts are kept exact by the graph:
//!
//! - spawning a mesh node retains its geometry and material;
//! - adding a material retains the texture in each populated slot;
//! - despawning a node, or replacing a mesh resource, releases again.
//!
//! World matrices are cached per node and refreshed explicitly with
//! [`SceneGraph::update_world_matrix`] or [`SceneGraph::update_world_matrices`].

use std::fmt;

use crate::error::{GeometryDefect, SceneError, SceneResult};
use crate::material::{Material, MaterialHandle};
use crate::math::Mat4;
use crate::mesh::{BufferGeometry, GeometryHandle};
use crate::pool::{Release, ResourcePool};
use crate::texture::{Texture, TextureHandle};

use super::types::{MeshRole, Node, NodeRole, Transform};

/// Generational id of a node in a [`SceneGraph`].
///
/// Ids of despawned nodes never resolve again, even after their slot is
/// reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Returns the slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the slot generation this id was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}@{})", self.index, self.generation)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Result of [`SceneGraph::release_material`].
#[derive(Debug)]
pub struct MaterialRelease {
    /// What happened to the material itself.
    pub material: Release<Material>,
    /// One entry per populated slot of a disposed material, in slot order.
    /// Empty if the material survived.
    pub textures: Vec<(TextureHandle, Release<Texture>)>,
}

struct NodeSlot {
    node: Option<Node>,
    generation: u32,
}

/// Scene tree plus the geometry, material and texture pools it references.
pub struct SceneGraph {
    nodes: Vec<NodeSlot>,
    free_list: Vec<u32>,
    node_count: usize,
    geometries: ResourcePool<BufferGeometry>,
    materials: ResourcePool<Material>,
    textures: ResourcePool<Texture>,
}

impl SceneGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            node_count: 0,
            geometries: ResourcePool::new(),
            materials: ResourcePool::new(),
            textures: ResourcePool::new(),
        }
    }

    // ===== Nodes =====

    /// Insert `node` as a new root and return its id.
    ///
    /// Hierarchy links carried by `node` are discarded. Mesh resources are
    /// retained; a stale handle is dropped from the role with a warning.
    pub fn spawn(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        node.world_matrix = node.transform.to_matrix();

        if let NodeRole::Mesh(mesh) = &mut node.role {
            if let Some(geometry) = mesh.geometry
                && !self.geometries.retain(geometry)
            {
                log::warn!("spawning mesh with disposed geometry {geometry:?}, dropping it");
                mesh.geometry = None;
            }
            if let Some(material) = mesh.material
                && !self.materials.retain(material)
            {
                log::warn!("spawning mesh with disposed material {material:?}, dropping it");
                mesh.material = None;
            }
        }

        self.node_count += 1;
        let id = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.nodes[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.nodes.len() as u32;
            self.nodes.push(NodeSlot {
                node: Some(node),
                generation: 0,
            });
            NodeId {
                index,
                generation: 0,
            }
        };

        log::debug!("spawned {id}");
        id
    }

    /// Remove a node from the graph.
    ///
    /// The node is unlinked from its parent and its children become roots.
    /// Mesh resources still held by the node are released. Returns the
    /// removed node, or `None` if `id` does not resolve.
    pub fn despawn(&mut self, id: NodeId) -> Option<Node> {
        self.detach(id).ok()?;

        let slot = self.nodes.get_mut(id.index as usize)?;
        let mut node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.node_count -= 1;

        for child in node.children.drain(..) {
            if let Some(child) = self.node_mut(child) {
                child.parent = None;
            }
        }

        if let NodeRole::Mesh(mesh) = &mut node.role {
            if let Some(geometry) = mesh.geometry.take() {
                let released = self.release_geometry(geometry);
                log::debug!("{id} released geometry {geometry:?}: {}", describe(&released));
            }
            if let Some(material) = mesh.material.take() {
                let released = self.release_material(material);
                log::debug!(
                    "{id} released material {material:?}: {}",
                    describe(&released.material)
                );
            }
        }

        log::debug!("despawned {id}");
        Some(node)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// Returns `true` if the graph has no node.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn require(&self, id: NodeId) -> SceneResult<&Node> {
        self.node(id).ok_or(SceneError::NotObject(id))
    }

    /// Parent of `id`, `None` for roots and unknown ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Children of `id` in insertion order, empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| &node.children)
    }

    /// All parentless nodes in slot order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Iterate over live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|node| {
                (
                    NodeId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    node,
                )
            })
        })
    }

    /// Visit `root` and its subtree depth-first, pre-order, children in
    /// insertion order. Unknown roots visit nothing.
    pub fn traverse(&self, root: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            visit(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Every node below `root`, in [`traverse`](Self::traverse) order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.traverse(root, |id, _| {
            if id != root {
                found.push(id);
            }
        });
        found
    }

    // ===== Hierarchy =====

    /// Make `child` the last child of `parent`, keeping its local transform.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.check_link(parent, child)?;
        self.link(Some(parent), child);
        Ok(())
    }

    /// Reparent `child` under `parent` (or make it a root for `None`),
    /// keeping its world transform.
    ///
    /// The new local transform is `inverse(parent_world) * child_world`,
    /// decomposed back into translation, rotation and scale. World matrices
    /// of both nodes are refreshed first.
    pub fn attach(&mut self, parent: Option<NodeId>, child: NodeId) -> SceneResult<()> {
        match parent {
            Some(parent) => self.check_link(parent, child)?,
            None => {
                self.require(child)?;
            }
        }

        let child_world = self.update_world_matrix(child, true, false)?;
        let local = match parent {
            Some(parent) => {
                let parent_world = self.update_world_matrix(parent, true, false)?;
                let inverse = parent_world
                    .try_inverse()
                    .ok_or(SceneError::SingularTransform(parent))?;
                inverse * child_world
            }
            None => child_world,
        };

        self.link(parent, child);
        if let Some(node) = self.node_mut(child) {
            node.transform = Transform::from_matrix(&local);
        }
        self.update_world_matrix(child, false, true)?;
        Ok(())
    }

    /// Unlink `child` from its parent, keeping its local transform.
    pub fn detach(&mut self, child: NodeId) -> SceneResult<()> {
        self.require(child)?;
        self.link(None, child);
        Ok(())
    }

    fn check_link(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.require(parent)?;
        self.require(child)?;

        // Walk up from the new parent; meeting the child means a cycle
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::CyclicHierarchy { child, parent });
            }
            cursor = self.parent(id);
        }
        Ok(())
    }

    fn link(&mut self, parent: Option<NodeId>, child: NodeId) {
        let old_parent = self.parent(child);
        if old_parent == parent {
            return;
        }

        if let Some(old_parent) = old_parent
            && let Some(node) = self.node_mut(old_parent)
        {
            node.children.retain(|&c| c != child);
        }
        if let Some(parent) = parent
            && let Some(node) = self.node_mut(parent)
        {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = parent;
        }
    }

    // ===== World matrices =====

    /// Recompute the world matrix of `id` and return it.
    ///
    /// With `update_parents` the ancestors are recomputed first, otherwise
    /// the parent's cached matrix is used. With `update_children` the whole
    /// subtree is refreshed afterwards.
    pub fn update_world_matrix(
        &mut self,
        id: NodeId,
        update_parents: bool,
        update_children: bool,
    ) -> SceneResult<Mat4> {
        let mut chain = vec![id];
        let mut cursor = self.require(id)?.parent;
        if update_parents {
            while let Some(ancestor) = cursor {
                chain.push(ancestor);
                cursor = self.require(ancestor)?.parent;
            }
        }

        // `cursor` is the first ancestor left out of the chain
        let mut world = match cursor {
            Some(parent) => self.require(parent)?.world_matrix,
            None => Mat4::identity(),
        };
        for &link in chain.iter().rev() {
            if let Some(node) = self.node_mut(link) {
                world *= node.transform.to_matrix();
                node.world_matrix = world;
            }
        }
        if update_children {
            self.propagate_children(id, world);
        }
        Ok(world)
    }

    /// Recompute the world matrix of every node.
    pub fn update_world_matrices(&mut self) {
        crate::profile_function!();

        for root in self.roots() {
            let Some(node) = self.node_mut(root) else {
                continue;
            };
            let world = node.transform.to_matrix();
            node.world_matrix = world;
            self.propagate_children(root, world);
        }
    }

    fn propagate_children(&mut self, parent: NodeId, parent_world: Mat4) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .children(parent)
            .iter()
            .map(|&child| (child, parent_world))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.node_mut(id) else {
                continue;
            };
            let world = parent_world * node.transform.to_matrix();
            node.world_matrix = world;
            stack.extend(node.children.iter().map(|&child| (child, world)));
        }
    }

    /// Cached world matrix of `id`.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        self.node(id).map(|node| node.world_matrix)
    }

    // ===== Geometries =====

    /// Store a geometry with no referrers.
    pub fn add_geometry(&mut self, geometry: BufferGeometry) -> GeometryHandle {
        self.geometries.insert(geometry)
    }

    /// Borrow a live geometry.
    pub fn geometry(&self, handle: GeometryHandle) -> SceneResult<&BufferGeometry> {
        self.geometries
            .get(handle)
            .ok_or(SceneError::NotBufferGeometry(GeometryDefect::Disposed))
    }

    /// Mutably borrow a live geometry.
    pub fn geometry_mut(&mut self, handle: GeometryHandle) -> SceneResult<&mut BufferGeometry> {
        self.geometries
            .get_mut(handle)
            .ok_or(SceneError::NotBufferGeometry(GeometryDefect::Disposed))
    }

    /// Number of referrers of a live geometry.
    pub fn geometry_ref_count(&self, handle: GeometryHandle) -> Option<u32> {
        self.geometries.ref_count(handle)
    }

    /// Number of live geometries.
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Drop one referrer of a geometry, disposing it when none remain.
    pub fn release_geometry(&mut self, handle: GeometryHandle) -> Release<BufferGeometry> {
        self.geometries.release(handle)
    }

    // ===== Materials =====

    /// Store a material with no referrers, retaining its textures.
    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        for (slot, texture) in material.textures() {
            if !self.textures.retain(texture) {
                log::warn!(
                    "material {:?} references disposed texture {texture:?} in {slot:?}",
                    material.name
                );
            }
        }
        self.materials.insert(material)
    }

    /// Borrow a live material.
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    /// Number of referrers of a live material.
    pub fn material_ref_count(&self, handle: MaterialHandle) -> Option<u32> {
        self.materials.ref_count(handle)
    }

    /// Number of live materials.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Drop one referrer of a material. A disposed material releases the
    /// texture in each of its populated slots.
    pub fn release_material(&mut self, handle: MaterialHandle) -> MaterialRelease {
        let material = self.materials.release(handle);
        let textures = match &material {
            Release::Disposed(disposed) => disposed
                .textures()
                .map(|(_, texture)| (texture, self.textures.release(texture)))
                .collect(),
            _ => Vec::new(),
        };
        MaterialRelease { material, textures }
    }

    // ===== Textures =====

    /// Store a texture with no referrers.
    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        if !texture.is_complete() {
            log::warn!(
                "texture {:?} holds {} bytes for {}x{} pixels",
                texture.label(),
                texture.data().len(),
                texture.width(),
                texture.height()
            );
        }
        self.textures.insert(texture)
    }

    /// Borrow a live texture.
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// Number of referrers of a live texture.
    pub fn texture_ref_count(&self, handle: TextureHandle) -> Option<u32> {
        self.textures.ref_count(handle)
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Drop one referrer of a texture, disposing it when none remain.
    pub fn release_texture(&mut self, handle: TextureHandle) -> Release<Texture> {
        self.textures.release(handle)
    }

    // ===== Mesh resources =====

    fn mesh_role_mut(&mut self, id: NodeId) -> SceneResult<&mut MeshRole> {
        let node = self.node_mut(id).ok_or(SceneError::NotObject(id))?;
        match &mut node.role {
            NodeRole::Mesh(mesh) => Ok(mesh),
            _ => Err(SceneError::NotMesh(id)),
        }
    }

    /// Point mesh `id` at another geometry.
    ///
    /// The new geometry is retained and the previous one released; the
    /// previous geometry's release is returned.
    pub fn set_mesh_geometry(
        &mut self,
        id: NodeId,
        geometry: Option<GeometryHandle>,
    ) -> SceneResult<Option<Release<BufferGeometry>>> {
        let previous = self.mesh_role_mut(id)?.geometry;
        if previous == geometry {
            return Ok(None);
        }
        if let Some(handle) = geometry
            && !self.geometries.retain(handle)
        {
            return Err(SceneError::NotBufferGeometry(GeometryDefect::Disposed));
        }

        self.mesh_role_mut(id)?.geometry = geometry;
        Ok(previous.map(|handle| self.geometries.release(handle)))
    }

    /// Point mesh `id` at another material, retaining the new one and
    /// releasing the previous one.
    pub fn set_mesh_material(
        &mut self,
        id: NodeId,
        material: Option<MaterialHandle>,
    ) -> SceneResult<Option<MaterialRelease>> {
        let previous = self.mesh_role_mut(id)?.material;
        if previous == material {
            return Ok(None);
        }
        if let Some(handle) = material
            && !self.materials.retain(handle)
        {
            return Err(SceneError::DisposedMaterial);
        }

        self.mesh_role_mut(id)?.material = material;
        Ok(previous.map(|handle| self.release_material(handle)))
    }

    /// Clear the resources of mesh `id` without releasing them.
    ///
    /// The caller takes over the node's references and must release them.
    pub(crate) fn take_mesh_resources(&mut self, id: NodeId) -> Option<MeshRole> {
        self.mesh_role_mut(id).ok().map(std::mem::take)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("nodes", &self.node_count)
            .field("geometries", &self.geometries.len())
            .field("materials", &self.materials.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}

fn describe<T>(release: &Release<T>) -> String {
    match release {
        Release::Disposed(_) => "disposed".to_string(),
        Release::Retained { remaining } => format!("retained by {remaining}"),
        Release::Stale => "already disposed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::TextureSlot;
    use crate::math::{Vec3, quat_from_rotation_y, transform_point};
    use crate::mesh::generators::generate_quad;

    fn translation(m: &Mat4) -> Vec3 {
        transform_point(m, &Vec3::zeros())
    }

    #[test]
    fn spawn_and_link() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn(Node::group().with_name("parent"));
        let a = graph.spawn(Node::group());
        let b = graph.spawn(Node::group());

        graph.add_child(parent, a).unwrap();
        graph.add_child(parent, b).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.children(parent), &[a, b]);
        assert_eq!(graph.parent(a), Some(parent));
        assert_eq!(graph.roots(), vec![parent]);
    }

    #[test]
    fn add_child_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn(Node::group());
        let b = graph.spawn(Node::group());
        graph.add_child(a, b).unwrap();

        assert_eq!(
            graph.add_child(b, a),
            Err(SceneError::CyclicHierarchy { child: a, parent: b })
        );
        assert_eq!(
            graph.add_child(a, a),
            Err(SceneError::CyclicHierarchy { child: a, parent: a })
        );
    }

    #[test]
    fn reparent_moves_between_children_lists() {
        let mut graph = SceneGraph::new();
        let first = graph.spawn(Node::group());
        let second = graph.spawn(Node::group());
        let child = graph.spawn(Node::group());

        graph.add_child(first, child).unwrap();
        graph.add_child(second, child).unwrap();

        assert!(graph.children(first).is_empty());
        assert_eq!(graph.children(second), &[child]);

        graph.detach(child).unwrap();
        assert!(graph.children(second).is_empty());
        assert_eq!(graph.parent(child), None);
    }

    #[test]
    fn world_matrix_composes_ancestors() {
        let mut graph = SceneGraph::new();
        let root = graph.spawn(
            Node::group().with_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = graph.spawn(
            Node::group().with_transform(Transform::from_translation(Vec3::new(0.0, 2.0, 0.0))),
        );
        graph.add_child(root, child).unwrap();

        let world = graph.update_world_matrix(child, true, false).unwrap();
        assert_eq!(translation(&world), Vec3::new(1.0, 2.0, 0.0));

        graph.node_mut(root).unwrap().transform.translation = Vec3::new(5.0, 0.0, 0.0);
        graph.update_world_matrices();
        let world = graph.world_matrix(child).unwrap();
        assert_eq!(translation(&world), Vec3::new(5.0, 2.0, 0.0));
    }

    #[test]
    fn world_matrices_of_deep_chain() {
        const DEPTH: usize = 200_000;
        let step = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));

        // Grow the chain at the root so each link check is one step
        let mut graph = SceneGraph::new();
        let leaf = graph.spawn(Node::group().with_transform(step));
        let mut top = leaf;
        for _ in 1..DEPTH {
            let parent = graph.spawn(Node::group().with_transform(step));
            graph.add_child(parent, top).unwrap();
            top = parent;
        }

        graph.update_world_matrices();
        assert_eq!(translation(&graph.world_matrix(leaf).unwrap()).y, DEPTH as f32);

        graph.node_mut(top).unwrap().transform = Transform::identity();
        let world = graph.update_world_matrix(leaf, true, false).unwrap();
        assert_eq!(translation(&world).y, (DEPTH - 1) as f32);

        graph.update_world_matrix(top, false, true).unwrap();
        assert_eq!(translation(&graph.world_matrix(leaf).unwrap()).y, (DEPTH - 1) as f32);
    }

    #[test]
    fn attach_preserves_world_placement() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn(
            Node::group().with_transform(
                Transform::from_translation(Vec3::new(5.0, 0.0, 0.0))
                    .with_rotation(quat_from_rotation_y(std::f32::consts::FRAC_PI_2))
                    .with_scale(Vec3::repeat(2.0)),
            ),
        );
        let child = graph.spawn(
            Node::group().with_transform(Transform::from_translation(Vec3::new(1.0, 2.0, 3.0))),
        );

        graph.attach(Some(parent), child).unwrap();

        assert_eq!(graph.parent(child), Some(parent));
        let world = graph.update_world_matrix(child, true, false).unwrap();
        assert!((translation(&world) - Vec3::new(1.0, 2.0, 3.0)).norm() < 1e-4);

        graph.attach(None, child).unwrap();
        assert_eq!(graph.parent(child), None);
        let local = graph.node(child).unwrap().transform;
        assert!((local.translation - Vec3::new(1.0, 2.0, 3.0)).norm() < 1e-4);
    }

    #[test]
    fn attach_under_degenerate_parent_fails() {
        let mut graph = SceneGraph::new();
        let flat = graph.spawn(
            Node::group().with_transform(Transform::identity().with_scale(Vec3::new(1.0, 0.0, 1.0))),
        );
        let child = graph.spawn(Node::group());

        assert_eq!(
            graph.attach(Some(flat), child),
            Err(SceneError::SingularTransform(flat))
        );
        assert_eq!(graph.parent(child), None);
    }

    #[test]
    fn despawn_promotes_children_and_invalidates_id() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn(Node::group());
        let child = graph.spawn(Node::group());
        graph.add_child(parent, child).unwrap();

        assert!(graph.despawn(parent).is_some());
        assert!(!graph.contains(parent));
        assert_eq!(graph.parent(child), None);
        assert!(graph.despawn(parent).is_none());

        let reused = graph.spawn(Node::group());
        assert_eq!(reused.index(), parent.index());
        assert!(!graph.contains(parent));
        assert_eq!(parent.to_string(), "Node(0@0)");
        assert_eq!(reused.to_string(), "Node(0@1)");
    }

    #[test]
    fn traverse_is_pre_order() {
        let mut graph = SceneGraph::new();
        let root = graph.spawn(Node::group());
        let a = graph.spawn(Node::group());
        let a1 = graph.spawn(Node::group());
        let b = graph.spawn(Node::group());
        graph.add_child(root, a).unwrap();
        graph.add_child(a, a1).unwrap();
        graph.add_child(root, b).unwrap();

        let mut order = Vec::new();
        graph.traverse(root, |id, _| order.push(id));
        assert_eq!(order, vec![root, a, a1, b]);
        assert_eq!(graph.descendants(root), vec![a, a1, b]);
    }

    #[test]
    fn mesh_nodes_count_as_referrers() {
        let mut graph = SceneGraph::new();
        let geometry = graph.add_geometry(generate_quad(1.0, 1.0));
        let first = graph.spawn(Node::mesh(Some(geometry), None));
        let second = graph.spawn(Node::mesh(Some(geometry), None));
        assert_eq!(graph.geometry_ref_count(geometry), Some(2));

        graph.despawn(first);
        assert_eq!(graph.geometry_ref_count(geometry), Some(1));

        graph.despawn(second);
        assert_eq!(graph.geometry_ref_count(geometry), None);
        assert_eq!(
            graph.geometry(geometry).err(),
            Some(SceneError::NotBufferGeometry(GeometryDefect::Disposed))
        );
    }

    #[test]
    fn set_mesh_geometry_swaps_references() {
        let mut graph = SceneGraph::new();
        let old = graph.add_geometry(generate_quad(1.0, 1.0));
        let new = graph.add_geometry(generate_quad(2.0, 2.0));
        let mesh = graph.spawn(Node::mesh(Some(old), None));

        let released = graph.set_mesh_geometry(mesh, Some(new)).unwrap();
        assert!(matches!(released, Some(Release::Disposed(_))));
        assert_eq!(graph.geometry_ref_count(new), Some(1));

        let group = graph.spawn(Node::group());
        assert_eq!(
            graph.set_mesh_geometry(group, Some(new)).err(),
            Some(SceneError::NotMesh(group))
        );
    }

    #[test]
    fn material_holds_its_textures() {
        let mut graph = SceneGraph::new();
        let texture = graph.add_texture(Texture::solid([255; 4]));
        let material = graph.add_material(
            Material::new()
                .with_texture(TextureSlot::Map, texture)
                .with_texture(TextureSlot::EmissiveMap, texture),
        );
        assert_eq!(graph.texture_ref_count(texture), Some(2));

        let mesh = graph.spawn(Node::mesh(None, Some(material)));
        assert_eq!(graph.material_ref_count(material), Some(1));

        let released = graph.set_mesh_material(mesh, None).unwrap().unwrap();
        assert!(matches!(released.material, Release::Disposed(_)));
        assert_eq!(released.textures.len(), 2);
        assert!(matches!(released.textures[0].1, Release::Retained { remaining: 1 }));
        assert!(matches!(released.textures[1].1, Release::Disposed(_)));
        assert_eq!(graph.texture_count(), 0);
    }
}
