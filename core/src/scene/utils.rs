//! Scene utilities: queries, ungrouping, bounds and disposal.
//!
//! Queries never fail. Structural operations return [`SceneResult`] for
//! hard failures. Disposal operations are soft: bad input yields an
//! [`Outcome`] carrying a warning, so callers looping over many nodes can
//! skip the entry and continue.

use std::collections::HashSet;

use crate::error::{Outcome, SceneError, SceneResult, SceneWarning};
use crate::material::MaterialHandle;
use crate::math::{self, Aabb, Mat4};
use crate::mesh::{BufferGeometry, GeometryHandle, accessor};
use crate::pool::Release;
use crate::texture::TextureHandle;

use super::graph::{MaterialRelease, NodeId, SceneGraph};
use super::types::{Node, NodeKind, Transform};

// ===== Queries =====

/// Returns `true` if `id` refers to a live node.
pub fn is_object(graph: &SceneGraph, id: NodeId) -> bool {
    graph.contains(id)
}

/// Returns `true` if `id` refers to a live mesh node.
pub fn is_mesh(graph: &SceneGraph, id: NodeId) -> bool {
    graph.node(id).is_some_and(|node| node.role().is_mesh())
}

/// Mesh nodes of the subtree at `root`, `root` included, in pre-order.
pub fn get_all_meshes(graph: &SceneGraph, root: NodeId) -> Vec<NodeId> {
    get_class_instance_objects(graph, root, NodeKind::Mesh)
}

/// Nodes of the subtree at `root` whose role is selected by `kind`.
pub fn get_class_instance_objects(graph: &SceneGraph, root: NodeId, kind: NodeKind) -> Vec<NodeId> {
    find_objects(graph, root, |node| kind.matches(node.role()))
}

/// Nodes of the subtree at `root` satisfying `predicate`, in pre-order.
pub fn find_objects(
    graph: &SceneGraph,
    root: NodeId,
    mut predicate: impl FnMut(&Node) -> bool,
) -> Vec<NodeId> {
    let mut found = Vec::new();
    graph.traverse(root, |id, node| {
        if predicate(node) {
            found.push(id);
        }
    });
    found
}

// ===== Ungrouping =====

/// Options for [`ungroup_all_meshes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UngroupOptions {
    /// Bake each relocated mesh's local transform into its geometry and
    /// reset the transform to identity.
    pub remove_mesh_transformation: bool,
}

impl UngroupOptions {
    /// Default options: relocate only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable transform baking.
    #[must_use]
    pub fn with_remove_mesh_transformation(mut self, remove: bool) -> Self {
        self.remove_mesh_transformation = remove;
        self
    }
}

/// What [`ungroup_all_meshes`] did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UngroupReport {
    /// Where the meshes went; `None` means they became roots.
    pub target: Option<NodeId>,
    /// Relocated meshes in pre-order.
    pub moved: Vec<NodeId>,
    /// Meshes whose transform was baked into their geometry.
    pub baked: Vec<NodeId>,
}

/// Move every mesh below `node` under `node`'s parent, keeping world
/// placement, then detach `node`.
///
/// `node` itself is not moved even if it is a mesh, and stays in the graph
/// with whatever non-mesh descendants remain. A parentless `node` promotes
/// the meshes to scene roots and reports [`SceneWarning::NoParent`].
///
/// With [`UngroupOptions::remove_mesh_transformation`] each relocated mesh
/// has its full placement relative to the new parent baked into its
/// geometry: positions by the matrix, normals by its inverse-transpose. The
/// matrix is baked as is, shear included, so the rendered position is
/// unchanged. A geometry shared with other referrers is copied first.
///
/// Every hard failure (singular target, malformed geometry to bake) is
/// detected before the graph is touched, so an error leaves it unchanged.
pub fn ungroup_all_meshes(
    graph: &mut SceneGraph,
    node: NodeId,
    options: UngroupOptions,
) -> SceneResult<Outcome<UngroupReport>> {
    crate::profile_function!();

    if !graph.contains(node) {
        return Err(SceneError::NotObject(node));
    }
    let target = graph.parent(node);
    let meshes: Vec<NodeId> = get_all_meshes(graph, node)
        .into_iter()
        .filter(|&mesh| mesh != node)
        .collect();

    graph.update_world_matrix(node, true, true)?;
    let target_inverse = match target {
        Some(target) => graph
            .world_matrix(target)
            .ok_or(SceneError::NotObject(target))?
            .try_inverse()
            .ok_or(SceneError::SingularTransform(target))?,
        None => Mat4::identity(),
    };

    // Placement of each mesh relative to the target, captured before any
    // mesh moves
    let mut placements = Vec::with_capacity(meshes.len());
    for &mesh in &meshes {
        let world = graph.world_matrix(mesh).ok_or(SceneError::NotObject(mesh))?;
        let baked_geometry = mesh_geometry(graph, mesh).filter(|_| options.remove_mesh_transformation);
        if let Some(geometry) = baked_geometry {
            accessor::validate(graph.geometry(geometry)?)?;
        }
        placements.push((mesh, target_inverse * world, baked_geometry.is_some()));
    }

    let mut outcome = Outcome::ok(UngroupReport {
        target,
        ..UngroupReport::default()
    });
    if target.is_none() {
        outcome.warn(SceneWarning::NoParent(node));
    }

    for &(mesh, local, bake) in &placements {
        match target {
            Some(target) => graph.add_child(target, mesh)?,
            None => graph.detach(mesh)?,
        }
        if bake {
            crate::profile_scope!("bake_mesh_transform");
            bake_mesh_transform(graph, mesh, &local, &mut outcome)?;
        } else if let Some(node) = graph.node_mut(mesh) {
            node.transform = Transform::from_matrix(&local);
        }
    }
    for &mesh in &meshes {
        graph.update_world_matrix(mesh, false, true)?;
    }

    graph.detach(node)?;
    log::debug!(
        "ungrouped {} meshes from {node} into {}",
        meshes.len(),
        target.map_or_else(|| "scene roots".to_string(), |t| t.to_string())
    );

    outcome.value.moved = meshes;
    Ok(outcome)
}

fn mesh_geometry(graph: &SceneGraph, mesh: NodeId) -> Option<GeometryHandle> {
    graph
        .node(mesh)
        .and_then(|node| node.role().as_mesh())
        .and_then(|role| role.geometry)
}

/// Bake `local` into the geometry of `mesh`, whose geometry was validated
/// by the caller, and reset its transform to identity.
fn bake_mesh_transform(
    graph: &mut SceneGraph,
    mesh: NodeId,
    local: &Mat4,
    outcome: &mut Outcome<UngroupReport>,
) -> SceneResult<()> {
    let Some(geometry) = mesh_geometry(graph, mesh) else {
        return Ok(());
    };
    if !math::is_similarity(local) {
        outcome.warn(SceneWarning::NonUniformScaleBake(mesh));
    }

    let geometry = if graph.geometry_ref_count(geometry).unwrap_or(0) > 1 {
        outcome.warn(SceneWarning::SharedGeometryCloned(mesh));
        let copy = graph.geometry(geometry)?.clone();
        let private = graph.add_geometry(copy);
        graph.set_mesh_geometry(mesh, Some(private))?;
        private
    } else {
        geometry
    };
    graph.geometry_mut(geometry)?.apply_matrix(local);

    // Children of the mesh absorb the placement it gives up
    for child in graph.children(mesh).to_vec() {
        if let Some(child) = graph.node_mut(child) {
            child.transform = Transform::from_matrix(&(local * child.transform.to_matrix()));
        }
    }
    if let Some(node) = graph.node_mut(mesh) {
        node.transform = Transform::identity();
    }

    outcome.value.baked.push(mesh);
    Ok(())
}

// ===== Bounds =====

/// Coordinate space of [`get_bounding_box`] results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsSpace {
    /// World space.
    #[default]
    World,
    /// The local space of the node's parent. Same as world for roots.
    ParentLocal,
}

/// Axis-aligned box around every mesh geometry in the subtree at `node`.
///
/// World matrices of `node`, its ancestors and its subtree are refreshed
/// first. A subtree without geometry yields the empty box.
pub fn get_bounding_box(graph: &mut SceneGraph, node: NodeId, space: BoundsSpace) -> SceneResult<Aabb> {
    crate::profile_function!();

    if !graph.contains(node) {
        return Err(SceneError::NotObject(node));
    }
    graph.update_world_matrix(node, true, true)?;

    let mut bounds = Aabb::empty();
    for mesh in get_all_meshes(graph, node) {
        let Some(geometry) = graph
            .node(mesh)
            .and_then(|n| n.role().as_mesh())
            .and_then(|role| role.geometry)
        else {
            continue;
        };
        let local = accessor::compute_bounding_box(graph.geometry(geometry)?)?;
        let world = graph.world_matrix(mesh).ok_or(SceneError::NotObject(mesh))?;
        bounds = bounds.union(&local.transformed(&world));
    }

    if space == BoundsSpace::ParentLocal
        && let Some(parent) = graph.parent(node)
    {
        let parent_world = graph.world_matrix(parent).ok_or(SceneError::NotObject(parent))?;
        let inverse = parent_world
            .try_inverse()
            .ok_or(SceneError::SingularTransform(parent))?;
        bounds = bounds.transformed(&inverse);
    }

    Ok(bounds)
}

// ===== Disposal =====

/// Resources disposed by [`delete_mesh_with_data`] or
/// [`delete_object_with_data`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisposalReport {
    /// Nodes removed from the graph.
    pub nodes_removed: usize,
    /// Geometries disposed, each listed once.
    pub geometries: Vec<GeometryHandle>,
    /// Materials disposed, each listed once.
    pub materials: Vec<MaterialHandle>,
    /// Textures disposed, each listed once.
    pub textures: Vec<TextureHandle>,
    /// Released resources that are still alive because other referrers
    /// remain.
    pub retained: usize,
}

#[derive(Default)]
struct Ledger {
    report: DisposalReport,
    released_geometries: HashSet<GeometryHandle>,
    released_materials: HashSet<MaterialHandle>,
    released_textures: HashSet<TextureHandle>,
}

impl Ledger {
    fn geometry(&mut self, handle: GeometryHandle, release: &Release<BufferGeometry>) -> bool {
        self.released_geometries.insert(handle);
        record(&mut self.report.geometries, handle, release)
    }

    fn material(&mut self, handle: MaterialHandle, release: MaterialRelease) -> bool {
        self.released_materials.insert(handle);
        let mut live = record(&mut self.report.materials, handle, &release.material);
        for (texture, texture_release) in &release.textures {
            self.released_textures.insert(*texture);
            live &= record(&mut self.report.textures, *texture, texture_release);
        }
        live
    }

    fn finish(mut self, graph: &SceneGraph) -> DisposalReport {
        self.report.retained = self
            .released_geometries
            .iter()
            .filter(|&&h| graph.geometry_ref_count(h).is_some())
            .count()
            + self
                .released_materials
                .iter()
                .filter(|&&h| graph.material_ref_count(h).is_some())
                .count()
            + self
                .released_textures
                .iter()
                .filter(|&&h| graph.texture_ref_count(h).is_some())
                .count();
        self.report
    }
}

/// Append `handle` to `disposed` if the release disposed it. Returns
/// `false` for stale handles.
fn record<H, T>(disposed: &mut Vec<H>, handle: H, release: &Release<T>) -> bool {
    match release {
        Release::Disposed(_) => {
            disposed.push(handle);
            true
        }
        Release::Retained { .. } => true,
        Release::Stale => false,
    }
}

/// Remove mesh `id` together with its descendants, releasing the
/// geometry and material of every mesh among them.
///
/// A disposed material releases the texture in each populated slot. The
/// descendants go with the mesh so nothing below it changes world
/// placement by surviving as a root. Unknown ids and non-mesh nodes are
/// left alone with a warning.
pub fn delete_mesh_with_data(graph: &mut SceneGraph, id: NodeId) -> Outcome<DisposalReport> {
    crate::profile_function!();

    let mut outcome = Outcome::ok(());
    let mut ledger = Ledger::default();
    if !graph.contains(id) {
        outcome.warn(SceneWarning::MissingNode(id));
    } else if !is_mesh(graph, id) {
        outcome.warn(SceneWarning::NotAMesh(id));
    } else {
        dispose_subtree(graph, id, &mut ledger, &mut outcome);
    }

    Outcome {
        value: ledger.finish(graph),
        warnings: outcome.warnings,
    }
}

/// Remove the subtree at `id` bottom-up, releasing every mesh's resources.
///
/// Each node goes after its descendants, siblings in reverse order. An
/// unknown id is left alone with a warning.
pub fn delete_object_with_data(graph: &mut SceneGraph, id: NodeId) -> Outcome<DisposalReport> {
    crate::profile_function!();

    let mut outcome = Outcome::ok(());
    let mut ledger = Ledger::default();
    if graph.contains(id) {
        dispose_subtree(graph, id, &mut ledger, &mut outcome);
    } else {
        outcome.warn(SceneWarning::MissingNode(id));
    }

    let report = ledger.finish(graph);
    log::debug!(
        "deleted {id}: {} nodes, {} geometries, {} materials, {} textures, {} retained",
        report.nodes_removed,
        report.geometries.len(),
        report.materials.len(),
        report.textures.len(),
        report.retained
    );
    Outcome {
        value: report,
        warnings: outcome.warnings,
    }
}

fn dispose_subtree(graph: &mut SceneGraph, root: NodeId, ledger: &mut Ledger, outcome: &mut Outcome<()>) {
    // Pre-order with first children popped first; reversed, every node
    // follows its descendants and later siblings come first
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        order.push(id);
        stack.extend(graph.children(id).iter().rev().copied());
    }

    for id in order.into_iter().rev() {
        dispose_node(graph, id, ledger, outcome);
    }
}

fn dispose_node(graph: &mut SceneGraph, id: NodeId, ledger: &mut Ledger, outcome: &mut Outcome<()>) {
    if let Some(resources) = graph.take_mesh_resources(id) {
        let mut live = true;
        if let Some(geometry) = resources.geometry {
            let release = graph.release_geometry(geometry);
            live &= ledger.geometry(geometry, &release);
        }
        if let Some(material) = resources.material {
            let release = graph.release_material(material);
            live &= ledger.material(material, release);
        }
        if !live {
            outcome.warn(SceneWarning::StaleResource(id));
        }
    }

    if graph.despawn(id).is_some() {
        ledger.report.nodes_removed += 1;
    }
}
