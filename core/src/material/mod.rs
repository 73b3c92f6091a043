//! CPU-side material definitions.
//!
//! - [`Material`]: Named set of texture references
//! - [`TextureSlot`]: The slots a material may populate
//!
//! Texture slots hold [`TextureHandle`]s. When a material is added to a
//! [`SceneGraph`](crate::scene::SceneGraph) each populated slot counts as one
//! referrer of its texture, and releasing the material releases them again.

use crate::pool::Handle;
use crate::texture::TextureHandle;

/// Handle to a [`Material`] stored in a [`SceneGraph`](crate::scene::SceneGraph).
pub type MaterialHandle = Handle<Material>;

/// Texture slots of a [`Material`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    /// Diffuse / albedo color.
    Map,
    /// Ambient occlusion.
    AoMap,
    /// Emissive color.
    EmissiveMap,
    /// Bump (height) map.
    BumpMap,
    /// Tangent-space normal map.
    NormalMap,
    /// Vertex displacement.
    DisplacementMap,
    /// Roughness.
    RoughnessMap,
    /// Metalness.
    MetalnessMap,
    /// Alpha (opacity) mask.
    AlphaMap,
}

impl TextureSlot {
    /// Number of slots.
    pub const COUNT: usize = 9;

    /// Every slot, in storage order.
    pub const ALL: [TextureSlot; Self::COUNT] = [
        Self::Map,
        Self::AoMap,
        Self::EmissiveMap,
        Self::BumpMap,
        Self::NormalMap,
        Self::DisplacementMap,
        Self::RoughnessMap,
        Self::MetalnessMap,
        Self::AlphaMap,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// CPU-side material: a name plus the textures bound to its slots.
///
/// # Example
///
/// ```
/// use scene_utils::material::{Material, TextureSlot};
/// use scene_utils::scene::SceneGraph;
/// use scene_utils::texture::Texture;
///
/// let mut graph = SceneGraph::new();
/// let albedo = graph.add_texture(Texture::solid([255, 0, 0, 255]));
///
/// let material = Material::new()
///     .with_name("red")
///     .with_texture(TextureSlot::Map, albedo);
///
/// assert_eq!(material.texture(TextureSlot::Map), Some(albedo));
/// assert_eq!(material.textures().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name.
    pub name: Option<String>,
    slots: [Option<TextureHandle>; TextureSlot::COUNT],
}

impl Material {
    /// Creates an unnamed material with no textures.
    pub fn new() -> Self {
        Self {
            name: None,
            slots: [None; TextureSlot::COUNT],
        }
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Populate a texture slot.
    #[must_use]
    pub fn with_texture(mut self, slot: TextureSlot, texture: TextureHandle) -> Self {
        self.slots[slot.index()] = Some(texture);
        self
    }

    /// Texture in `slot`, if populated.
    pub fn texture(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.slots[slot.index()]
    }

    /// Iterate over populated slots in [`TextureSlot::ALL`] order.
    ///
    /// A texture bound to several slots is yielded once per slot.
    pub fn textures(&self) -> impl Iterator<Item = (TextureSlot, TextureHandle)> + '_ {
        TextureSlot::ALL
            .iter()
            .filter_map(|&slot| self.texture(slot).map(|texture| (slot, texture)))
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ResourcePool;
    use crate::texture::Texture;

    #[test]
    fn test_slot_order_matches_storage() {
        for (i, slot) in TextureSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn test_material_defaults() {
        let material = Material::default();
        assert!(material.name.is_none());
        assert_eq!(material.textures().count(), 0);
    }

    #[test]
    fn test_material_slots() {
        let mut textures = ResourcePool::new();
        let normal = textures.insert(Texture::solid([128, 128, 255, 255]));
        let mask = textures.insert(Texture::solid([255, 255, 255, 255]));

        let material = Material::new()
            .with_texture(TextureSlot::AlphaMap, mask)
            .with_texture(TextureSlot::NormalMap, normal);

        assert_eq!(material.texture(TextureSlot::Map), None);
        assert_eq!(
            material.textures().collect::<Vec<_>>(),
            vec![(TextureSlot::NormalMap, normal), (TextureSlot::AlphaMap, mask)]
        );
    }
}
