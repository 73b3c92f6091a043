//! CPU-side texture resources.
//!
//! Provides [`Texture`] for holding the RGBA8 pixel data referenced by
//! material slots.

use crate::pool::Handle;

/// Handle to a [`Texture`] stored in a [`SceneGraph`](crate::scene::SceneGraph).
pub type TextureHandle = Handle<Texture>;

/// Size of one RGBA8 pixel in bytes.
const BYTES_PER_PIXEL: usize = 4;

/// Raw RGBA8 pixel data for a 2D texture.
#[derive(Clone, PartialEq)]
pub struct Texture {
    label: Option<String>,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Texture {
    /// Creates a texture from tightly packed rows of pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            label: None,
            width,
            height,
            data,
        }
    }

    /// A 1x1 texture of the given color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self::new(1, 1, rgba.to_vec())
    }

    /// Set a debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns `true` if the pixel data covers exactly `width * height` pixels.
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("label", &self.label)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish()
    }
}
