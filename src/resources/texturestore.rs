//! Frame texture store.
//!
//! Owns every texture loaded for animation frames and light sprites. The
//! animation model never holds GPU objects directly: a
//! [`FrameVariant`](crate::animation::frame::FrameVariant) keeps
//! [`TextureId`] handles into this store, and textures are destroyed only
//! through [`TextureStore::release`].
//!
//! Entries may exist without a GPU texture (dimensions only). Headless tools
//! and tests use those to exercise layout and package building.

use std::path::PathBuf;

use bevy_ecs::prelude::Resource;
use raylib::ffi;
use raylib::prelude::{RenderTexture2D, Texture2D};

/// Handle to a texture owned by [`TextureStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// A texture living on the GPU.
///
/// Flipped copies are produced by drawing into a render texture, so both
/// kinds are stored.
pub enum GpuTexture {
    Plain(Texture2D),
    Target(RenderTexture2D),
}

impl GpuTexture {
    /// Raw texture handle for draw calls.
    pub fn raw(&self) -> &ffi::Texture2D {
        match self {
            GpuTexture::Plain(t) => &**t,
            GpuTexture::Target(rt) => &rt.texture,
        }
    }
}

/// One stored texture.
pub struct TextureEntry {
    pub width: i32,
    pub height: i32,
    /// File the texture was loaded from, if any.
    pub source: Option<PathBuf>,
    pub gpu: Option<GpuTexture>,
    /// Whether draws from this texture should be vertically inverted
    /// (render textures are stored bottom-up).
    pub bottom_up: bool,
}

impl TextureEntry {
    /// An entry carrying dimensions only.
    pub fn headless(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            source: None,
            gpu: None,
            bottom_up: false,
        }
    }
}

impl std::fmt::Debug for TextureEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureEntry")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source", &self.source)
            .field("gpu", &self.gpu.is_some())
            .finish()
    }
}

/// Slot store of frame textures keyed by [`TextureId`].
#[derive(Resource, Default)]
pub struct TextureStore {
    entries: Vec<Option<TextureEntry>>,
    free: Vec<u32>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a texture and return its handle.
    pub fn insert(&mut self, entry: TextureEntry) -> TextureId {
        if let Some(slot) = self.free.pop() {
            self.entries[slot as usize] = Some(entry);
            return TextureId(slot);
        }
        self.entries.push(Some(entry));
        TextureId((self.entries.len() - 1) as u32)
    }

    /// Register a texture by size only.
    pub fn insert_headless(&mut self, width: i32, height: i32) -> TextureId {
        self.insert(TextureEntry::headless(width, height))
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureEntry> {
        self.entries.get(id.0 as usize).and_then(|e| e.as_ref())
    }

    /// Width and height of a stored texture.
    pub fn size(&self, id: TextureId) -> Option<(i32, i32)> {
        self.get(id).map(|e| (e.width, e.height))
    }

    /// Destroy a texture. Returns false if the handle was already free.
    pub fn release(&mut self, id: TextureId) -> bool {
        match self.entries.get_mut(id.0 as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                self.free.push(id.0);
                true
            }
            _ => false,
        }
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
