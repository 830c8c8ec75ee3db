//! raylib-backed [`TextureLoader`].
//!
//! PNGs become plain textures. Flipped copies are drawn into render
//! textures, which raylib stores bottom-up; the store entry records that so
//! draws can invert the source rectangle.

use std::path::Path;

use raylib::ffi::{self, TextureFilter};
use raylib::prelude::*;

use super::TextureLoader;
use crate::resources::texturestore::{GpuTexture, TextureEntry, TextureId, TextureStore};

/// Texture sampling used when frames are drawn scaled.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum RenderFilter {
    /// Sharp pixels.
    #[default]
    Nearest,
    Bilinear,
}

impl RenderFilter {
    /// Filter for an asset's `smooth_scaling` preference.
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth {
            RenderFilter::Bilinear
        } else {
            RenderFilter::Nearest
        }
    }

    fn raw(self) -> i32 {
        match self {
            RenderFilter::Nearest => TextureFilter::TEXTURE_FILTER_POINT as i32,
            RenderFilter::Bilinear => TextureFilter::TEXTURE_FILTER_BILINEAR as i32,
        }
    }

    fn apply(self, texture: ffi::Texture2D) {
        unsafe {
            ffi::SetTextureFilter(texture, self.raw());
        }
    }
}

/// Loads through a live raylib window. Must be used on the main thread.
pub struct RaylibTextureLoader<'a> {
    rl: &'a mut RaylibHandle,
    thread: &'a RaylibThread,
}

impl<'a> RaylibTextureLoader<'a> {
    pub fn new(rl: &'a mut RaylibHandle, thread: &'a RaylibThread) -> Self {
        Self { rl, thread }
    }
}

impl TextureLoader for RaylibTextureLoader<'_> {
    fn load_png(
        &mut self,
        store: &mut TextureStore,
        path: &Path,
        smooth: bool,
    ) -> Option<TextureId> {
        // Optional layers are usually absent; only report real failures.
        if !path.is_file() {
            return None;
        }
        let path_str = path.to_str()?;
        let texture = match self.rl.load_texture(self.thread, path_str) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to load texture {}: {}", path.display(), e);
                return None;
            }
        };
        RenderFilter::from_smooth(smooth).apply(*texture);
        let (width, height) = (texture.width, texture.height);
        Some(store.insert(TextureEntry {
            width,
            height,
            source: Some(path.to_path_buf()),
            gpu: Some(GpuTexture::Plain(texture)),
            bottom_up: false,
        }))
    }

    fn render_flipped(
        &mut self,
        store: &mut TextureStore,
        source: TextureId,
        flip_h: bool,
        flip_v: bool,
        smooth: bool,
    ) -> Option<TextureId> {
        let entry = store.get(source)?;
        let (width, height) = (entry.width.max(1), entry.height.max(1));
        let src_raw = *entry.gpu.as_ref()?.raw();
        let source_path = entry.source.clone();

        // A bottom-up source is read upside down already.
        let mut src_h = height as f32;
        if entry.bottom_up {
            src_h = -src_h;
        }
        if flip_v {
            src_h = -src_h;
        }
        let src_w = if flip_h { -(width as f32) } else { width as f32 };

        let mut target = match self
            .rl
            .load_render_texture(self.thread, width as u32, height as u32)
        {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to create render texture {}x{}: {}", width, height, e);
                return None;
            }
        };
        {
            let _mode = self.rl.begin_texture_mode(self.thread, &mut target);
            let src = Rectangle::new(0.0, 0.0, src_w, src_h);
            let dest = Rectangle::new(0.0, 0.0, width as f32, height as f32);
            unsafe {
                ffi::ClearBackground(Color::BLANK.into());
                ffi::DrawTexturePro(
                    src_raw,
                    src.into(),
                    dest.into(),
                    Vector2::zero().into(),
                    0.0,
                    Color::WHITE.into(),
                );
            }
        }
        RenderFilter::from_smooth(smooth).apply(target.texture);

        Some(store.insert(TextureEntry {
            width,
            height,
            source: source_path,
            gpu: Some(GpuTexture::Target(target)),
            bottom_up: true,
        }))
    }
}
