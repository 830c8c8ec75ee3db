//! Frame-cache rebuild from the pre-rendered PNG layout.
//!
//! Layout under an animation folder:
//!
//! ```text
//! scale_{p}/normal/{i}.png       required
//! scale_{p}/foreground/{i}.png   optional
//! scale_{p}/background/{i}.png   optional
//! scale_{p}/mask/{i}.png         required when the asset is shaded
//! ```
//!
//! The animation folder is `cache/<asset>/animations/<animation>`, or
//! `cache/<asset>/animations` itself when an asset ships a single
//! animation without a per-animation subfolder.

use std::path::{Path, PathBuf};

use super::{AssetInfo, PartialLoad, TextureLoader, VariantLoad};
use crate::animation::{Animation, FrameVariant};
use crate::error::AnimError;
use crate::resources::texturestore::{TextureId, TextureStore};
use crate::scaling::{scale_percent, variant_folder};

/// Where an asset's frames live and how to load them.
#[derive(Clone, Copy, Debug)]
pub struct FrameLayout<'a> {
    pub root: &'a Path,
    pub asset: &'a str,
    /// Asset-level steps, used when an animation has none of its own.
    pub scale_variants: &'a [f32],
    pub shaded: bool,
    pub smooth: bool,
}

impl<'a> FrameLayout<'a> {
    pub fn from_info(root: &'a Path, info: &'a AssetInfo) -> Self {
        Self {
            root,
            asset: &info.name,
            scale_variants: &info.scale_variants,
            shaded: info.shaded,
            smooth: info.smooth_scaling,
        }
    }

    /// `root/cache/<asset>/animations`.
    pub fn animations_dir(&self) -> PathBuf {
        self.root.join("cache").join(self.asset).join("animations")
    }

    /// Folder holding `anim`'s `scale_{p}` directories.
    pub fn animation_dir(&self, anim: &Animation) -> PathBuf {
        let base = self.animations_dir();
        let sub = if anim.source.path.is_empty() {
            anim.name.as_str()
        } else {
            anim.source.path.as_str()
        };
        if !sub.is_empty() {
            let candidate = base.join(sub);
            if candidate.is_dir() {
                return candidate;
            }
        }
        base
    }

    /// Steps to load for `anim`: its own, else the asset's, else `[1.0]`.
    pub fn steps_for(&self, anim: &Animation) -> Vec<f32> {
        if !anim.variant_steps().is_empty() {
            anim.variant_steps().to_vec()
        } else if !self.scale_variants.is_empty() {
            self.scale_variants.to_vec()
        } else {
            vec![1.0]
        }
    }
}

/// PNG paths of one frame at one scale step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerPaths {
    pub normal: PathBuf,
    pub foreground: PathBuf,
    pub background: PathBuf,
    pub mask: PathBuf,
}

pub fn variant_layer_paths(animation_dir: &Path, scale: f32, frame_index: usize) -> LayerPaths {
    let folder = variant_folder(animation_dir, scale);
    let file = format!("{}.png", frame_index);
    LayerPaths {
        normal: folder.join("normal").join(&file),
        foreground: folder.join("foreground").join(&file),
        background: folder.join("background").join(&file),
        mask: folder.join("mask").join(&file),
    }
}

/// Number of consecutive `0.png`, `1.png`, ... files in `folder`.
pub fn count_frames(folder: &Path) -> usize {
    if !folder.is_dir() {
        log::debug!("Frame folder does not exist: {}", folder.display());
        return 0;
    }
    let mut count = 0;
    while folder.join(format!("{}.png", count)).is_file() {
        count += 1;
    }
    count
}

/// Reload every scale variant of frame `frame_index`.
///
/// A variant whose `normal` texture is missing keeps its previous textures
/// and is reported in [`PartialLoad::missing`]. A missing mask on a shaded
/// asset is reported too, but the variant is still installed.
pub fn rebuild_frame<L: TextureLoader>(
    anim: &mut Animation,
    frame_index: usize,
    layout: &FrameLayout<'_>,
    loader: &mut L,
    store: &mut TextureStore,
) -> PartialLoad {
    let mut result = PartialLoad::default();
    let steps = layout.steps_for(anim);
    if anim.variant_steps().is_empty() {
        anim.set_variant_steps(steps.clone());
    }
    let dir = layout.animation_dir(anim);
    let anim_name = anim.name.clone();

    let mut released: Vec<TextureId> = Vec::new();
    {
        let cache = anim.frame_cache_mut();
        if cache.len() <= frame_index {
            cache.resize_with(frame_index + 1, Vec::new);
        }
        let variants = &mut cache[frame_index];
        variants.resize_with(steps.len(), FrameVariant::default);

        for (variant_idx, &scale) in steps.iter().enumerate() {
            let paths = variant_layer_paths(&dir, scale, frame_index);
            let Some(base) = loader.load_png(store, &paths.normal, layout.smooth) else {
                log::warn!(
                    "{}::{} frame {} has no base texture at {}",
                    layout.asset,
                    anim_name,
                    frame_index,
                    paths.normal.display()
                );
                result.missing.push(AnimError::MissingTexture { path: paths.normal });
                continue;
            };

            let mut fresh = FrameVariant::new(variant_idx);
            fresh.base = Some(base);
            fresh.foreground = loader.load_png(store, &paths.foreground, layout.smooth);
            fresh.background = loader.load_png(store, &paths.background, layout.smooth);
            if layout.shaded {
                fresh.shadow_mask = loader.load_png(store, &paths.mask, layout.smooth);
                if fresh.shadow_mask.is_none() {
                    log::warn!(
                        "{}::{} frame {} is shaded but has no mask at {}",
                        layout.asset,
                        anim_name,
                        frame_index,
                        paths.mask.display()
                    );
                    result.missing.push(AnimError::MissingTexture { path: paths.mask });
                }
            }

            let previous = std::mem::replace(&mut variants[variant_idx], fresh);
            released.extend(previous.textures());
            result.loaded.push(VariantLoad {
                frame: frame_index,
                variant: variant_idx,
                percent: scale_percent(scale),
            });
        }
    }

    for id in released {
        store.release(id);
    }
    anim.refresh_texture_bindings();
    result
}

/// [`rebuild_frame`] for every frame of the primary path.
pub fn rebuild_animation<L: TextureLoader>(
    anim: &mut Animation,
    layout: &FrameLayout<'_>,
    loader: &mut L,
    store: &mut TextureStore,
) -> PartialLoad {
    let mut result = PartialLoad::default();
    for frame_index in 0..anim.frame_count() {
        result.merge(rebuild_frame(anim, frame_index, layout, loader, store));
    }
    result
}

/// Load a folder-sourced animation from scratch.
///
/// The frame count comes from the largest step's `normal` folder. Movement
/// and child data already on the animation are replaced by one still frame
/// per texture; the caller applies its document afterwards.
pub fn load_folder_animation<L: TextureLoader>(
    anim: &mut Animation,
    layout: &FrameLayout<'_>,
    loader: &mut L,
    store: &mut TextureStore,
) -> PartialLoad {
    let steps = layout.steps_for(anim);
    let dir = layout.animation_dir(anim);
    let count = steps
        .first()
        .map(|&s| count_frames(&variant_folder(&dir, s).join("normal")))
        .unwrap_or(0);
    if count == 0 {
        log::warn!(
            "{}::{} has no frames under {}",
            layout.asset,
            anim.name,
            dir.display()
        );
    }

    let displaced = anim.adopt_prebuilt_frames(vec![Vec::new(); count], steps);
    for id in displaced {
        store.release(id);
    }
    rebuild_animation(anim, layout, loader, store)
}

/// Release every texture `anim` owns.
pub fn clear_texture_cache(anim: &mut Animation, store: &mut TextureStore) {
    for id in anim.take_texture_cache() {
        store.release(id);
    }
}
