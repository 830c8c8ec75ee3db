//! Derived animations: flipped and/or reversed copies of another animation.
//!
//! Every texture of the source is redrawn through [`TextureLoader::render_flipped`]
//! so the copy owns its own handles; releasing one animation never pulls
//! textures out from under the other.

use super::{PartialLoad, TextureLoader, VariantLoad};
use crate::animation::{
    Animation, AnimationChildData, AnimationChildFrameData, AnimationFrame, FrameVariant,
    MovementPath,
};
use crate::error::{AnimError, AnimResult};
use crate::resources::texturestore::{TextureId, TextureStore};
use crate::scaling::scale_percent;

/// How a derived animation differs from its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CloneOptions {
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub reverse_frames: bool,
    pub flip_movement_horizontal: bool,
    pub flip_movement_vertical: bool,
}

impl CloneOptions {
    /// Options carried by a derived animation's own flags.
    pub fn from_animation(anim: &Animation) -> Self {
        Self {
            flip_horizontal: anim.flipped_source,
            flip_vertical: anim.flip_vertical_source,
            reverse_frames: anim.reverse_source,
            flip_movement_horizontal: anim.flip_movement_horizontal,
            flip_movement_vertical: anim.flip_movement_vertical,
        }
    }

    fn flips_children_h(&self) -> bool {
        self.flip_horizontal || self.flip_movement_horizontal
    }

    fn flips_children_v(&self) -> bool {
        self.flip_vertical || self.flip_movement_vertical
    }
}

/// Mirror child offsets. Each axis is negated at most once, whether the
/// image or only the movement is flipped.
pub fn apply_child_frame_flip(children: &mut [AnimationChildFrameData], opts: &CloneOptions) {
    let (flip_h, flip_v) = (opts.flips_children_h(), opts.flips_children_v());
    if !flip_h && !flip_v {
        return;
    }
    for child in children {
        if flip_h {
            child.dx = -child.dx;
        }
        if flip_v {
            child.dy = -child.dy;
        }
    }
}

fn clone_texture<L: TextureLoader>(
    id: Option<TextureId>,
    opts: &CloneOptions,
    smooth: bool,
    loader: &mut L,
    store: &mut TextureStore,
) -> Option<TextureId> {
    loader.render_flipped(store, id?, opts.flip_horizontal, opts.flip_vertical, smooth)
}

fn missing_clone(store: &TextureStore, id: TextureId) -> AnimError {
    let path = store
        .get(id)
        .and_then(|e| e.source.clone())
        .unwrap_or_else(|| format!("<texture {}>", id.0).into());
    AnimError::MissingTexture { path }
}

fn copy_frame(src: Option<&AnimationFrame>, opts: &CloneOptions) -> AnimationFrame {
    let Some(src) = src else {
        return AnimationFrame::default();
    };
    let mut frame = AnimationFrame {
        dx: if opts.flip_movement_horizontal { -src.dx } else { src.dx },
        dy: if opts.flip_movement_vertical { -src.dy } else { src.dy },
        z_resort: src.z_resort,
        rgb: src.rgb,
        children: src.children.clone(),
        hit_geometry: src.hit_geometry.clone(),
        attack_geometry: src.attack_geometry.clone(),
        ..AnimationFrame::default()
    };
    apply_child_frame_flip(&mut frame.children, opts);
    frame
}

/// Fill `dest` with a transformed copy of `source`.
///
/// `dest`'s previous textures are released. The copy takes the source's
/// scale steps, playback flags, child names and audio; movement and child
/// samples follow the flip options. Fails only when the source has no
/// frames; textures that could not be redrawn are reported in the
/// returned [`PartialLoad`].
pub fn copy_from<L: TextureLoader>(
    source: &Animation,
    dest: &mut Animation,
    opts: &CloneOptions,
    smooth: bool,
    loader: &mut L,
    store: &mut TextureStore,
) -> AnimResult<PartialLoad> {
    let frame_count = source.frame_cache().len();
    if frame_count == 0 || source.variant_count() == 0 {
        return Err(AnimError::MalformedPayload {
            reason: format!("source animation '{}' has no frames to copy", source.name),
        });
    }

    for id in dest.take_texture_cache() {
        store.release(id);
    }

    dest.set_variant_steps(source.variant_steps().to_vec());
    dest.locked = source.locked;
    dest.on_end = source.on_end.clone();
    dest.randomize = source.randomize;
    dest.looped = source.looped;
    dest.rnd_start = source.rnd_start;
    dest.frozen = source.frozen;
    dest.audio = source.audio.clone();

    let src_index = |dst: usize| {
        if opts.reverse_frames {
            frame_count - 1 - dst
        } else {
            dst
        }
    };

    let steps = source.variant_steps();
    let mut result = PartialLoad::default();
    let mut cache: Vec<Vec<FrameVariant>> = Vec::with_capacity(frame_count);
    for dst in 0..frame_count {
        let src_variants = &source.frame_cache()[src_index(dst)];
        let mut variants = Vec::with_capacity(steps.len());
        for (v, &scale) in steps.iter().enumerate() {
            let src = src_variants.get(v).copied().unwrap_or_default();
            let mut copy = FrameVariant::new(v);
            copy.base = clone_texture(src.base, opts, smooth, loader, store);
            copy.foreground = clone_texture(src.foreground, opts, smooth, loader, store);
            copy.background = clone_texture(src.background, opts, smooth, loader, store);
            copy.shadow_mask = clone_texture(src.shadow_mask, opts, smooth, loader, store);
            match (src.base, copy.base) {
                (_, Some(_)) => result.loaded.push(VariantLoad {
                    frame: dst,
                    variant: v,
                    percent: scale_percent(scale),
                }),
                (Some(id), None) => result.missing.push(missing_clone(store, id)),
                (None, None) => result.missing.push(AnimError::MissingTexture {
                    path: format!("{}:{}/{}", source.name, src_index(dst), v).into(),
                }),
            }
            variants.push(copy);
        }
        cache.push(variants);
    }

    let paths: Vec<MovementPath> = source
        .movement_paths()
        .iter()
        .map(|path| {
            MovementPath::new(
                (0..frame_count)
                    .map(|dst| copy_frame(path.frames.get(src_index(dst)), opts))
                    .collect(),
            )
        })
        .collect();

    let timelines: Vec<AnimationChildData> = source
        .child_timelines()
        .iter()
        .cloned()
        .map(|mut t| {
            apply_child_frame_flip(&mut t.frames, opts);
            if t.is_static() && opts.reverse_frames {
                t.frames.reverse();
            }
            t
        })
        .collect();

    let displaced = dest.set_frame_cache(cache);
    for id in displaced {
        store.release(id);
    }
    dest.set_movement_paths(if paths.is_empty() {
        vec![MovementPath::new(vec![AnimationFrame::default(); frame_count])]
    } else {
        paths
    });
    dest.set_child_data(source.child_assets().to_vec(), timelines);
    dest.rebuild_child_timelines_from_frames();
    dest.compute_totals();

    Ok(result)
}
