//! Frames, frame variants and movement paths.
//!
//! A movement path is a contiguous `Vec` of frames. Neighbour links are
//! stored as indices, so resizing or reordering a path only requires
//! [`MovementPath::link`] to be called again; nothing dangles.

use super::child::AnimationChildFrameData;
use super::combat::{FrameAttackGeometry, FrameHitGeometry};
use crate::resources::texturestore::TextureId;
use crate::types::Rgba;

/// Textures of one frame at one scale step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameVariant {
    /// Index into the animation's scale steps.
    pub variant: usize,
    pub base: Option<TextureId>,
    pub foreground: Option<TextureId>,
    pub background: Option<TextureId>,
    pub shadow_mask: Option<TextureId>,
}

impl FrameVariant {
    pub fn new(variant: usize) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Every texture handle this variant refers to.
    pub fn textures(self) -> impl Iterator<Item = TextureId> {
        [self.base, self.foreground, self.background, self.shadow_mask]
            .into_iter()
            .flatten()
    }
}

/// One time-step of an animation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    /// Movement applied to the owner when this frame is entered.
    pub dx: i32,
    pub dy: i32,
    /// Re-evaluate scene depth when this frame is entered.
    pub z_resort: bool,
    pub rgb: Rgba,
    pub frame_index: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub is_first: bool,
    pub is_last: bool,
    pub variants: Vec<FrameVariant>,
    pub children: Vec<AnimationChildFrameData>,
    /// Child slots whose async timeline (re)starts on this frame.
    pub child_start_events: Vec<usize>,
    pub hit_geometry: FrameHitGeometry,
    pub attack_geometry: FrameAttackGeometry,
}

impl Default for AnimationFrame {
    fn default() -> Self {
        Self {
            dx: 0,
            dy: 0,
            z_resort: true,
            rgb: Rgba::WHITE,
            frame_index: 0,
            prev: None,
            next: None,
            is_first: false,
            is_last: false,
            variants: Vec::new(),
            children: Vec::new(),
            child_start_events: Vec::new(),
            hit_geometry: FrameHitGeometry::default(),
            attack_geometry: FrameAttackGeometry::default(),
        }
    }
}

impl AnimationFrame {
    pub fn with_delta(dx: i32, dy: i32) -> Self {
        Self {
            dx,
            dy,
            ..Self::default()
        }
    }

    /// Base texture of variant `index`, if loaded.
    pub fn base_texture(&self, index: usize) -> Option<TextureId> {
        self.variants.get(index).and_then(|v| v.base)
    }
}

/// Ordered frames describing one way of moving through an animation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovementPath {
    pub frames: Vec<AnimationFrame>,
}

impl MovementPath {
    pub fn new(frames: Vec<AnimationFrame>) -> Self {
        let mut path = Self { frames };
        path.link();
        path
    }

    /// Rewrite indices, neighbour links and endpoint flags.
    pub fn link(&mut self) {
        let len = self.frames.len();
        for (i, frame) in self.frames.iter_mut().enumerate() {
            frame.frame_index = i;
            frame.prev = i.checked_sub(1);
            frame.next = if i + 1 < len { Some(i + 1) } else { None };
            frame.is_first = i == 0;
            frame.is_last = i + 1 == len;
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Grow or shrink to `len` frames, then relink.
    pub fn resize(&mut self, len: usize) {
        self.frames.resize_with(len, AnimationFrame::default);
        self.link();
    }

    pub fn reverse(&mut self) {
        self.frames.reverse();
        self.link();
    }
}
