//! Composite render package of an asset.
//!
//! The variant selection writes the scale fields, the animation clock and
//! the child attachment runtime mark the package dirty, and the composite
//! builder regenerates `render_package` and `scene_mask_lights` only while
//! it is dirty.
//!
//! # Related
//!
//! - [`crate::systems::composite`] – builds the package
//! - [`crate::systems::render`] – submits it

use bevy_ecs::prelude::Component;

use crate::resources::texturestore::TextureId;
use crate::scaling::HysteresisState;
use crate::types::{IRect, IVec2, Rgba};

/// How a quad combines with what is already drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Alpha,
    Additive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlipFlags {
    pub horizontal: bool,
    pub vertical: bool,
}

impl FlipFlags {
    pub const NONE: FlipFlags = FlipFlags {
        horizontal: false,
        vertical: false,
    };

    pub fn horizontal(flipped: bool) -> Self {
        Self {
            horizontal: flipped,
            vertical: false,
        }
    }
}

/// One textured quad of a package.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderObject {
    pub texture: TextureId,
    /// Destination in world pixels.
    pub screen_rect: IRect,
    pub color_mod: Rgba,
    pub blend_mode: BlendMode,
    /// Rotation in degrees around `center`.
    pub angle: f32,
    /// Pivot relative to the rect's top-left; only meaningful with `custom_center`.
    pub center: IVec2,
    pub custom_center: bool,
    pub flip: FlipFlags,
}

impl RenderObject {
    pub fn new(texture: TextureId, screen_rect: IRect) -> Self {
        Self {
            texture,
            screen_rect,
            color_mod: Rgba::WHITE,
            blend_mode: BlendMode::Alpha,
            angle: 0.0,
            center: IVec2::ZERO,
            custom_center: false,
            flip: FlipFlags::NONE,
        }
    }
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Composite {
    pub variant_index: usize,
    pub nearest_variant_scale: f32,
    pub remaining_scale_adjustment: f32,
    /// Selection band from the previous tick.
    pub hysteresis: Option<HysteresisState>,
    /// Low-pass filtered variant request used for the band test.
    pub smoothed_scale: f32,
    /// Scale profile revision the hysteresis state belongs to.
    pub profile_revision: u64,
    /// Package scale of the last rebuild.
    pub cached_package_scale: f32,
    /// Anchor, facing and camera scale the package was last built for.
    pub cached_position: IVec2,
    pub cached_flipped: bool,
    pub cached_camera_scale: f32,
    /// Set when the package must be regenerated on the next build.
    pub dirty: bool,
    pub render_package: Vec<RenderObject>,
    pub scene_mask_lights: Vec<RenderObject>,
    /// Union of the package rects relative to the asset position.
    pub local_bounds: IRect,
}

impl Default for Composite {
    fn default() -> Self {
        Self {
            variant_index: 0,
            nearest_variant_scale: 1.0,
            remaining_scale_adjustment: 1.0,
            hysteresis: None,
            smoothed_scale: 0.0,
            profile_revision: 0,
            cached_package_scale: 1.0,
            cached_position: IVec2::ZERO,
            cached_flipped: false,
            cached_camera_scale: 1.0,
            dirty: true,
            render_package: Vec::new(),
            scene_mask_lights: Vec::new(),
            local_bounds: IRect::default(),
        }
    }
}

impl Composite {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
