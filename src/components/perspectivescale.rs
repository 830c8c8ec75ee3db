//! Perspective scale supplied by the grid point an asset stands on.
//!
//! Only assets whose definition opts into distance scaling honour it; the
//! composite builder and the variant selection read it through
//! [`PerspectiveScale::effective`].

use bevy_ecs::prelude::Component;

const MIN_PERSPECTIVE: f32 = 0.0001;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveScale(pub f32);

impl Default for PerspectiveScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl PerspectiveScale {
    /// Scale to use for an asset, 1.0 unless it applies distance scaling.
    pub fn effective(scale: Option<&PerspectiveScale>, apply_distance_scaling: bool) -> f32 {
        match scale {
            Some(p) if apply_distance_scaling && p.0.is_finite() => p.0.max(MIN_PERSPECTIVE),
            _ => 1.0,
        }
    }
}
