//! Shared 2D camera resource.
//!
//! Wraps raylib's [`raylib::prelude::Camera2D`] so that systems can agree on
//! a single world/screen transform. The inverse zoom is the camera scale the
//! variant selection divides by: zooming in asks for larger variants.

use bevy_ecs::prelude::Resource;
use raylib::prelude::Camera2D;

/// ECS resource that holds the active 2D camera parameters.
#[derive(Resource)]
pub struct Camera2DRes(pub Camera2D);

impl Camera2DRes {
    /// World pixels per screen pixel; 1.0 for a degenerate zoom.
    pub fn scale(&self) -> f32 {
        let zoom = self.0.zoom;
        if zoom.is_finite() && zoom > 0.0 { 1.0 / zoom } else { 1.0 }
    }
}
