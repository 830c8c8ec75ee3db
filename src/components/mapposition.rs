use bevy_ecs::prelude::Component;

use crate::types::IVec2;

/// World-space anchor of an asset: the bottom-centre of its base frame.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPosition {
    pub x: f32,
    pub y: f32,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position rounded to whole pixels.
    pub fn pixel(&self) -> IVec2 {
        IVec2::new(self.x.round() as i32, self.y.round() as i32)
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx as f32;
        self.y += dy as f32;
    }
}
