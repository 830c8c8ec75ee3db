//! Depth component for scene ordering.
//!
//! Packages are submitted in ascending [`ZIndex`]. Frames flagged with
//! `z_resort` move the asset's depth to its current y so assets further
//! down the screen draw on top.

use bevy_ecs::prelude::Component;

/// Scene depth; higher values are drawn later (on top).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);
