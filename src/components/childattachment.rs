//! Live state of the child animations attached to an asset.
//!
//! One [`ChildAttachment`] slot exists per child name of the parent's current
//! animation. Slot `i` is driven by the parent's child timeline `i`; the
//! per-tick logic lives in [`crate::systems::childattachment`].

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

use crate::types::IVec2;

/// Runtime state of one attached child.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildAttachment {
    /// Index into the parent animation's child list; `-1` when unbound.
    pub child_index: i32,
    /// Asset type of the child.
    pub asset_name: String,
    /// Resolved animation of the child asset.
    pub animation: Option<String>,
    /// Current frame of the child animation.
    pub current_frame: Option<usize>,
    /// Seconds accumulated toward the next child frame.
    pub frame_progress: f32,
    pub world_pos: IVec2,
    pub rotation_degrees: f32,
    pub render_in_front: bool,
    pub visible: bool,
    pub was_visible: bool,
    pub cached_w: i32,
    pub cached_h: i32,
    /// Parent frame applied on the previous tick.
    pub last_parent_frame_index: Option<usize>,
    pub timeline_active: bool,
    pub timeline_cursor: usize,
    pub timeline_progress: f32,
}

impl Default for ChildAttachment {
    fn default() -> Self {
        Self {
            child_index: -1,
            asset_name: String::new(),
            animation: None,
            current_frame: None,
            frame_progress: 0.0,
            world_pos: IVec2::ZERO,
            rotation_degrees: 0.0,
            render_in_front: true,
            visible: false,
            was_visible: false,
            cached_w: 0,
            cached_h: 0,
            last_parent_frame_index: None,
            timeline_active: false,
            timeline_cursor: 0,
            timeline_progress: 0.0,
        }
    }
}

impl ChildAttachment {
    pub fn new(child_index: i32, asset_name: impl Into<String>) -> Self {
        Self {
            child_index,
            asset_name: asset_name.into(),
            ..Self::default()
        }
    }

    /// Bound to a child slot with a resolved animation and frame.
    pub fn is_active(&self) -> bool {
        self.child_index >= 0 && self.animation.is_some() && self.current_frame.is_some()
    }

    /// Clear per-binding state after the slot is bound to something else.
    pub fn reset_binding(&mut self) {
        self.frame_progress = 0.0;
        self.cached_w = 0;
        self.cached_h = 0;
        self.visible = false;
        self.was_visible = false;
        self.last_parent_frame_index = None;
        self.reset_timeline();
    }

    pub fn reset_timeline(&mut self) {
        self.timeline_active = false;
        self.timeline_cursor = 0;
        self.timeline_progress = 0.0;
    }

    /// Detach from any child: the slot stays allocated but hidden.
    pub fn unbind(&mut self) {
        self.child_index = -1;
        self.visible = false;
        self.was_visible = false;
        self.last_parent_frame_index = None;
        self.reset_timeline();
    }
}

/// Child slots of one asset, in child-index order.
#[derive(Component, Clone, Debug, Default)]
pub struct ChildAttachments {
    pub slots: SmallVec<[ChildAttachment; 4]>,
    /// Parent animation the slots were bound for.
    pub parent_animation: String,
}

impl ChildAttachments {
    /// Drop every slot when the parent switched animation.
    ///
    /// Returns true if slots were dropped.
    pub fn rebind_parent(&mut self, animation: &str) -> bool {
        if self.parent_animation == animation {
            return false;
        }
        self.parent_animation = animation.to_string();
        let had_slots = !self.slots.is_empty();
        self.slots.clear();
        had_slots
    }

    pub fn visible(&self) -> impl Iterator<Item = &ChildAttachment> {
        self.slots.iter().filter(|s| s.visible && s.child_index >= 0)
    }
}
