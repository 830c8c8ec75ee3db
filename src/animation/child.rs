//! Child attachment data carried by animations.
//!
//! A parent animation names the child assets it can show
//! ([`Animation::child_assets`](super::Animation::child_assets)) and keeps
//! one [`AnimationChildData`] timeline per name. Static timelines hold one
//! sample per parent frame. Async timelines run on their own clock once
//! started.

use serde::{Deserialize, Serialize};

/// One sample of a child attachment at a parent frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationChildFrameData {
    /// Index into the parent's child-name list, `-1` when inactive.
    pub child_index: i32,
    pub dx: i32,
    pub dy: i32,
    /// Rotation in degrees.
    pub degree: f32,
    pub visible: bool,
    pub render_in_front: bool,
}

impl Default for AnimationChildFrameData {
    fn default() -> Self {
        Self {
            child_index: -1,
            dx: 0,
            dy: 0,
            degree: 0.0,
            visible: true,
            render_in_front: true,
        }
    }
}

impl AnimationChildFrameData {
    /// A hidden, centred sample for `child_index`.
    pub fn hidden(child_index: i32) -> Self {
        Self {
            child_index,
            visible: false,
            ..Self::default()
        }
    }
}

/// How a child timeline is clocked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildTimelineMode {
    /// One sample per parent frame.
    #[default]
    Static,
    /// Advances independently once started.
    Async,
}

impl ChildTimelineMode {
    /// Parse `"static"`, `"async"` or `"asynchronous"`, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" => Some(Self::Static),
            "async" | "asynchronous" => Some(Self::Async),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Async => "async",
        }
    }
}

/// Timeline for one child asset on one parent animation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationChildData {
    /// Display name of the timeline.
    pub name: String,
    /// Asset spawned into the slot.
    pub asset_name: String,
    /// Child animation to play instead of the child's default.
    pub animation_override: Option<String>,
    pub mode: ChildTimelineMode,
    pub auto_start: bool,
    pub frames: Vec<AnimationChildFrameData>,
}

impl AnimationChildData {
    pub fn new(asset_name: impl Into<String>, mode: ChildTimelineMode) -> Self {
        Self {
            asset_name: asset_name.into(),
            mode,
            auto_start: mode == ChildTimelineMode::Static,
            ..Self::default()
        }
    }

    pub fn is_static(&self) -> bool {
        self.mode == ChildTimelineMode::Static
    }

    pub fn is_async(&self) -> bool {
        self.mode == ChildTimelineMode::Async
    }
}
