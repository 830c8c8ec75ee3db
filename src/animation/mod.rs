//! Animation data model.
//!
//! An [`Animation`] is one named clip of an asset ("walk", "idle", ...). It
//! owns:
//!
//! - one or more movement paths of [`AnimationFrame`]s, path 0 being the
//!   primary path that [`Animation::frames`] exposes;
//! - a frame cache: per frame, one [`FrameVariant`] per scale step, holding
//!   [`TextureId`] handles into the texture store;
//! - the child-name list and one [`AnimationChildData`] timeline per name;
//! - playback flags and the [`OnEndDirective`].
//!
//! Texture loading lives in [`crate::loader`]; this module only describes
//! and rearranges data.
//!
//! # Related
//!
//! - [`crate::scaling`] – variant choice used by [`Animation::get_frame`]
//! - [`crate::animdoc`] – the JSON document that fills movement, geometry and child data
//! - [`crate::systems::childattachment`] – runtime that plays child timelines

pub mod child;
pub mod combat;
pub mod frame;
pub mod onend;

use std::path::PathBuf;

use rustc_hash::FxHashMap;

pub use child::{AnimationChildData, AnimationChildFrameData, ChildTimelineMode};
pub use combat::{AttackVector, DamageType, FrameAttackGeometry, FrameHitGeometry, HitBox};
pub use frame::{AnimationFrame, FrameVariant, MovementPath};
pub use onend::{OnEndDirective, classify_on_end, is_reserved_animation_name};

use crate::resources::texturestore::TextureId;
use crate::scaling::ScalePolicy;

/// Engine-wide animation rate used when no configuration overrides it.
pub const DEFAULT_BASE_FPS: u32 = 24;

/// Sound played when an animation starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioClip {
    pub name: String,
    pub path: PathBuf,
    /// 0..=100
    pub volume: u8,
    /// Routed through the effects bus instead of played one-shot.
    pub effects: bool,
}

/// Where an animation's frames come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// Pre-rendered frames in the asset's cache folder.
    #[default]
    Folder,
    /// Derived from another animation of the same asset.
    Animation,
}

impl SourceKind {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("animation") {
            SourceKind::Animation
        } else {
            SourceKind::Folder
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Folder => "folder",
            SourceKind::Animation => "animation",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationSource {
    pub kind: SourceKind,
    pub path: String,
    /// Source animation name when `kind` is [`SourceKind::Animation`].
    pub name: String,
}

/// One named animation of an asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub name: String,
    pub source: AnimationSource,
    pub flipped_source: bool,
    pub flip_vertical_source: bool,
    pub flip_movement_horizontal: bool,
    pub flip_movement_vertical: bool,
    pub reverse_source: bool,
    pub inherit_source_movement: bool,
    pub locked: bool,
    pub looped: bool,
    pub randomize: bool,
    pub rnd_start: bool,
    pub frozen: bool,
    pub on_end: OnEndDirective,
    pub total_dx: i32,
    pub total_dy: i32,
    /// Any frame of the primary path moves the owner.
    pub movement: bool,
    pub audio: Option<AudioClip>,
    frame_cache: Vec<Vec<FrameVariant>>,
    movement_paths: Vec<MovementPath>,
    variant_steps: Vec<f32>,
    child_names: Vec<String>,
    child_timelines: Vec<AnimationChildData>,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: AnimationSource::default(),
            flipped_source: false,
            flip_vertical_source: false,
            flip_movement_horizontal: false,
            flip_movement_vertical: false,
            reverse_source: false,
            inherit_source_movement: false,
            locked: false,
            looped: true,
            randomize: false,
            rnd_start: false,
            frozen: false,
            on_end: OnEndDirective::Default,
            total_dx: 0,
            total_dy: 0,
            movement: false,
            audio: None,
            frame_cache: Vec::new(),
            movement_paths: Vec::new(),
            variant_steps: Vec::new(),
            child_names: Vec::new(),
            child_timelines: Vec::new(),
        }
    }

    // ----- frames -----

    /// Frames of the primary movement path.
    pub fn frames(&self) -> &[AnimationFrame] {
        self.movement_paths
            .first()
            .map(|p| p.frames.as_slice())
            .unwrap_or(&[])
    }

    pub fn frame_count(&self) -> usize {
        self.frames().len()
    }

    pub fn frame(&self, index: usize) -> Option<&AnimationFrame> {
        self.frames().get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut AnimationFrame> {
        self.movement_paths
            .first_mut()
            .and_then(|p| p.frames.get_mut(index))
    }

    /// Frame `index` of movement path `path_index` (clamped to path 0).
    pub fn path_frame(&self, path_index: usize, index: usize) -> Option<&AnimationFrame> {
        self.movement_path(path_index).get(index)
    }

    pub fn get_first_frame(&self, path_index: usize) -> Option<&AnimationFrame> {
        self.movement_path(path_index).first()
    }

    /// Position of `frame` within the primary path, if it belongs there.
    pub fn index_of(&self, frame: &AnimationFrame) -> Option<usize> {
        (frame.frame_index < self.frame_count()).then_some(frame.frame_index)
    }

    /// Variant of `frame` that best matches `requested_scale`.
    pub fn get_frame<'a>(
        &self,
        frame: &'a AnimationFrame,
        requested_scale: f32,
        policy: &ScalePolicy,
    ) -> Option<&'a FrameVariant> {
        if frame.variants.is_empty() {
            return None;
        }
        let selection = policy.choose_simple(requested_scale, &self.variant_steps);
        let index = selection.index.min(frame.variants.len() - 1);
        frame.variants.get(index)
    }

    pub fn variant_steps(&self) -> &[f32] {
        &self.variant_steps
    }

    pub fn set_variant_steps(&mut self, steps: Vec<f32>) {
        self.variant_steps = steps;
    }

    pub fn variant_count(&self) -> usize {
        self.variant_steps.len()
    }

    // ----- movement paths -----

    pub fn movement_path_count(&self) -> usize {
        self.movement_paths.len()
    }

    pub fn movement_paths(&self) -> &[MovementPath] {
        &self.movement_paths
    }

    /// Frames of path `index`; out of range falls back to path 0.
    pub fn movement_path(&self, index: usize) -> &[AnimationFrame] {
        let index = self.clamp_path_index(index);
        self.movement_paths
            .get(index)
            .map(|p| p.frames.as_slice())
            .unwrap_or(&[])
    }

    /// Mutable path `index`, creating path 0 when there is none.
    pub fn movement_path_mut(&mut self, index: usize) -> &mut MovementPath {
        if self.movement_paths.is_empty() {
            self.movement_paths.push(MovementPath::default());
        }
        let index = self.clamp_path_index(index);
        &mut self.movement_paths[index]
    }

    /// Replace every path, relink them, rebind cached textures and resize
    /// the static child timelines to the new frame count.
    pub fn set_movement_paths(&mut self, paths: Vec<MovementPath>) {
        self.movement_paths = paths;
        for path in &mut self.movement_paths {
            path.link();
        }
        self.refresh_texture_bindings();
        self.rebuild_child_timelines_from_frames();
    }

    pub fn clamp_path_index(&self, index: usize) -> usize {
        if index >= self.movement_paths.len() {
            0
        } else {
            index
        }
    }

    /// Copy `source`'s movement paths and apply this animation's
    /// reverse and movement-flip flags to them.
    pub fn inherit_movement_from(&mut self, source: &Animation) {
        self.movement_paths = source.movement_paths.clone();
        for path in &mut self.movement_paths {
            if self.reverse_source {
                path.reverse();
            }
            for frame in &mut path.frames {
                if self.flip_movement_horizontal {
                    frame.dx = -frame.dx;
                    for child in &mut frame.children {
                        child.dx = -child.dx;
                    }
                }
                if self.flip_movement_vertical {
                    frame.dy = -frame.dy;
                    for child in &mut frame.children {
                        child.dy = -child.dy;
                    }
                }
            }
            path.link();
        }
        self.refresh_texture_bindings();
        self.rebuild_child_timelines_from_frames();
    }

    /// Next frame of a path; `None` at the end.
    pub fn next_in_path(&self, path_index: usize, index: usize) -> Option<usize> {
        self.path_frame(path_index, index).and_then(|f| f.next)
    }

    pub fn prev_in_path(&self, path_index: usize, index: usize) -> Option<usize> {
        self.path_frame(path_index, index).and_then(|f| f.prev)
    }

    /// Sum the primary path's deltas into `total_dx`/`total_dy`.
    pub fn compute_totals(&mut self) {
        let (dx, dy) = self
            .frames()
            .iter()
            .fold((0, 0), |(x, y), f| (x + f.dx, y + f.dy));
        self.total_dx = dx;
        self.total_dy = dy;
        self.movement = self.frames().iter().any(|f| f.dx != 0 || f.dy != 0);
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen || self.frame_count() <= 1
    }

    // ----- frame cache -----

    pub fn frame_cache(&self) -> &[Vec<FrameVariant>] {
        &self.frame_cache
    }

    /// Replace the cache and rebind variants on every path. Returns the
    /// handles that were displaced; the caller releases them.
    #[must_use]
    pub fn set_frame_cache(&mut self, cache: Vec<Vec<FrameVariant>>) -> Vec<TextureId> {
        let displaced = self.take_texture_cache();
        self.frame_cache = cache;
        self.refresh_texture_bindings();
        displaced
    }

    pub(crate) fn frame_cache_mut(&mut self) -> &mut Vec<Vec<FrameVariant>> {
        &mut self.frame_cache
    }

    /// Empty the cache and return every handle it held.
    pub fn take_texture_cache(&mut self) -> Vec<TextureId> {
        let ids = self
            .frame_cache
            .drain(..)
            .flat_map(|variants| variants.into_iter().flat_map(FrameVariant::textures))
            .collect();
        for path in &mut self.movement_paths {
            for frame in &mut path.frames {
                frame.variants.clear();
            }
        }
        ids
    }

    /// Copy cached variants onto the frames of every path.
    pub fn refresh_texture_bindings(&mut self) {
        for path in &mut self.movement_paths {
            for frame in &mut path.frames {
                frame.variants = self
                    .frame_cache
                    .get(frame.frame_index)
                    .cloned()
                    .unwrap_or_default();
            }
        }
    }

    /// Install freshly loaded frames as a single primary path.
    ///
    /// Returns the displaced texture handles; the caller releases them.
    #[must_use]
    pub fn adopt_prebuilt_frames(
        &mut self,
        cache: Vec<Vec<FrameVariant>>,
        variant_steps: Vec<f32>,
    ) -> Vec<TextureId> {
        let displaced = self.take_texture_cache();
        let count = cache.len();
        self.frame_cache = cache;
        self.variant_steps = variant_steps;
        self.movement_paths = vec![MovementPath::new(vec![AnimationFrame::default(); count])];
        self.refresh_texture_bindings();
        self.rebuild_child_timelines_from_frames();
        displaced
    }

    // ----- children -----

    pub fn child_assets(&self) -> &[String] {
        &self.child_names
    }

    pub fn has_child_assets(&self) -> bool {
        !self.child_names.is_empty()
    }

    pub fn child_timelines(&self) -> &[AnimationChildData] {
        &self.child_timelines
    }

    pub fn child_index_of(&self, asset_name: &str) -> Option<usize> {
        self.child_names.iter().position(|n| n == asset_name)
    }

    pub fn find_child_timeline(&self, asset_name: &str) -> Option<&AnimationChildData> {
        if asset_name.is_empty() {
            return None;
        }
        self.child_timelines
            .iter()
            .find(|t| t.asset_name == asset_name)
    }

    pub fn find_child_timeline_mut(&mut self, asset_name: &str) -> Option<&mut AnimationChildData> {
        if asset_name.is_empty() {
            return None;
        }
        self.child_timelines
            .iter_mut()
            .find(|t| t.asset_name == asset_name)
    }

    /// Set the child-name list (deduplicated, empties dropped) and rebuild
    /// the timelines so there is one per name.
    pub fn set_child_names<S: AsRef<str>>(&mut self, names: &[S]) {
        let mut deduped: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !name.is_empty() && !deduped.iter().any(|n| n == name) {
                deduped.push(name.to_string());
            }
        }
        self.child_names = deduped;
        self.rebuild_child_timelines_from_frames();
    }

    /// Install names and timelines decoded from a document as they are.
    pub fn set_child_data(&mut self, names: Vec<String>, timelines: Vec<AnimationChildData>) {
        self.child_names = names;
        self.child_timelines = timelines;
        self.rebuild_child_start_events();
    }

    /// Rebuild one timeline per child name from the frames' own samples,
    /// keeping what can be kept from the previous timelines.
    pub fn rebuild_child_timelines_from_frames(&mut self) {
        if self.child_names.is_empty() {
            self.child_timelines.clear();
            self.rebuild_child_start_events();
            return;
        }

        let previous: FxHashMap<String, AnimationChildData> = self
            .child_timelines
            .drain(..)
            .filter(|t| !t.asset_name.is_empty())
            .map(|t| (t.asset_name.clone(), t))
            .collect();
        let frame_count = self.frame_count();

        let mut rebuilt = Vec::with_capacity(self.child_names.len());
        for (child_idx, asset_name) in self.child_names.iter().enumerate() {
            let slot = child_idx as i32;
            let prev = previous.get(asset_name);

            let mut timeline = AnimationChildData {
                name: prev.map(|p| p.name.clone()).unwrap_or_default(),
                asset_name: asset_name.clone(),
                animation_override: prev.and_then(|p| p.animation_override.clone()),
                mode: prev.map(|p| p.mode).unwrap_or_default(),
                auto_start: false,
                frames: Vec::new(),
            };
            timeline.auto_start = prev.map_or(timeline.is_static(), |p| p.auto_start);

            if timeline.is_static() {
                let prev_static = prev.filter(|p| p.is_static());
                let count = if frame_count > 0 {
                    frame_count
                } else {
                    prev_static
                        .map(|p| p.frames.len())
                        .filter(|&n| n > 0)
                        .unwrap_or(1)
                };
                timeline.frames = vec![AnimationChildFrameData::hidden(slot); count];
                for (frame_idx, sample) in timeline.frames.iter_mut().enumerate() {
                    let from_frame = self
                        .frames()
                        .get(frame_idx)
                        .and_then(|f| f.children.iter().find(|c| c.child_index == slot));
                    let from_prev = prev_static.and_then(|p| p.frames.get(frame_idx));
                    if let Some(found) = from_frame.or(from_prev) {
                        *sample = *found;
                        sample.child_index = slot;
                    }
                }
            } else {
                if let Some(p) = prev.filter(|p| p.is_async() && !p.frames.is_empty()) {
                    timeline.frames = p.frames.clone();
                    for sample in &mut timeline.frames {
                        sample.child_index = slot;
                    }
                }
                if timeline.frames.is_empty() {
                    timeline.frames.push(AnimationChildFrameData::hidden(slot));
                }
            }
            rebuilt.push(timeline);
        }

        self.child_timelines = rebuilt;
        self.rebuild_child_start_events();
    }

    /// Mark, for every static timeline, the frame where the child first
    /// becomes visible.
    pub fn rebuild_child_start_events(&mut self) {
        for path in &mut self.movement_paths {
            for frame in &mut path.frames {
                frame.child_start_events.clear();
            }
        }
        if self.child_timelines.is_empty() || self.frame_count() == 0 {
            return;
        }

        let mut starts: Vec<(usize, usize)> = Vec::new();
        for (child_idx, timeline) in self.child_timelines.iter().enumerate() {
            if !timeline.is_static() {
                continue;
            }
            if let Some(frame_idx) = timeline.frames.iter().position(|s| s.visible) {
                starts.push((frame_idx, child_idx));
            }
        }

        for path in &mut self.movement_paths {
            for &(frame_idx, child_idx) in &starts {
                if let Some(frame) = path.frames.get_mut(frame_idx) {
                    if !frame.child_start_events.contains(&child_idx) {
                        frame.child_start_events.push(child_idx);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anim_with_frames(n: usize) -> Animation {
        let mut anim = Animation::new("walk");
        anim.set_movement_paths(vec![MovementPath::new(vec![AnimationFrame::default(); n])]);
        anim
    }

    #[test]
    fn test_is_frozen_for_single_frame() {
        let anim = anim_with_frames(1);
        assert!(anim.is_frozen());
        let mut anim = anim_with_frames(3);
        assert!(!anim.is_frozen());
        anim.freeze();
        assert!(anim.is_frozen());
    }

    #[test]
    fn test_movement_path_out_of_range_falls_back() {
        let anim = anim_with_frames(2);
        assert_eq!(anim.movement_path(7).len(), 2);
        assert_eq!(anim.clamp_path_index(7), 0);
        assert!(Animation::new("x").movement_path(0).is_empty());
    }

    #[test]
    fn test_movement_path_mut_creates_primary() {
        let mut anim = Animation::new("x");
        anim.movement_path_mut(3).resize(2);
        assert_eq!(anim.movement_path_count(), 1);
        assert_eq!(anim.frame_count(), 2);
    }

    #[test]
    fn test_inherit_movement_reverses_and_flips() {
        let mut source = Animation::new("walk");
        let mut f0 = AnimationFrame::with_delta(1, 2);
        f0.children.push(AnimationChildFrameData {
            child_index: 0,
            dx: 5,
            dy: 6,
            ..Default::default()
        });
        source.set_movement_paths(vec![MovementPath::new(vec![
            f0,
            AnimationFrame::with_delta(3, 4),
        ])]);

        let mut derived = Animation::new("walk_left");
        derived.reverse_source = true;
        derived.flip_movement_horizontal = true;
        derived.inherit_movement_from(&source);

        let frames = derived.frames();
        assert_eq!((frames[0].dx, frames[0].dy), (-3, 4));
        assert_eq!((frames[1].dx, frames[1].dy), (-1, 2));
        assert_eq!(frames[1].children[0].dx, -5);
        assert_eq!(frames[1].children[0].dy, 6);
        assert_eq!(frames[0].frame_index, 0);
        assert!(frames[1].is_last);
    }

    #[test]
    fn test_inherit_movement_vertical_flip() {
        let mut source = anim_with_frames(0);
        source.set_movement_paths(vec![MovementPath::new(vec![AnimationFrame::with_delta(1, 2)])]);
        let mut derived = Animation::new("up");
        derived.flip_movement_vertical = true;
        derived.inherit_movement_from(&source);
        assert_eq!((derived.frames()[0].dx, derived.frames()[0].dy), (1, -2));
    }

    #[test]
    fn test_set_child_names_syncs_timelines() {
        let mut anim = anim_with_frames(2);
        anim.set_child_names(&["sword", "shield", "sword", ""]);
        assert_eq!(anim.child_assets(), &["sword".to_string(), "shield".to_string()]);
        assert_eq!(anim.child_timelines().len(), 2);
        for (i, t) in anim.child_timelines().iter().enumerate() {
            assert_eq!(t.frames.len(), 2);
            assert_eq!(t.frames[0].child_index, i as i32);
            assert!(!t.frames[0].visible);
            assert!(t.auto_start);
        }
    }

    #[test]
    fn test_inherited_movement_resizes_static_timelines() {
        let mut source = anim_with_frames(3);
        source.movement_path_mut(0).frames[1].children.push(AnimationChildFrameData {
            child_index: 0,
            visible: true,
            dx: 4,
            ..Default::default()
        });
        let mut derived = Animation::new("walk_left");
        derived.set_child_names(&["torch"]);
        assert_eq!(derived.child_timelines()[0].frames.len(), 1);

        derived.flip_movement_horizontal = true;
        derived.inherit_movement_from(&source);
        let timeline = &derived.child_timelines()[0];
        assert_eq!(timeline.frames.len(), derived.frame_count());
        assert!(timeline.frames[1].visible);
        assert_eq!(timeline.frames[1].dx, -4);
        assert_eq!(derived.frames()[1].child_start_events, vec![0]);
    }

    #[test]
    fn test_replaced_paths_resize_static_timelines() {
        let mut anim = anim_with_frames(2);
        anim.set_child_names(&["torch"]);
        assert_eq!(anim.child_timelines()[0].frames.len(), 2);
        anim.set_movement_paths(vec![MovementPath::new(vec![AnimationFrame::default(); 5])]);
        assert_eq!(anim.child_timelines()[0].frames.len(), 5);
    }

    #[test]
    fn test_rebuild_preserves_async_timeline() {
        let mut anim = anim_with_frames(3);
        anim.set_child_names(&["spark"]);
        {
            let t = anim.find_child_timeline_mut("spark").unwrap();
            t.mode = ChildTimelineMode::Async;
            t.frames = vec![
                AnimationChildFrameData {
                    child_index: 0,
                    dx: 4,
                    ..Default::default()
                };
                5
            ];
        }
        anim.rebuild_child_timelines_from_frames();
        let t = anim.find_child_timeline("spark").unwrap();
        assert!(t.is_async());
        assert_eq!(t.frames.len(), 5);
        assert_eq!(t.frames[0].dx, 4);
    }

    #[test]
    fn test_static_timeline_sampled_from_frame_children() {
        let mut anim = anim_with_frames(4);
        anim.frame_mut(1).unwrap().children.push(AnimationChildFrameData {
            child_index: 0,
            dx: 7,
            dy: -2,
            degree: 10.0,
            visible: true,
            render_in_front: false,
        });
        anim.set_child_names(&["torch"]);
        let t = &anim.child_timelines()[0];
        assert_eq!(t.frames.len(), 4);
        assert!(!t.frames[0].visible);
        assert!(t.frames[1].visible);
        assert_eq!(t.frames[1].dx, 7);
        assert!(!t.frames[1].render_in_front);
        assert_eq!(anim.frames()[1].child_start_events, vec![0]);
        assert!(anim.frames()[0].child_start_events.is_empty());
    }

    #[test]
    fn test_find_child_timeline_empty_name() {
        let mut anim = anim_with_frames(1);
        anim.set_child_names(&["a"]);
        assert!(anim.find_child_timeline("").is_none());
        assert!(anim.find_child_timeline("a").is_some());
    }

    #[test]
    fn test_adopt_prebuilt_frames_binds_variants() {
        let mut anim = Animation::new("idle");
        let cache = vec![
            vec![FrameVariant {
                variant: 0,
                base: Some(TextureId(1)),
                ..Default::default()
            }],
            vec![FrameVariant {
                variant: 0,
                base: Some(TextureId(2)),
                ..Default::default()
            }],
        ];
        let displaced = anim.adopt_prebuilt_frames(cache, vec![1.0]);
        assert!(displaced.is_empty());
        assert_eq!(anim.frame_count(), 2);
        assert_eq!(anim.frames()[1].base_texture(0), Some(TextureId(2)));

        let displaced = anim.take_texture_cache();
        assert_eq!(displaced, vec![TextureId(1), TextureId(2)]);
        assert!(anim.frames()[0].variants.is_empty());
    }

    #[test]
    fn test_get_frame_clamps_to_available_variants() {
        let mut anim = Animation::new("idle");
        let cache = vec![vec![FrameVariant::new(0), FrameVariant::new(1)]];
        let _ = anim.adopt_prebuilt_frames(cache, vec![1.0, 0.75, 0.5, 0.25, 0.1]);
        let frame = anim.frames()[0].clone();
        let v = anim
            .get_frame(&frame, 0.2, &ScalePolicy::default())
            .unwrap();
        assert_eq!(v.variant, 1);
        let v = anim
            .get_frame(&frame, 1.0, &ScalePolicy::default())
            .unwrap();
        assert_eq!(v.variant, 0);
    }

    #[test]
    fn test_compute_totals() {
        let mut anim = Animation::new("walk");
        anim.set_movement_paths(vec![MovementPath::new(vec![
            AnimationFrame::with_delta(2, 0),
            AnimationFrame::with_delta(3, -1),
        ])]);
        anim.compute_totals();
        assert_eq!((anim.total_dx, anim.total_dy), (5, -1));
        assert!(anim.movement);
    }

    #[test]
    fn test_index_of() {
        let anim = anim_with_frames(3);
        let f = anim.frames()[2].clone();
        assert_eq!(anim.index_of(&f), Some(2));
        let mut stray = AnimationFrame::default();
        stray.frame_index = 9;
        assert_eq!(anim.index_of(&stray), None);
    }
}
