//! Child attachment runtime.
//!
//! Each tick, for every asset with attached children:
//!
//! 1. [`ensure_child_slots`] binds one slot per child name of the parent's
//!    current animation.
//! 2. [`advance_frames`] steps every visible child animation on the
//!    `1/base_fps` clock, and [`advance_timelines`] steps async timelines.
//! 3. [`collect_timeline_samples`] gathers this parent frame's samples and
//!    [`apply_frame_data`] turns them into visibility, world position,
//!    rotation and depth side. A slot restarts when the parent animation
//!    loops or when it becomes visible again.
//!
//! The slot functions are pure over `&mut [ChildAttachment]` so they can be
//! driven without a world; [`update_child_attachments`] is the system.
//!
//! # Related
//!
//! - [`crate::components::childattachment`] – slot state
//! - [`crate::systems::composite`] – draws the visible slots

use bevy_ecs::prelude::*;

use crate::animation::{Animation, AnimationChildFrameData, DEFAULT_BASE_FPS};
use crate::components::animation::{AnimationPlayer, start_frame};
use crate::components::assetinstance::AssetInstance;
use crate::components::childattachment::{ChildAttachment, ChildAttachments};
use crate::components::composite::Composite;
use crate::components::mapposition::MapPosition;
use crate::components::perspectivescale::PerspectiveScale;
use crate::resources::animationrng::AnimationRng;
use crate::resources::animationstore::AnimationStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::texturestore::TextureStore;
use crate::resources::worldtime::WorldTime;
use crate::types::IVec2;

const MIN_SCALE: f32 = 0.0001;
const ROTATION_EPSILON: f32 = 0.001;

/// What the children need to know about their parent this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ParentState {
    /// Parent position in world pixels.
    pub position: IVec2,
    /// Anchor the child offsets are measured from.
    pub base_position: IVec2,
    pub scale: f32,
    pub flipped: bool,
    /// Name of the parent's current animation.
    pub animation_id: String,
    /// Parent frame being shown; `None` when the parent has no frame.
    pub frame_index: Option<usize>,
}

impl ParentState {
    fn sanitized_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }
}

/// Read-only lookups shared by the slot functions.
#[derive(Clone, Copy)]
pub struct ChildContext<'a> {
    pub assets: &'a AnimationStore,
    pub textures: &'a TextureStore,
    pub base_fps: u32,
    /// Children of a parent playing this animation always loop.
    pub default_animation: &'a str,
}

impl<'a> ChildContext<'a> {
    pub fn new(assets: &'a AnimationStore, textures: &'a TextureStore) -> Self {
        Self {
            assets,
            textures,
            base_fps: DEFAULT_BASE_FPS,
            default_animation: "default",
        }
    }

    pub fn from_config(
        assets: &'a AnimationStore,
        textures: &'a TextureStore,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            assets,
            textures,
            base_fps: config.base_fps.max(1),
            default_animation: &config.default_animation,
        }
    }

    fn interval(&self) -> f32 {
        1.0 / self.base_fps.max(1) as f32
    }

    /// `dt`, or one animation frame when `dt` is not positive.
    fn step(&self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            self.interval()
        }
    }

    fn animation_of(&self, slot: &ChildAttachment) -> Option<&'a Animation> {
        let name = slot.animation.as_deref()?;
        self.assets.animation(&slot.asset_name, name)
    }
}

/// Rotation of a child drawn on a (possibly) mirrored parent.
pub fn mirrored_child_rotation(parent_flipped: bool, degrees: f32) -> f32 {
    if parent_flipped { -degrees } else { degrees }
}

/// First frame of a child animation, randomised when the animation asks.
pub fn pick_start_frame(anim: &Animation, rng: &mut AnimationRng) -> Option<usize> {
    if anim.frame_count() == 0 {
        return None;
    }
    Some(start_frame(anim, rng))
}

/// Refresh the cached size from the current frame's first base texture.
pub fn update_dimensions(slot: &mut ChildAttachment, ctx: &ChildContext) {
    slot.cached_w = 0;
    slot.cached_h = 0;
    let Some(anim) = ctx.animation_of(slot) else {
        return;
    };
    let size = slot
        .current_frame
        .and_then(|i| anim.frame(i))
        .and_then(|f| f.base_texture(0))
        .and_then(|id| ctx.textures.size(id));
    if let Some((w, h)) = size {
        slot.cached_w = w;
        slot.cached_h = h;
    }
}

/// Rewind a slot to its start frame.
pub fn restart(slot: &mut ChildAttachment, ctx: &ChildContext, rng: &mut AnimationRng) {
    slot.frame_progress = 0.0;
    slot.cached_w = 0;
    slot.cached_h = 0;
    slot.current_frame = ctx
        .animation_of(slot)
        .and_then(|anim| pick_start_frame(anim, rng));
    update_dimensions(slot, ctx);
}

/// Step every visible, bound slot on the animation clock.
///
/// A child at its last frame wraps when its animation loops or when the
/// parent plays the default animation; otherwise it stays on the last frame.
/// Returns true if any slot changed frame.
pub fn advance_frames(
    slots: &mut [ChildAttachment],
    parent: &ParentState,
    dt: f32,
    ctx: &ChildContext,
    rng: &mut AnimationRng,
) -> bool {
    let interval = ctx.interval();
    let dt = ctx.step(dt);
    let parent_on_default = parent.animation_id == ctx.default_animation;
    let mut any_changed = false;

    for slot in slots.iter_mut() {
        if !slot.visible || slot.child_index < 0 {
            continue;
        }
        let Some(mut frame) = slot.current_frame else {
            continue;
        };
        let Some(anim) = ctx.animation_of(slot) else {
            continue;
        };
        let previous = frame;
        slot.frame_progress += dt;
        while slot.frame_progress >= interval {
            slot.frame_progress -= interval;
            if let Some(next) = anim.frame(frame).and_then(|f| f.next) {
                frame = next;
            } else if anim.looped || parent_on_default {
                frame = pick_start_frame(anim, rng).unwrap_or(0);
            } else {
                break;
            }
        }
        slot.current_frame = Some(frame);
        if frame != previous {
            update_dimensions(slot, ctx);
            any_changed = true;
        }
    }
    any_changed
}

/// Apply one parent frame's child samples to the slots.
///
/// Every slot starts hidden, unrotated and in front; each in-range sample
/// then shows (or keeps hidden) its slot. `entries` of `None` leaves every
/// slot hidden.
pub fn apply_frame_data(
    slots: &mut [ChildAttachment],
    parent: &ParentState,
    entries: Option<&[AnimationChildFrameData]>,
    ctx: &ChildContext,
    rng: &mut AnimationRng,
) {
    if slots.is_empty() {
        return;
    }
    let scale = parent.sanitized_scale();

    for slot in slots.iter_mut() {
        let inactive = slot.child_index < 0;
        let parent_looped = matches!(
            (parent.frame_index, slot.last_parent_frame_index),
            (Some(now), Some(last)) if now < last
        );
        if parent_looped && !inactive {
            restart(slot, ctx, rng);
        }
        slot.last_parent_frame_index = parent.frame_index;
        slot.visible = false;
        slot.rotation_degrees = 0.0;
        slot.render_in_front = true;
    }

    if let Some(entries) = entries {
        for entry in entries {
            let Some(slot) = usize::try_from(entry.child_index)
                .ok()
                .and_then(|i| slots.get_mut(i))
            else {
                log::debug!(
                    "Skipping child sample with out-of-range index {}",
                    entry.child_index
                );
                continue;
            };
            if slot.animation.is_none() {
                continue;
            }
            if !entry.visible {
                slot.visible = false;
                slot.render_in_front = entry.render_in_front;
                continue;
            }
            if !slot.was_visible {
                restart(slot, ctx, rng);
            }
            slot.visible = true;

            let mut dx = (entry.dx as f32 * scale).round() as i32;
            let dy = (entry.dy as f32 * scale).round() as i32;
            if parent.flipped {
                dx = -dx;
            }
            slot.world_pos = parent.base_position + IVec2::new(dx, dy);
            slot.rotation_degrees = mirrored_child_rotation(parent.flipped, entry.degree);
            slot.render_in_front = entry.render_in_front;
        }
    }

    for slot in slots.iter_mut() {
        slot.was_visible = slot.visible;
    }
}

/// Bind one slot per child of `anim`, in child-index order.
///
/// Slots are matched by asset name so a reordered child list keeps running
/// children running. A slot whose index, asset or animation changed is
/// reset.
pub fn ensure_child_slots(
    attachments: &mut ChildAttachments,
    anim: &Animation,
    ctx: &ChildContext,
    rng: &mut AnimationRng,
) {
    let timelines = anim.child_timelines();
    let requested: Vec<&str> = if timelines.is_empty() {
        anim.child_assets().iter().map(String::as_str).collect()
    } else {
        timelines.iter().map(|t| t.asset_name.as_str()).collect()
    };

    let mut previous = std::mem::take(&mut attachments.slots);
    for (i, name) in requested.iter().enumerate() {
        let mut slot = match previous.iter().position(|s| s.asset_name == *name) {
            Some(pos) => previous.remove(pos),
            None => ChildAttachment::new(-1, *name),
        };
        let override_name = timelines
            .get(i)
            .and_then(|t| t.animation_override.as_deref());
        let desired = resolve_child_animation(ctx, name, override_name);

        let binding_changed = slot.child_index != i as i32 || slot.animation != desired;
        if binding_changed {
            slot.child_index = i as i32;
            slot.asset_name = name.to_string();
            slot.reset_binding();
            slot.animation = desired;
            slot.current_frame = None;
            if slot.animation.is_none() {
                log::debug!("Child '{}' of '{}' has no playable animation", name, anim.name);
            }
        }
        if slot.animation.is_some() && slot.current_frame.is_none() {
            restart(&mut slot, ctx, rng);
        }
        attachments.slots.push(slot);
    }
}

fn resolve_child_animation(
    ctx: &ChildContext,
    asset: &str,
    override_name: Option<&str>,
) -> Option<String> {
    let info = ctx.assets.get(asset)?;
    let requested = override_name.unwrap_or(info.default_animation.as_str());
    info.resolve_animation_name(requested).map(str::to_string)
}

/// Step active async timelines. A timeline that runs out deactivates and
/// rests on its last sample.
pub fn advance_timelines(slots: &mut [ChildAttachment], anim: &Animation, dt: f32, ctx: &ChildContext) {
    let interval = ctx.interval();
    let dt = ctx.step(dt);
    let timelines = anim.child_timelines();
    for slot in slots.iter_mut() {
        if !slot.timeline_active {
            continue;
        }
        let Some(timeline) = usize::try_from(slot.child_index)
            .ok()
            .and_then(|i| timelines.get(i))
        else {
            continue;
        };
        if !timeline.is_async() {
            continue;
        }
        if timeline.frames.is_empty() {
            slot.reset_timeline();
            slot.was_visible = false;
            continue;
        }
        slot.timeline_progress += dt;
        while slot.timeline_progress >= interval {
            slot.timeline_progress -= interval;
            if slot.timeline_cursor + 1 < timeline.frames.len() {
                slot.timeline_cursor += 1;
            } else {
                slot.timeline_active = false;
                break;
            }
        }
        if !slot.timeline_active {
            slot.timeline_cursor = timeline.frames.len() - 1;
            slot.timeline_progress = 0.0;
            slot.was_visible = false;
        }
    }
}

fn restart_timeline(slot: &mut ChildAttachment) {
    slot.timeline_active = true;
    slot.timeline_cursor = 0;
    slot.timeline_progress = 0.0;
}

/// Start (or rewind) the async timeline of child `asset_name`.
///
/// Returns false when the child is unknown or its timeline is static.
pub fn run_child_timeline(slots: &mut [ChildAttachment], anim: &Animation, asset_name: &str) -> bool {
    let Some(index) = anim.child_index_of(asset_name) else {
        return false;
    };
    if !anim.child_timelines().get(index).is_some_and(|t| t.is_async()) {
        return false;
    }
    match slots.iter_mut().find(|s| s.child_index == index as i32) {
        Some(slot) => {
            restart_timeline(slot);
            true
        }
        None => false,
    }
}

/// Samples the timelines contribute for the parent's current frame.
///
/// Static timelines sample the parent frame directly; async timelines
/// sample their own cursor while active. A parent loop rewinds every cursor
/// and stops static timelines; the frame's start events (re)start async
/// ones.
pub fn collect_timeline_samples(
    slots: &mut [ChildAttachment],
    anim: &Animation,
    parent: &ParentState,
) -> Vec<AnimationChildFrameData> {
    let timelines = anim.child_timelines();
    let parent_frame = parent.frame_index;

    let mut looped = vec![false; slots.len()];
    for (i, slot) in slots.iter_mut().enumerate() {
        let parent_looped = matches!(
            (parent_frame, slot.last_parent_frame_index),
            (Some(now), Some(last)) if now < last
        );
        if parent_looped {
            let is_async = usize::try_from(slot.child_index)
                .ok()
                .and_then(|c| timelines.get(c))
                .is_some_and(|t| t.is_async());
            if !is_async {
                slot.timeline_active = false;
            }
            slot.timeline_cursor = 0;
            slot.timeline_progress = 0.0;
            slot.was_visible = false;
        }
        looped[i] = parent_looped;
    }

    if let Some(frame) = parent_frame.and_then(|i| anim.frame(i)) {
        for &child in &frame.child_start_events {
            let Some(slot) = slots.get_mut(child) else {
                continue;
            };
            if timelines.get(child).is_some_and(|t| t.is_async()) {
                restart_timeline(slot);
            }
        }
    }

    let mut samples = Vec::with_capacity(slots.len());
    for (i, slot) in slots.iter_mut().enumerate() {
        let Some(timeline) = usize::try_from(slot.child_index)
            .ok()
            .and_then(|c| timelines.get(c))
        else {
            continue;
        };
        let Some(last) = timeline.frames.len().checked_sub(1) else {
            continue;
        };
        let sample_index = if timeline.is_static() {
            let Some(frame_index) = parent_frame else {
                slot.timeline_active = false;
                continue;
            };
            if frame_index == 0 && (!slot.timeline_active || looped[i]) {
                restart_timeline(slot);
            } else if !slot.timeline_active {
                slot.timeline_active = true;
            }
            frame_index.min(last)
        } else {
            if !slot.timeline_active {
                continue;
            }
            slot.timeline_cursor.min(last)
        };
        let mut sample = timeline.frames[sample_index];
        sample.child_index = slot.child_index;
        samples.push(sample);
    }
    samples
}

#[derive(Clone, PartialEq)]
struct SlotSnapshot {
    visible: bool,
    render_in_front: bool,
    rotation: f32,
    world_pos: IVec2,
    frame: Option<usize>,
}

fn snapshot(slots: &[ChildAttachment]) -> Vec<SlotSnapshot> {
    slots
        .iter()
        .map(|s| SlotSnapshot {
            visible: s.visible,
            render_in_front: s.render_in_front,
            rotation: s.rotation_degrees,
            world_pos: s.world_pos,
            frame: s.current_frame,
        })
        .collect()
}

fn differs(before: &[SlotSnapshot], slots: &[ChildAttachment]) -> bool {
    before.len() != slots.len()
        || before.iter().zip(slots).any(|(b, s)| {
            b.visible != s.visible
                || b.render_in_front != s.render_in_front
                || (b.rotation - s.rotation_degrees).abs() > ROTATION_EPSILON
                || b.world_pos != s.world_pos
                || b.frame != s.current_frame
        })
}

/// Run one tick of the child runtime for one parent.
///
/// Returns true when the parent's composite must be rebuilt.
pub fn tick_children(
    attachments: &mut ChildAttachments,
    anim: &Animation,
    parent: &ParentState,
    dt: f32,
    ctx: &ChildContext,
    rng: &mut AnimationRng,
) -> bool {
    let mut dropped = attachments.rebind_parent(&anim.name);
    if !anim.has_child_assets() {
        if !attachments.slots.is_empty() {
            attachments.slots.clear();
            dropped = true;
        }
        return dropped;
    }
    ensure_child_slots(attachments, anim, ctx, rng);
    let before = snapshot(&attachments.slots);

    advance_frames(&mut attachments.slots, parent, dt, ctx, rng);
    advance_timelines(&mut attachments.slots, anim, dt, ctx);
    let samples = collect_timeline_samples(&mut attachments.slots, anim, parent);
    apply_frame_data(&mut attachments.slots, parent, Some(&samples), ctx, rng);

    dropped || differs(&before, &attachments.slots)
}

/// Attachment scale relative to the variant the parent is drawn with.
pub fn attachment_scale(composite: &Composite, perspective: f32) -> f32 {
    let remainder = composite.remaining_scale_adjustment;
    let remainder = if remainder.is_finite() && remainder > 0.0 {
        remainder
    } else {
        1.0
    };
    let scale = remainder / perspective.max(MIN_SCALE);
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// Advance the children of every animated asset.
pub fn update_child_attachments(
    mut query: Query<(
        &AssetInstance,
        &AnimationPlayer,
        &MapPosition,
        &mut ChildAttachments,
        &mut Composite,
        Option<&PerspectiveScale>,
    )>,
    assets: Res<AnimationStore>,
    textures: Res<TextureStore>,
    config: Option<Res<GameConfig>>,
    time: Res<WorldTime>,
    mut rng: ResMut<AnimationRng>,
) {
    let default_config = GameConfig::new();
    let config = config.as_deref().unwrap_or(&default_config);
    let ctx = ChildContext::from_config(&assets, &textures, config);

    for (instance, player, position, mut attachments, mut composite, perspective) in
        query.iter_mut()
    {
        let Some(info) = assets.get(&instance.asset) else {
            continue;
        };
        let Some(anim) = info.animation(&player.animation) else {
            continue;
        };
        let perspective = PerspectiveScale::effective(perspective, info.apply_distance_scaling);
        let pixel = position.pixel();
        let parent = ParentState {
            position: pixel,
            base_position: pixel,
            scale: attachment_scale(&composite, perspective),
            flipped: instance.flipped,
            animation_id: player.animation.clone(),
            frame_index: anim.path_frame(player.path_index, player.frame).map(|_| player.frame),
        };
        if tick_children(&mut attachments, anim, &parent, time.delta, &ctx, &mut rng) {
            composite.mark_dirty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationChildData, AnimationFrame, ChildTimelineMode, MovementPath};
    use crate::loader::AssetInfo;

    const DT: f32 = 1.0 / 24.0;

    fn frames(n: usize, store: &mut TextureStore) -> Vec<AnimationFrame> {
        (0..n)
            .map(|i| {
                let mut f = AnimationFrame::default();
                f.variants = vec![crate::animation::FrameVariant {
                    base: Some(store.insert_headless(10 + i as i32, 20)),
                    ..crate::animation::FrameVariant::new(0)
                }];
                f
            })
            .collect()
    }

    fn child_store(textures: &mut TextureStore, looped: bool) -> AnimationStore {
        let mut anim = Animation::new("default");
        anim.looped = looped;
        anim.set_movement_paths(vec![MovementPath::new(frames(2, textures))]);
        let mut info = AssetInfo::new("spark");
        info.animations.insert("default".into(), anim);
        let mut store = AnimationStore::default();
        store.insert(info);
        store
    }

    fn parent(frame_index: usize) -> ParentState {
        ParentState {
            position: IVec2::new(100, 200),
            base_position: IVec2::new(100, 200),
            scale: 1.0,
            flipped: false,
            animation_id: "swing".into(),
            frame_index: Some(frame_index),
        }
    }

    fn bound_slot() -> ChildAttachment {
        let mut slot = ChildAttachment::new(0, "spark");
        slot.animation = Some("default".into());
        slot.current_frame = Some(0);
        slot
    }

    fn sample(visible: bool) -> AnimationChildFrameData {
        AnimationChildFrameData {
            child_index: 0,
            dx: 10,
            dy: 5,
            degree: 30.0,
            visible,
            render_in_front: true,
        }
    }

    #[test]
    fn test_mirrored_child_rotation() {
        for theta in [-270.0, -30.0, 0.0, 15.5, 90.0] {
            assert_eq!(mirrored_child_rotation(true, theta), -theta);
            assert_eq!(mirrored_child_rotation(false, theta), theta);
        }
    }

    #[test]
    fn test_hidden_child_resumes_from_first_frame() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, false);
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut slots = vec![bound_slot()];

        apply_frame_data(&mut slots, &parent(0), Some(&[sample(true)]), &ctx, &mut rng);
        assert_eq!(slots[0].current_frame, Some(0));
        assert!(slots[0].visible);

        for i in 0..3 {
            advance_frames(&mut slots, &parent(i), DT, &ctx, &mut rng);
            apply_frame_data(&mut slots, &parent(i), Some(&[sample(false)]), &ctx, &mut rng);
        }
        assert_eq!(slots[0].current_frame, Some(1));
        assert!(!slots[0].visible);

        apply_frame_data(&mut slots, &parent(2), Some(&[sample(true)]), &ctx, &mut rng);
        assert_eq!(slots[0].current_frame, Some(0));
        assert_eq!(slots[0].frame_progress, 0.0);
        assert_eq!(slots[0].cached_w, 10);
    }

    #[test]
    fn test_mirrored_offsets() {
        let textures = TextureStore::new();
        let assets = AnimationStore::default();
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut slots = vec![bound_slot()];
        let mut p = parent(0);
        p.scale = 2.0;
        p.flipped = true;

        apply_frame_data(&mut slots, &p, Some(&[sample(true)]), &ctx, &mut rng);
        assert_eq!(slots[0].world_pos, IVec2::new(80, 210));
        assert_eq!(slots[0].rotation_degrees, -30.0);
        assert!(slots[0].visible);
    }

    #[test]
    fn test_parent_loop_restarts_active_slots() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, true);
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut slots = vec![bound_slot(), ChildAttachment::default()];

        apply_frame_data(&mut slots, &parent(2), Some(&[sample(true)]), &ctx, &mut rng);
        advance_frames(&mut slots, &parent(2), DT * 1.5, &ctx, &mut rng);
        assert_eq!(slots[0].current_frame, Some(1));
        assert!(slots[0].frame_progress > 0.0);

        apply_frame_data(&mut slots, &parent(0), None, &ctx, &mut rng);
        assert_eq!(slots[0].current_frame, Some(0));
        assert_eq!(slots[0].frame_progress, 0.0);
        assert!(!slots[0].visible);
        assert!(!slots[1].visible);
    }

    #[test]
    fn test_non_looping_child_holds_last_frame_unless_parent_on_default() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, false);
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);

        let mut slots = vec![bound_slot()];
        slots[0].visible = true;
        advance_frames(&mut slots, &parent(0), DT * 3.0, &ctx, &mut rng);
        assert_eq!(slots[0].current_frame, Some(1));

        let mut on_default = parent(0);
        on_default.animation_id = "default".into();
        let mut slots = vec![bound_slot()];
        slots[0].visible = true;
        advance_frames(&mut slots, &on_default, DT * 2.0, &ctx, &mut rng);
        assert_eq!(slots[0].current_frame, Some(0));
    }

    #[test]
    fn test_zero_delta_advances_one_frame() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, true);
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut slots = vec![bound_slot()];
        slots[0].visible = true;
        assert!(advance_frames(&mut slots, &parent(0), 0.0, &ctx, &mut rng));
        assert_eq!(slots[0].current_frame, Some(1));
    }

    #[test]
    fn test_out_of_range_and_inactive_entries_are_ignored() {
        let textures = TextureStore::new();
        let assets = AnimationStore::default();
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut slots = vec![bound_slot()];
        let mut stray = sample(true);
        stray.child_index = 4;
        let mut negative = sample(true);
        negative.child_index = -1;
        apply_frame_data(&mut slots, &parent(0), Some(&[stray, negative]), &ctx, &mut rng);
        assert!(!slots[0].visible);
    }

    fn parent_animation(textures: &mut TextureStore, mode: ChildTimelineMode) -> Animation {
        let mut anim = Animation::new("swing");
        anim.set_movement_paths(vec![MovementPath::new(frames(3, textures))]);
        anim.set_child_names(&["spark"]);
        let mut timeline = AnimationChildData::new("spark", mode);
        timeline.frames = vec![sample(true), sample(true), sample(false)];
        anim.set_child_data(vec!["spark".into()], vec![timeline]);
        anim
    }

    #[test]
    fn test_tick_children_static_timeline() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, true);
        let anim = parent_animation(&mut textures, ChildTimelineMode::Static);
        assert_eq!(anim.child_timelines()[0].frames.len(), 3);
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut attachments = ChildAttachments::default();

        assert!(tick_children(&mut attachments, &anim, &parent(0), DT, &ctx, &mut rng));
        assert_eq!(attachments.slots.len(), 1);
        assert!(attachments.slots[0].visible);
        assert_eq!(attachments.slots[0].world_pos, IVec2::new(110, 205));

        assert!(tick_children(&mut attachments, &anim, &parent(2), DT, &ctx, &mut rng));
        assert!(!attachments.slots[0].visible);
    }

    #[test]
    fn test_async_timeline_runs_after_start_event() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, true);
        let mut anim = parent_animation(&mut textures, ChildTimelineMode::Async);
        if let Some(frame) = anim.frame_mut(1) {
            frame.child_start_events = vec![0];
        }
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut attachments = ChildAttachments::default();

        tick_children(&mut attachments, &anim, &parent(0), DT, &ctx, &mut rng);
        assert!(!attachments.slots[0].visible);

        tick_children(&mut attachments, &anim, &parent(1), DT, &ctx, &mut rng);
        assert!(attachments.slots[0].timeline_active);
        assert!(attachments.slots[0].visible);

        // cursor walks onto the hidden last sample, then runs out
        for _ in 0..3 {
            tick_children(&mut attachments, &anim, &parent(2), DT, &ctx, &mut rng);
        }
        assert!(!attachments.slots[0].timeline_active);
        assert!(!attachments.slots[0].visible);
    }

    #[test]
    fn test_run_child_timeline_only_starts_async() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, true);
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);

        let anim = parent_animation(&mut textures, ChildTimelineMode::Async);
        let mut attachments = ChildAttachments::default();
        tick_children(&mut attachments, &anim, &parent(0), DT, &ctx, &mut rng);
        assert!(run_child_timeline(&mut attachments.slots, &anim, "spark"));
        assert!(!run_child_timeline(&mut attachments.slots, &anim, "smoke"));
        tick_children(&mut attachments, &anim, &parent(1), DT, &ctx, &mut rng);
        assert!(attachments.slots[0].visible);

        let still = parent_animation(&mut textures, ChildTimelineMode::Static);
        let mut attachments = ChildAttachments::default();
        tick_children(&mut attachments, &still, &parent(0), DT, &ctx, &mut rng);
        assert!(!run_child_timeline(&mut attachments.slots, &still, "spark"));
    }

    #[test]
    fn test_switching_parent_animation_drops_slots() {
        let mut textures = TextureStore::new();
        let assets = child_store(&mut textures, true);
        let anim = parent_animation(&mut textures, ChildTimelineMode::Static);
        let ctx = ChildContext::new(&assets, &textures);
        let mut rng = AnimationRng::seeded(3);
        let mut attachments = ChildAttachments::default();
        tick_children(&mut attachments, &anim, &parent(0), DT, &ctx, &mut rng);

        let bare = Animation::new("idle");
        assert!(tick_children(&mut attachments, &bare, &parent(0), DT, &ctx, &mut rng));
        assert!(attachments.slots.is_empty());
        assert_eq!(attachments.parent_animation, "idle");
    }
}
