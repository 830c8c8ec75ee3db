//! Animation playback system.
//!
//! [`animation_advance`] steps every [`AnimationPlayer`] on the `1/base_fps`
//! clock. Entering a frame applies its movement delta to the owner's
//! [`MapPosition`] and, when the frame asks for it, re-evaluates the owner's
//! [`ZIndex`]. When a non-looping animation runs out of frames its on-end
//! directive is applied and an [`AnimationEndedEvent`] is triggered.
//!
//! # Animation Flow
//!
//! 1. Asset definitions live in [`AnimationStore`]
//! 2. Entities carry an [`AssetInstance`] naming the asset and an
//!    [`AnimationPlayer`] naming the animation
//! 3. [`advance_player`] moves the player through the active movement path
//! 4. The system applies root motion, despawns killed entities and triggers
//!    the end events
//!
//! # Related
//!
//! - [`crate::components::animation::AnimationPlayer`] – per-entity playback state
//! - [`crate::events::animationend::AnimationEndedEvent`] – end notification
//! - [`crate::systems::childattachment`] – children follow the parent frame

use bevy_ecs::prelude::*;

use crate::animation::{DEFAULT_BASE_FPS, OnEndDirective};
use crate::components::animation::AnimationPlayer;
use crate::components::assetinstance::AssetInstance;
use crate::components::composite::Composite;
use crate::components::mapposition::MapPosition;
use crate::components::zindex::ZIndex;
use crate::events::animationend::AnimationEndedEvent;
use crate::loader::AssetInfo;
use crate::resources::animationrng::AnimationRng;
use crate::resources::animationstore::AnimationStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::WorldTime;

/// What one call to [`advance_player`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdvanceOutcome {
    /// Accumulated movement of the frames entered.
    pub dx: i32,
    pub dy: i32,
    /// An entered frame asked for a depth re-sort.
    pub resort_z: bool,
    /// The animation that ended and the directive applied to it.
    pub ended: Option<(String, OnEndDirective)>,
    /// The owner must be removed.
    pub kill: bool,
    /// The shown animation, path or frame differs from before the call.
    pub frame_changed: bool,
}

/// Playback settings shared by every player.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackClock<'a> {
    pub base_fps: u32,
    /// Animation that always loops.
    pub default_animation: &'a str,
}

impl Default for PlaybackClock<'_> {
    fn default() -> Self {
        Self {
            base_fps: DEFAULT_BASE_FPS,
            default_animation: "default",
        }
    }
}

impl PlaybackClock<'_> {
    fn interval(&self) -> f32 {
        1.0 / self.base_fps.max(1) as f32
    }
}

fn plays_default(info: &AssetInfo, name: &str, clock: &PlaybackClock) -> bool {
    name == clock.default_animation
        || (!info.default_animation.is_empty() && name == info.default_animation)
}

/// Advance one player by `dt` seconds.
///
/// A `dt` that is not positive advances one animation frame. Reversed
/// players walk backwards and stop on the first frame; the end event for a
/// reverse directive fires when the reversal starts.
pub fn advance_player(
    player: &mut AnimationPlayer,
    info: &AssetInfo,
    dt: f32,
    clock: &PlaybackClock,
    rng: &mut AnimationRng,
) -> AdvanceOutcome {
    let mut outcome = AdvanceOutcome::default();
    if player.is_stopped() {
        return outcome;
    }
    let before = (player.animation.clone(), player.path_index, player.frame);
    if info.animation(&player.animation).is_none() {
        let requested = player.animation.clone();
        if !player.switch_to(info, &requested, rng) {
            return outcome;
        }
    }

    let interval = clock.interval();
    player.frame_progress += if dt.is_finite() && dt > 0.0 { dt } else { interval };

    while player.frame_progress >= interval && !player.is_stopped() {
        player.frame_progress -= interval;
        let Some(anim) = info.animation(&player.animation) else {
            break;
        };
        let path = player.path_index;

        let step = if player.reverse {
            anim.prev_in_path(path, player.frame)
        } else {
            anim.next_in_path(path, player.frame)
        };
        if let Some(next) = step {
            player.frame = next;
        } else if player.reverse {
            player.reverse = false;
            player.locked_at_end = true;
            player.frame_progress = 0.0;
            break;
        } else if anim.looped || plays_default(info, &anim.name, clock) {
            player.frame = 0;
        } else {
            let directive = anim.on_end.clone();
            let ended = anim.name.clone();
            log::debug!("Animation '{}' of '{}' ended: {:?}", ended, info.name, directive);
            match &directive {
                OnEndDirective::Default => {
                    let target = info.default_animation.clone();
                    player.switch_to(info, &target, rng);
                }
                OnEndDirective::Kill => {
                    player.locked_at_end = true;
                    outcome.kill = true;
                }
                OnEndDirective::Lock => {
                    player.locked_at_end = true;
                    player.frame_progress = 0.0;
                }
                OnEndDirective::Reverse => {
                    if anim.frame_count() > 1 {
                        player.reverse = true;
                    } else {
                        player.locked_at_end = true;
                    }
                }
                OnEndDirective::Animation(target) => {
                    player.switch_to(info, target, rng);
                }
            }
            outcome.ended = Some((ended, directive));
            if player.reverse {
                continue;
            }
            break;
        }

        if let Some(frame) = anim.path_frame(path, player.frame) {
            outcome.dx += frame.dx;
            outcome.dy += frame.dy;
            outcome.resort_z |= frame.z_resort;
        }
    }
    outcome.frame_changed = before != (player.animation.clone(), player.path_index, player.frame);
    outcome
}

/// Advance all animation players and apply their root motion.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta.
/// - Looks up definitions in [`AnimationStore`] through [`AssetInstance`].
/// - Mutates [`AnimationPlayer`], [`MapPosition`] and [`ZIndex`].
/// - Marks the [`Composite`] dirty when the shown frame changed.
/// - Despawns entities whose animation ended with `kill`.
/// - Triggers [`AnimationEndedEvent`] for every end.
pub fn animation_advance(
    mut query: Query<(
        Entity,
        &AssetInstance,
        &mut AnimationPlayer,
        &mut MapPosition,
        Option<&mut ZIndex>,
        Option<&mut Composite>,
    )>,
    store: Res<AnimationStore>,
    config: Option<Res<GameConfig>>,
    time: Res<WorldTime>,
    mut rng: ResMut<AnimationRng>,
    mut commands: Commands,
) {
    let clock = match config.as_deref() {
        Some(config) => PlaybackClock {
            base_fps: config.base_fps,
            default_animation: &config.default_animation,
        },
        None => PlaybackClock::default(),
    };

    for (entity, instance, mut player, mut position, zindex, composite) in query.iter_mut() {
        let Some(info) = store.get(&instance.asset) else {
            continue;
        };
        let outcome = advance_player(&mut player, info, time.delta, &clock, &mut rng);
        if outcome.frame_changed
            && let Some(mut composite) = composite
        {
            composite.mark_dirty();
        }

        if outcome.dx != 0 || outcome.dy != 0 {
            position.translate(outcome.dx, outcome.dy);
        }
        if outcome.resort_z
            && let Some(mut z) = zindex
        {
            let depth = position.pixel().y;
            if z.0 != depth {
                z.0 = depth;
            }
        }
        if let Some((animation, directive)) = outcome.ended {
            commands.trigger(AnimationEndedEvent {
                entity,
                animation,
                directive,
            });
        }
        if outcome.kill {
            commands.entity(entity).despawn();
        }
    }
}
