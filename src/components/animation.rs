//! Animation playback state.
//!
//! [`AnimationPlayer`] records which animation of the entity's asset is
//! playing and where in it the entity is. The definitions themselves live in
//! [`AnimationStore`](crate::resources::animationstore::AnimationStore); the
//! player only keeps names and indices.
//!
//! # Related
//!
//! - [`crate::systems::animation::animation_advance`] – advances players and applies on-end directives
//! - [`crate::events::animationend::AnimationEndedEvent`] – triggered when an animation runs out

use bevy_ecs::prelude::Component;

use crate::animation::Animation;
use crate::loader::AssetInfo;
use crate::resources::animationrng::AnimationRng;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct AnimationPlayer {
    /// Name of the playing animation.
    pub animation: String,
    /// Position of the current frame in the active movement path.
    pub frame: usize,
    /// Active movement path.
    pub path_index: usize,
    /// Seconds accumulated toward the next frame.
    pub frame_progress: f32,
    /// The frame does not advance (frozen or locked animation).
    pub static_frame: bool,
    /// Walking `prev` links after a `reverse` directive.
    pub reverse: bool,
    /// Stopped on the last frame after a `lock` directive.
    pub locked_at_end: bool,
}

impl AnimationPlayer {
    pub fn new(animation: impl Into<String>) -> Self {
        Self {
            animation: animation.into(),
            frame: 0,
            path_index: 0,
            frame_progress: 0.0,
            static_frame: false,
            reverse: false,
            locked_at_end: false,
        }
    }

    /// Start `requested` on `info`.
    ///
    /// Unknown names fall back to the asset's default animation, then to its
    /// first one. Returns false when the asset has no animations at all.
    pub fn switch_to(&mut self, info: &AssetInfo, requested: &str, rng: &mut AnimationRng) -> bool {
        let Some(name) = info.resolve_animation_name(requested) else {
            log::warn!("Asset '{}' has no animation to play", info.name);
            return false;
        };
        if name != requested {
            log::debug!(
                "Asset '{}' has no animation '{}', playing '{}'",
                info.name,
                requested,
                name
            );
        }
        let Some(anim) = info.animation(name) else {
            return false;
        };
        self.animation = name.to_string();
        self.path_index = anim.clamp_path_index(self.path_index);
        self.frame = start_frame(anim, rng);
        self.frame_progress = 0.0;
        self.static_frame = anim.is_frozen() || anim.locked;
        self.reverse = false;
        self.locked_at_end = false;
        true
    }

    /// Whether the player has stopped for good.
    pub fn is_stopped(&self) -> bool {
        self.static_frame || self.locked_at_end
    }
}

/// First frame to show: 0, or a uniform pick for randomised animations.
pub fn start_frame(anim: &Animation, rng: &mut AnimationRng) -> usize {
    let count = anim.frame_count();
    if (anim.randomize || anim.rnd_start) && count > 1 {
        rng.index(count)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationFrame, MovementPath};

    fn animation(name: &str, frames: usize) -> Animation {
        let mut anim = Animation::new(name);
        anim.set_movement_paths(vec![MovementPath::new(vec![
            AnimationFrame::default();
            frames
        ])]);
        anim
    }

    fn info() -> AssetInfo {
        let mut info = AssetInfo::new("hero");
        info.animations.insert("default".into(), animation("default", 3));
        let mut locked = animation("pose", 4);
        locked.locked = true;
        info.animations.insert("pose".into(), locked);
        info
    }

    #[test]
    fn test_switch_to_unknown_falls_back_to_default() {
        let info = info();
        let mut rng = AnimationRng::seeded(1);
        let mut player = AnimationPlayer::new("");
        assert!(player.switch_to(&info, "missing", &mut rng));
        assert_eq!(player.animation, "default");
        assert_eq!(player.frame, 0);
        assert!(!player.static_frame);
    }

    #[test]
    fn test_switch_to_locked_is_static() {
        let info = info();
        let mut rng = AnimationRng::seeded(1);
        let mut player = AnimationPlayer::new("default");
        player.frame_progress = 0.3;
        player.reverse = true;
        assert!(player.switch_to(&info, "pose", &mut rng));
        assert!(player.static_frame);
        assert!(!player.reverse);
        assert_eq!(player.frame_progress, 0.0);
    }

    #[test]
    fn test_switch_to_empty_asset_fails() {
        let info = AssetInfo::new("ghost");
        let mut rng = AnimationRng::seeded(1);
        let mut player = AnimationPlayer::new("idle");
        assert!(!player.switch_to(&info, "idle", &mut rng));
        assert_eq!(player.animation, "idle");
    }

    #[test]
    fn test_start_frame_randomised_stays_in_range() {
        let mut anim = animation("spin", 5);
        anim.randomize = true;
        let mut rng = AnimationRng::seeded(7);
        for _ in 0..50 {
            assert!(start_frame(&anim, &mut rng) < 5);
        }
        let single = animation("still", 1);
        assert_eq!(start_frame(&single, &mut rng), 0);
    }
}
