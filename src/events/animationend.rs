//! Animation end events.
//!
//! When a non-looping animation runs out of frames, the
//! [`animation_advance`](crate::systems::animation::animation_advance) system
//! applies its on-end directive and triggers an [`AnimationEndedEvent`].
//! The directive has already been applied when observers run; a `Kill`
//! entity is despawned by the same command flush.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<AnimationEndedEvent>| {
//!     if trigger.directive == OnEndDirective::Kill {
//!         log::info!("{:?} finished '{}'", trigger.entity, trigger.animation);
//!     }
//! });
//! ```
//!
//! # Related
//!
//! - [`crate::animation::OnEndDirective`] – what happens at the end
//! - [`crate::components::animation::AnimationPlayer`] – playback state

use bevy_ecs::prelude::*;

use crate::animation::OnEndDirective;

/// Event emitted when an animation reaches its end.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AnimationEndedEvent {
    /// The entity that played the animation.
    pub entity: Entity,
    /// Name of the animation that ended.
    pub animation: String,
    /// Directive that was applied.
    pub directive: OnEndDirective,
}
