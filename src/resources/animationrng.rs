//! Random source for animation restarts.
//!
//! Child attachments and players that start on a random frame draw from this
//! one generator. Only the animation systems touch it, so it needs no lock.

use bevy_ecs::prelude::Resource;
use fastrand::Rng;

#[derive(Resource, Debug, Clone)]
pub struct AnimationRng(pub Rng);

impl Default for AnimationRng {
    fn default() -> Self {
        Self(Rng::new())
    }
}

impl AnimationRng {
    /// Deterministic generator, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self(Rng::with_seed(seed))
    }

    /// Uniform index in `0..len`; 0 when `len` is 0.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 { 0 } else { self.0.usize(0..len) }
    }
}
