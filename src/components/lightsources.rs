//! Per-entity light list.
//!
//! Spawned from the asset definition so an entity can dim or drop its own
//! lights without touching the shared definition. Entities without the
//! component use the definition's lights directly.

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

use crate::loader::{AssetInfo, LightSource};

#[derive(Component, Clone, Debug, Default)]
pub struct LightSources(pub SmallVec<[LightSource; 2]>);

impl LightSources {
    pub fn from_info(info: &AssetInfo) -> Self {
        Self(info.lights.iter().cloned().collect())
    }

    pub fn as_slice(&self) -> &[LightSource] {
        &self.0
    }
}
