//! Binds an entity to an asset definition.

use bevy_ecs::prelude::{Bundle, Component};

use crate::components::animation::AnimationPlayer;
use crate::components::childattachment::ChildAttachments;
use crate::components::composite::Composite;
use crate::components::lightsources::LightSources;
use crate::components::mapposition::MapPosition;
use crate::components::zindex::ZIndex;
use crate::loader::AssetInfo;
use crate::resources::animationrng::AnimationRng;

/// Which [`AssetInfo`] an entity draws, and whether it is mirrored
/// horizontally.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct AssetInstance {
    /// Key into [`AnimationStore`](crate::resources::animationstore::AnimationStore).
    pub asset: String,
    pub flipped: bool,
}

impl AssetInstance {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            flipped: false,
        }
    }

    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }
}

/// Every component an animated asset needs, playing its default animation.
///
/// Depth starts at the position's y.
pub fn asset_bundle(
    info: &AssetInfo,
    position: MapPosition,
    flipped: bool,
    rng: &mut AnimationRng,
) -> impl Bundle {
    let mut player = AnimationPlayer::new(info.default_animation.clone());
    let requested = info.default_animation.clone();
    if !player.switch_to(info, &requested, rng) {
        log::warn!("Asset '{}' spawned without animations", info.name);
    }
    (
        AssetInstance::new(info.name.clone()).flipped(flipped),
        player,
        position,
        ZIndex(position.pixel().y),
        Composite::default(),
        ChildAttachments::default(),
        LightSources::from_info(info),
    )
}
