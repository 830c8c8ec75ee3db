//! Asset definition registry.
//!
//! Every asset type loaded from disk lands here once, keyed by asset name.
//! Entities refer to their type through
//! [`AssetInstance`](crate::components::assetinstance::AssetInstance) and
//! the systems look the definition up each tick.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::animation::Animation;
use crate::loader::AssetInfo;
use crate::resources::texturestore::TextureStore;

/// Central registry of asset definitions keyed by asset name.
#[derive(Resource, Default)]
pub struct AnimationStore {
    pub assets: FxHashMap<String, AssetInfo>,
}

impl AnimationStore {
    pub fn insert(&mut self, info: AssetInfo) {
        if let Some(previous) = self.assets.insert(info.name.clone(), info) {
            log::warn!("Asset '{}' replaced an earlier definition", previous.name);
        }
    }

    pub fn get(&self, asset: &str) -> Option<&AssetInfo> {
        self.assets.get(asset)
    }

    pub fn get_mut(&mut self, asset: &str) -> Option<&mut AssetInfo> {
        self.assets.get_mut(asset)
    }

    pub fn animation(&self, asset: &str, animation: &str) -> Option<&Animation> {
        self.assets.get(asset)?.animation(animation)
    }

    /// Drop an asset and release its textures.
    pub fn remove(&mut self, asset: &str, store: &mut TextureStore) -> bool {
        match self.assets.remove(asset) {
            Some(mut info) => {
                info.release_textures(store);
                true
            }
            None => false,
        }
    }
}
