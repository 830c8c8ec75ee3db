//! Game configuration change detection system.
//!
//! Monitors [`GameConfig`] for changes and pushes the settings into the
//! resources that depend on them: the scale selection policy of
//! [`ScaleProfileStore`] and, when a window exists, vsync and target FPS.

use bevy_ecs::prelude::*;
use raylib::ffi;

use crate::resources::gameconfig::GameConfig;
use crate::resources::scaleprofiles::ScaleProfileStore;

/// System that applies game configuration changes.
///
/// This system detects when [`GameConfig`] is added or modified and:
/// 1. Replaces the [`ScaleProfileStore`] policy (quality cap and margins)
/// 2. Applies vsync and target FPS to the window, if one is open
///
/// # Resource Dependencies
/// - `GameConfig` (optional) - the configuration to monitor
/// - `ScaleProfileStore` (mutable) - receives the selection policy
/// - `RaylibHandle` (optional, non-send, mutable) - for window settings
pub fn apply_gameconfig_changes(
    maybe_config: Option<Res<GameConfig>>,
    mut profiles: ResMut<ScaleProfileStore>,
    rl: Option<NonSendMut<raylib::RaylibHandle>>,
) {
    let Some(config) = maybe_config else {
        return;
    };
    if !(config.is_changed() || config.is_added()) {
        return;
    }

    let policy = config.scale_policy();
    if *profiles.policy() != policy {
        log::info!(
            "Scale policy: quality cap {:.2}, hysteresis {:.3}, preload {:.3}",
            policy.quality_cap,
            policy.hysteresis_margin,
            policy.preload_margin
        );
        profiles.set_policy(policy);
        // Bands computed under the old margins are stale.
        profiles.reset_history();
    }

    if let Some(mut rl) = rl {
        unsafe {
            if config.vsync {
                ffi::SetWindowState(ffi::ConfigFlags::FLAG_VSYNC_HINT as u32);
            } else {
                ffi::ClearWindowState(ffi::ConfigFlags::FLAG_VSYNC_HINT as u32);
            }
        }
        rl.set_target_fps(config.target_fps);
        log::info!("GameConfig changes applied (vsync {}, {} fps)", config.vsync, config.target_fps);
    }
}
