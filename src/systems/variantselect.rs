//! Variant selection system.
//!
//! Picks, once per tick, which pre-rendered scale variant every asset draws
//! with. The request is the asset's scale factor times its perspective
//! scale, divided by the camera scale; a low-pass filtered copy of it is
//! tested against the hysteresis band of the previous choice so that small
//! oscillations never flip variants.
//!
//! # Related
//!
//! - [`crate::scaling::ScalePolicy`] – the choice itself
//! - [`crate::resources::scaleprofiles::ScaleProfileStore`] – per-asset steps
//! - [`crate::systems::composite`] – consumes the chosen variant

use bevy_ecs::prelude::*;

use crate::components::assetinstance::AssetInstance;
use crate::components::composite::Composite;
use crate::components::perspectivescale::PerspectiveScale;
use crate::loader::AssetInfo;
use crate::resources::animationstore::AnimationStore;
use crate::resources::camera2d::Camera2DRes;
use crate::resources::scaleprofiles::ScaleProfileStore;
use crate::scaling::{HysteresisState, ScaleSelection};

/// Weight of the new request in the low-pass filter.
pub const SCALE_SMOOTHING: f32 = 0.35;

/// Scale the asset is drawn at before the camera: `scale_factor · perspective`.
pub fn current_scale(info: &AssetInfo, perspective: f32) -> f32 {
    let factor = if info.scale_factor.is_finite() && info.scale_factor > 0.0 {
        info.scale_factor
    } else {
        1.0
    };
    factor * perspective
}

/// Variant request for an asset drawn at `current` through a camera.
pub fn desired_variant_scale(current: f32, camera_scale: f32) -> f32 {
    let camera = if camera_scale.is_finite() && camera_scale > 0.0 {
        camera_scale
    } else {
        1.0
    };
    let desired = current / camera;
    if desired.is_finite() && desired > 0.0 {
        desired
    } else {
        1.0
    }
}

fn smooth(previous: f32, desired: f32) -> f32 {
    if previous.is_finite() && previous > 0.0 {
        previous + (desired - previous) * SCALE_SMOOTHING
    } else {
        desired
    }
}

/// Run the selection for one asset and write it into `composite`.
///
/// The remainder written is relative to the current scale, not the camera
/// request, so the package scale (`nearest · remainder`) equals
/// `scale_factor · perspective`. A variant change marks the composite dirty.
pub fn select_for_asset(
    composite: &mut Composite,
    info: &AssetInfo,
    perspective: f32,
    camera_scale: f32,
    profiles: &mut ScaleProfileStore,
) -> ScaleSelection {
    if !info.scale_variants.is_empty() {
        profiles.register(&info.name, &info.scale_variants);
    }
    let lookup = profiles.profile_for_asset(&info.name);
    if lookup.revision_changed || composite.profile_revision != lookup.profile.revision {
        composite.hysteresis = None;
        composite.smoothed_scale = 0.0;
        composite.profile_revision = lookup.profile.revision;
    }

    let current = current_scale(info, perspective);
    let desired = desired_variant_scale(current, camera_scale);
    composite.smoothed_scale = smooth(composite.smoothed_scale, desired);

    let policy = *profiles.policy();
    let selection = policy.choose(
        desired,
        &lookup.profile.steps,
        composite.hysteresis.as_ref(),
        composite.smoothed_scale,
    );

    if selection.index != composite.variant_index {
        log::debug!(
            "'{}' switches variant {} -> {} (stored {:.2})",
            info.name,
            composite.variant_index,
            selection.index,
            selection.stored_scale
        );
        composite.variant_index = selection.index;
        composite.mark_dirty();
    }
    composite.nearest_variant_scale = selection.stored_scale;
    composite.remaining_scale_adjustment = current / selection.stored_scale;
    composite.hysteresis = Some(HysteresisState::from_selection(&selection));
    selection
}

/// Choose the scale variant of every asset.
///
/// Contract
/// - Reads [`Camera2DRes`] (camera scale 1.0 when absent) and [`AnimationStore`].
/// - Registers asset step lists in [`ScaleProfileStore`].
/// - Mutates the selection fields of [`Composite`]; a variant change marks it dirty.
pub fn select_variants(
    mut query: Query<(&AssetInstance, &mut Composite, Option<&PerspectiveScale>)>,
    store: Res<AnimationStore>,
    camera: Option<Res<Camera2DRes>>,
    mut profiles: ResMut<ScaleProfileStore>,
) {
    let camera_scale = camera.map(|c| c.scale()).unwrap_or(1.0);
    for (instance, mut composite, perspective) in query.iter_mut() {
        let Some(info) = store.get(&instance.asset) else {
            continue;
        };
        let perspective = PerspectiveScale::effective(perspective, info.apply_distance_scaling);
        select_for_asset(&mut composite, info, perspective, camera_scale, &mut profiles);
    }
}
