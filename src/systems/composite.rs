//! Composite render package builder.
//!
//! Each asset keeps two ordered lists in its [`Composite`], regenerated only
//! when one of their inputs changed:
//!
//! - `render_package`: back lights, back children, the base frame, front
//!   children, front lights, in that order;
//! - `scene_mask_lights`: copies of the lights that also brighten the
//!   scene's dark mask.
//!
//! Rect coordinates follow the [`RenderObject`] convention: `(x, y)` is the
//! quad's anchor in world pixels, the bottom centre for frames and
//! children. [`build_composite`] is pure over its inputs; [`composite_build`]
//! is the system that feeds it.
//!
//! # Related
//!
//! - [`crate::systems::variantselect`] – chooses the variant and scale used here
//! - [`crate::systems::childattachment`] – positions the children
//! - [`crate::systems::lightflicker`] – light brightness over time
//! - [`crate::systems::render`] – submits the packages

use bevy_ecs::prelude::*;

use crate::animation::AnimationFrame;
use crate::components::animation::AnimationPlayer;
use crate::components::assetinstance::AssetInstance;
use crate::components::childattachment::{ChildAttachment, ChildAttachments};
use crate::components::composite::{BlendMode, Composite, FlipFlags, RenderObject};
use crate::components::lightsources::LightSources;
use crate::components::mapposition::MapPosition;
use crate::components::perspectivescale::PerspectiveScale;
use crate::loader::{AssetInfo, LightSource};
use crate::resources::animationstore::AnimationStore;
use crate::resources::camera2d::Camera2DRes;
use crate::resources::scaleprofiles::ScaleProfileStore;
use crate::resources::texturestore::{TextureId, TextureStore};
use crate::resources::worldtime::WorldTime;
use crate::scaling::{DEFAULT_SCALE_STEPS, ScalePolicy};
use crate::systems::lightflicker::flicker_multiplier;
use crate::systems::variantselect::desired_variant_scale;
use crate::types::{IRect, IVec2, Rgba};

const MIN_SCALE: f32 = 0.0001;
const PACKAGE_SCALE_EPSILON: f32 = 0.001;

/// The asset side of a package build.
#[derive(Clone, Copy)]
pub struct CompositeSource<'a> {
    pub info: &'a AssetInfo,
    /// Frame being shown; `None` emits no base quad.
    pub frame: Option<&'a AnimationFrame>,
    pub position: IVec2,
    pub flipped: bool,
    /// Effective perspective scale (1.0 unless the asset opts in).
    pub perspective: f32,
    pub lights: &'a [LightSource],
    pub children: &'a [ChildAttachment],
}

/// Shared lookups and per-tick values of a package build.
#[derive(Clone, Copy)]
pub struct CompositeEnv<'a> {
    pub assets: &'a AnimationStore,
    pub textures: &'a TextureStore,
    pub policy: ScalePolicy,
    /// World pixels per screen pixel.
    pub camera_scale: f32,
    pub flicker_time: f32,
}

/// `nearest · remainder · perspective`, 1.0 when that is not positive finite.
pub fn package_scale(composite: &Composite, perspective: f32) -> f32 {
    let scale =
        composite.nearest_variant_scale * composite.remaining_scale_adjustment * perspective;
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Flicker-modulated light colour; `None` when the light is dark.
pub fn light_color(light: &LightSource, time_seconds: f32) -> Option<Rgba> {
    let intensity = light.intensity.clamp(0, 255);
    if intensity == 0 {
        return None;
    }
    let flicker = flicker_multiplier(light, time_seconds);
    let scaled = ((intensity as f32 * flicker).round() as i32).clamp(0, 255);
    if scaled == 0 {
        return None;
    }
    let channel = |c: u8| ((c as f32 * scaled as f32 / 255.0).round() as i32).clamp(0, 255) as u8;
    let mut color = Rgba::new(
        channel(light.color.r),
        channel(light.color.g),
        channel(light.color.b),
        channel(light.color.a),
    );
    if color.a == 0 {
        color.a = scaled as u8;
    }
    Some(color)
}

fn scaled_len(len: i32, scale: f32) -> i32 {
    ((len as f32 * scale).round() as i32).max(1)
}

fn emit_lights(
    composite: &mut Composite,
    source: &CompositeSource,
    env: &CompositeEnv,
    pkg: f32,
    front: bool,
) {
    for light in source.lights {
        let placed = if front { light.in_front } else { light.behind };
        if !placed {
            continue;
        }
        let Some(texture) = light.texture else {
            continue;
        };
        let Some((w, h)) = env.textures.size(texture) else {
            continue;
        };
        let Some(color) = light_color(light, env.flicker_time) else {
            continue;
        };
        let offset_x = if source.flipped {
            -light.offset_x
        } else {
            light.offset_x
        };
        let rect = IRect::new(
            (source.position.x as f32 + offset_x as f32 * pkg) as i32,
            (source.position.y as f32 + light.offset_y as f32 * pkg) as i32,
            scaled_len(w, pkg),
            scaled_len(h, pkg),
        );
        let mut object = RenderObject::new(texture, rect);
        object.color_mod = color;
        object.blend_mode = BlendMode::Additive;
        object.flip = FlipFlags::horizontal(source.flipped);
        if light.render_to_dark_mask {
            composite.scene_mask_lights.push(object.clone());
        }
        composite.render_package.push(object);
    }
}

/// Quad of one visible child slot.
fn child_object(
    slot: &ChildAttachment,
    source: &CompositeSource,
    env: &CompositeEnv,
) -> Option<RenderObject> {
    if slot.child_index < 0 || !slot.visible {
        return None;
    }
    let anim = env
        .assets
        .animation(&slot.asset_name, slot.animation.as_deref()?)?;
    let frame = anim.frame(slot.current_frame?)?;
    let child_info = env.assets.get(&slot.asset_name);

    let base_scale = child_info
        .map(|i| i.scale_factor)
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(1.0);
    let current = base_scale * source.perspective;
    let desired = desired_variant_scale(current, env.camera_scale);
    let steps = child_info
        .map(|i| i.scale_variants.as_slice())
        .filter(|s| !s.is_empty())
        .unwrap_or(&DEFAULT_SCALE_STEPS);
    let selection = env.policy.choose_simple(desired, steps);
    let nearest = selection.stored_scale;
    let remainder = if nearest > 0.0 { current / nearest } else { 1.0 };

    let texture: TextureId = anim
        .get_frame(frame, nearest, &env.policy)
        .and_then(|v| v.base)
        .or_else(|| frame.base_texture(0))?;
    let (tex_w, tex_h) = env.textures.size(texture)?;

    let adjustment = remainder / source.perspective.max(MIN_SCALE);
    let w = scaled_len(tex_w, adjustment);
    let h = scaled_len(tex_h, adjustment);
    let rect = IRect::new(slot.world_pos.x, slot.world_pos.y, w, h);
    let mut object = RenderObject::new(texture, rect);
    object.angle = slot.rotation_degrees;
    object.center = IVec2::new(w / 2, h);
    object.custom_center = true;
    object.flip = FlipFlags::horizontal(source.flipped);
    Some(object)
}

fn emit_children(
    composite: &mut Composite,
    source: &CompositeSource,
    env: &CompositeEnv,
    front: bool,
) {
    for slot in source.children.iter().filter(|s| s.render_in_front == front) {
        if let Some(object) = child_object(slot, source, env) {
            composite.render_package.push(object);
        }
    }
}

fn emit_base(composite: &mut Composite, source: &CompositeSource, env: &CompositeEnv) {
    let Some(frame) = source.frame else {
        return;
    };
    let texture = frame
        .variants
        .get(composite.variant_index.min(frame.variants.len().saturating_sub(1)))
        .and_then(|v| v.base)
        .or_else(|| frame.base_texture(0));
    let Some(texture) = texture else {
        return;
    };
    let Some((w, h)) = env.textures.size(texture) else {
        return;
    };
    let remainder = composite.remaining_scale_adjustment;
    let remainder = if remainder.is_finite() && remainder > 0.0 {
        remainder
    } else {
        1.0
    };
    let adjustment = remainder / source.perspective.max(MIN_SCALE);
    let rect = IRect::new(
        source.position.x,
        source.position.y,
        scaled_len(w, adjustment),
        scaled_len(h, adjustment),
    );
    composite.render_package.push(RenderObject::new(texture, rect));
}

/// Union of the package rects relative to `position`.
pub fn local_bounds(package: &[RenderObject], position: IVec2) -> IRect {
    package
        .iter()
        .map(|o| o.screen_rect)
        .reduce(|acc, r| acc.union(&r))
        .map(|r| r.translated(IVec2::ZERO - position))
        .unwrap_or_default()
}

/// True when a placed light changes brightness over time.
fn has_flickering_light(lights: &[LightSource]) -> bool {
    lights
        .iter()
        .any(|l| (l.in_front || l.behind) && l.texture.is_some() && l.flicker_speed > 0)
}

/// Rebuild the render package of one asset when its inputs changed.
///
/// The package is regenerated when the composite is dirty, the package
/// scale moved by more than [`PACKAGE_SCALE_EPSILON`], the anchor, facing
/// or camera scale differ from the last build, or a light flickers.
/// Otherwise the previous lists are kept. Returns true on regeneration.
pub fn build_composite(
    composite: &mut Composite,
    source: &CompositeSource,
    env: &CompositeEnv,
) -> bool {
    let pkg = package_scale(composite, source.perspective);
    if (composite.cached_package_scale - pkg).abs() > PACKAGE_SCALE_EPSILON
        || composite.cached_position != source.position
        || composite.cached_flipped != source.flipped
        || (composite.cached_camera_scale - env.camera_scale).abs() > PACKAGE_SCALE_EPSILON
        || has_flickering_light(source.lights)
    {
        composite.mark_dirty();
    }
    composite.cached_package_scale = pkg;
    if !composite.dirty {
        return false;
    }
    composite.cached_position = source.position;
    composite.cached_flipped = source.flipped;
    composite.cached_camera_scale = env.camera_scale;
    composite.render_package.clear();
    composite.scene_mask_lights.clear();

    emit_lights(composite, source, env, pkg, false);
    emit_children(composite, source, env, false);
    emit_base(composite, source, env);
    emit_children(composite, source, env, true);
    emit_lights(composite, source, env, pkg, true);

    composite.local_bounds = local_bounds(&composite.render_package, source.position);
    composite.dirty = false;
    true
}

/// Build the render package of every asset.
///
/// Contract
/// - Runs after variant selection and the child attachment update.
/// - Reads [`WorldTime`] elapsed seconds as the flicker clock.
/// - Uses [`LightSources`] when present, else the definition's lights.
/// - A changed instance, light list or animation store marks the package dirty.
#[allow(clippy::type_complexity)]
pub fn composite_build(
    mut query: Query<(
        Ref<AssetInstance>,
        &AnimationPlayer,
        &MapPosition,
        &mut Composite,
        Option<&ChildAttachments>,
        Option<Ref<LightSources>>,
        Option<&PerspectiveScale>,
    )>,
    store: Res<AnimationStore>,
    textures: Res<TextureStore>,
    profiles: Res<ScaleProfileStore>,
    camera: Option<Res<Camera2DRes>>,
    time: Res<WorldTime>,
) {
    let env = CompositeEnv {
        assets: &store,
        textures: &textures,
        policy: *profiles.policy(),
        camera_scale: camera.map(|c| c.scale()).unwrap_or(1.0),
        flicker_time: time.elapsed,
    };

    for (instance, player, position, mut composite, children, lights, perspective) in
        query.iter_mut()
    {
        let Some(info) = store.get(&instance.asset) else {
            continue;
        };
        let inputs_changed = store.is_changed()
            || instance.is_changed()
            || lights.as_ref().is_some_and(|l| l.is_changed());
        if inputs_changed {
            composite.mark_dirty();
        }
        let frame = info.animation(&player.animation).and_then(|anim| {
            anim.path_frame(player.path_index, player.frame)
                .or_else(|| anim.frame(player.frame))
        });
        let source = CompositeSource {
            info,
            frame,
            position: position.pixel(),
            flipped: instance.flipped,
            perspective: PerspectiveScale::effective(perspective, info.apply_distance_scaling),
            lights: lights.as_deref().map_or(info.lights.as_slice(), |l| l.as_slice()),
            children: children.map(|c| c.slots.as_slice()).unwrap_or(&[]),
        };
        build_composite(&mut composite, &source, &env);
    }
}
