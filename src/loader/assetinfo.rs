//! Per-asset-type definitions (`info.json`).
//!
//! An [`AssetInfo`] is shared by every instance of one asset type: scale
//! factor and steps, shading, the animations by name, and the light
//! sources. [`load_asset_info`] reads `cache/<asset>/info.json` and loads
//! every animation it names:
//!
//! 1. folder animations, whose frames are PNGs on disk;
//! 2. derived animations, cloned from an already loaded source, in as many
//!    rounds as the source chain needs;
//! 3. inherited movement for derived animations left without frames.
//!
//! On-end targets that name no loaded animation fall back to the default
//! directive.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::cloner::{CloneOptions, copy_from};
use super::frames::{FrameLayout, clear_texture_cache, load_folder_animation};
use super::{PartialLoad, TextureLoader};
use crate::animation::{
    Animation, AudioClip, OnEndDirective, SourceKind, classify_on_end, is_reserved_animation_name,
};
use crate::animdoc::AnimationDocument;
use crate::animdoc::lenient::{field, field_bool, field_float, field_int, field_str, json_int};
use crate::error::{AnimError, AnimResult};
use crate::resources::animationstore::AnimationStore;
use crate::resources::texturestore::{TextureId, TextureStore};
use crate::scaling::normalize_variant_steps;
use crate::types::Rgba;

/// A light attached to an asset type.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    pub intensity: i32,
    pub radius: i32,
    pub fall_off: i32,
    pub flare: i32,
    /// 0..=100
    pub flicker_speed: i32,
    /// 0..=100
    pub flicker_smoothness: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub color: Rgba,
    pub in_front: bool,
    pub behind: bool,
    pub render_to_dark_mask: bool,
    pub texture: Option<TextureId>,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            intensity: 255,
            radius: 64,
            fall_off: 50,
            flare: 0,
            flicker_speed: 0,
            flicker_smoothness: 100,
            offset_x: 0,
            offset_y: 0,
            color: Rgba::WHITE,
            in_front: false,
            behind: false,
            render_to_dark_mask: false,
            texture: None,
        }
    }
}

impl LightSource {
    /// Parse one light entry. `None` when the entry is not an object or
    /// says `"has_light_source": false`.
    pub fn from_json(node: &Value) -> Option<Self> {
        if !node.is_object() || !field_bool(node, "has_light_source", true) {
            return None;
        }
        let d = LightSource::default();
        let intensity = field(node, "light_intensity")
            .or_else(|| field(node, "intensity"))
            .map_or(d.intensity, |v| json_int(v, d.intensity));
        let color = field(node, "light_color")
            .or_else(|| field(node, "color"))
            .and_then(Value::as_array)
            .filter(|c| c.len() >= 3)
            .map(|c| {
                let ch = |v: &Value| json_int(v, 255).clamp(0, 255) as u8;
                Rgba::rgb(ch(&c[0]), ch(&c[1]), ch(&c[2]))
            })
            .unwrap_or(Rgba::WHITE);
        Some(Self {
            intensity: intensity.clamp(1, 255),
            radius: field_int(node, "radius", d.radius).max(1),
            fall_off: field_int(node, "fall_off", d.fall_off).max(0),
            flare: field_int(node, "flare", d.flare).clamp(0, 100),
            flicker_speed: field_int(node, "flicker_speed", 0).clamp(0, 100),
            flicker_smoothness: field_int(node, "flicker_smoothness", d.flicker_smoothness)
                .clamp(0, 100),
            offset_x: field_int(node, "offset_x", 0),
            offset_y: field_int(node, "offset_y", 0),
            color,
            in_front: field_bool(node, "in_front", false),
            behind: field_bool(node, "behind", false),
            render_to_dark_mask: field_bool(node, "render_to_dark_mask", false),
            texture: None,
        })
    }
}

/// Definition shared by every instance of one asset type.
#[derive(Clone, Debug)]
pub struct AssetInfo {
    pub name: String,
    /// Authored size relative to the pre-rendered frames.
    pub scale_factor: f32,
    /// Largest first, each in (0, 1].
    pub scale_variants: Vec<f32>,
    pub smooth_scaling: bool,
    pub shaded: bool,
    /// Instances take a perspective scale from their position.
    pub apply_distance_scaling: bool,
    pub default_animation: String,
    /// Child assets shared by every animation of this asset.
    pub animation_children: Vec<String>,
    pub animations: FxHashMap<String, Animation>,
    pub lights: Vec<LightSource>,
}

impl AssetInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale_factor: 1.0,
            scale_variants: vec![1.0],
            smooth_scaling: true,
            shaded: false,
            apply_distance_scaling: true,
            default_animation: "default".to_string(),
            animation_children: Vec::new(),
            animations: FxHashMap::default(),
            lights: Vec::new(),
        }
    }

    /// Read the asset-level keys of an `info.json` object. Animations and
    /// light textures are not loaded.
    pub fn from_json(name: &str, data: &Value) -> Self {
        let mut info = AssetInfo::new(name);
        let size = field(data, "size_settings");

        info.scale_factor = match field(data, "scale_factor") {
            Some(_) => field_float(data, "scale_factor", 1.0),
            None => size.map_or(1.0, |s| field_float(s, "scale_percentage", 100.0) / 100.0),
        };
        if !info.scale_factor.is_finite() || info.scale_factor <= 0.0 {
            info.scale_factor = 1.0;
        }

        if let Some(list) = field(data, "scale_variants").and_then(Value::as_array) {
            let mut steps: Vec<f32> = list
                .iter()
                .filter_map(Value::as_f64)
                .map(|v| v as f32)
                .collect();
            normalize_variant_steps(&mut steps);
            info.scale_variants = steps;
        }

        info.smooth_scaling = match (field(data, "smooth_scaling"), size.and_then(|s| field_str(s, "scale_filter"))) {
            (Some(_), _) => field_bool(data, "smooth_scaling", true),
            (None, Some(filter)) => !matches!(
                filter.trim().to_ascii_lowercase().as_str(),
                "nearest" | "point" | "none"
            ),
            (None, None) => true,
        };
        info.shaded = field_bool(data, "shaded", field_bool(data, "has_shading", false));
        info.apply_distance_scaling = field_bool(data, "apply_distance_scaling", true);
        info.default_animation = field_str(data, "default_animation")
            .or_else(|| field_str(data, "start"))
            .filter(|s| !s.is_empty())
            .unwrap_or("default")
            .to_string();

        info.animation_children = field(data, "animation_children")
            .and_then(Value::as_array)
            .map(|l| dedup(l.iter().filter_map(Value::as_str)))
            .unwrap_or_default();

        let lights = field(data, "lights").or_else(|| field(data, "lighting_info"));
        info.lights = match lights {
            Some(Value::Array(list)) => list.iter().filter_map(LightSource::from_json).collect(),
            Some(node @ Value::Object(_)) => LightSource::from_json(node).into_iter().collect(),
            _ => Vec::new(),
        };
        info
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// Animation names in a stable order.
    pub fn animation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Name to play when `requested` is unknown: `requested` itself, then
    /// the default animation, then `"default"`, then the first name.
    pub fn resolve_animation_name<'a>(&'a self, requested: &'a str) -> Option<&'a str> {
        if self.animations.contains_key(requested) {
            return Some(requested);
        }
        [self.default_animation.as_str(), "default"]
            .into_iter()
            .find(|n| self.animations.contains_key(*n))
            .or_else(|| self.animation_names().first().copied())
    }

    /// Replace the asset-level child list and merge it into every
    /// animation: asset-level names first, then the animation's own.
    pub fn set_animation_children<S: AsRef<str>>(&mut self, names: &[S]) {
        self.animation_children = dedup(names.iter().map(AsRef::as_ref));
        for anim in self.animations.values_mut() {
            let merged = dedup(
                self.animation_children
                    .iter()
                    .chain(anim.child_assets().iter())
                    .map(String::as_str),
            );
            anim.set_child_names(&merged);
        }
    }

    /// Release every texture owned by this asset type.
    pub fn release_textures(&mut self, store: &mut TextureStore) {
        for anim in self.animations.values_mut() {
            clear_texture_cache(anim, store);
        }
        for light in &mut self.lights {
            if let Some(id) = light.texture.take() {
                store.release(id);
            }
        }
    }
}

fn dedup<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Directory holding an asset type's generated data.
pub fn asset_dir(root: &Path, asset: &str) -> PathBuf {
    root.join("cache").join(asset)
}

/// Build an animation's identity and playback flags from its payload.
///
/// Reserved names (`kill`, `lock`, `reverse`) are rejected.
pub fn parse_animation_header(name: &str, payload: &Value) -> AnimResult<Animation> {
    if is_reserved_animation_name(name) {
        return Err(AnimError::ReservedAnimationName {
            name: name.to_string(),
        });
    }
    let mut anim = Animation::new(name);
    if let Some(source) = field(payload, "source").filter(|s| s.is_object()) {
        anim.source.kind = SourceKind::parse(field_str(source, "kind").unwrap_or("folder"));
        anim.source.path = field_str(source, "path").unwrap_or_default().to_string();
        anim.source.name = field_str(source, "name").unwrap_or_default().to_string();
    }
    let derived = anim.source.kind == SourceKind::Animation;

    anim.flipped_source = field_bool(payload, "flipped_source", false);
    anim.flip_vertical_source = field_bool(payload, "flip_vertical_source", false);
    anim.flip_movement_horizontal = field_bool(payload, "flip_movement_horizontal", false);
    anim.flip_movement_vertical = field_bool(payload, "flip_movement_vertical", false);
    anim.reverse_source = field_bool(payload, "reverse_source", false);
    if derived {
        if let Some(m) = field(payload, "derived_modifiers").filter(|m| m.is_object()) {
            anim.reverse_source = field_bool(m, "reverse", anim.reverse_source);
            anim.flipped_source = field_bool(m, "flipX", anim.flipped_source);
            anim.flip_vertical_source = field_bool(m, "flipY", anim.flip_vertical_source);
            anim.flip_movement_horizontal =
                field_bool(m, "flipMovementX", anim.flip_movement_horizontal);
            anim.flip_movement_vertical = field_bool(m, "flipMovementY", anim.flip_movement_vertical);
        }
    } else {
        anim.flip_vertical_source = false;
        anim.flip_movement_horizontal = false;
        anim.flip_movement_vertical = false;
    }
    anim.inherit_source_movement = derived && field_bool(payload, "inherit_source_movement", true);

    apply_playback_flags(&mut anim, payload, false);
    Ok(anim)
}

/// `locked`, `loop`, `randomize`, `rnd_start` and `on_end`. With
/// `explicit_only`, keys missing from the payload leave the field alone.
fn apply_playback_flags(anim: &mut Animation, payload: &Value, explicit_only: bool) {
    let present = |key: &str| !explicit_only || field(payload, key).is_some();
    if present("locked") {
        anim.locked = field_bool(payload, "locked", false);
    }
    if present("loop") {
        anim.looped = field_bool(payload, "loop", true);
    }
    if present("randomize") {
        anim.randomize = field_bool(payload, "randomize", false);
    }
    if present("rnd_start") {
        anim.rnd_start = field_bool(payload, "rnd_start", false);
    }
    if present("on_end") {
        anim.on_end = classify_on_end(field_str(payload, "on_end").unwrap_or("default"));
    }
}

/// Read the `audio` object. A clip without a name keeps whatever clip the
/// animation already has (a derived animation's source clip) and only
/// adjusts its volume and bus.
fn apply_audio(anim: &mut Animation, payload: &Value, asset_dir: &Path) {
    let Some(audio) = field(payload, "audio").filter(|a| a.is_object()) else {
        return;
    };
    let clip_name = field_str(audio, "name").unwrap_or_default();
    if !clip_name.is_empty() {
        anim.audio = Some(AudioClip {
            name: clip_name.to_string(),
            path: asset_dir.join(format!("{}.wav", clip_name)),
            volume: 100,
            effects: false,
        });
    }
    if let Some(clip) = anim.audio.as_mut() {
        if field(audio, "volume").is_some() {
            clip.volume = field_int(audio, "volume", 100).clamp(0, 100) as u8;
        }
        clip.effects = field_bool(audio, "effects", clip.effects);
    }
}

/// Install the payload's document on a textured animation.
fn apply_document(anim: &mut Animation, payload: &Value, info: &AssetInfo) {
    let mut doc = AnimationDocument::parse(payload, &info.animation_children);
    if anim.inherit_source_movement && anim.frame_count() > 0 {
        doc.paths = anim.movement_paths().to_vec();
    }
    if doc.children.is_empty() && doc.child_timelines.is_none() {
        doc.children = anim.child_assets().to_vec();
    }
    let frame_count = anim.frame_cache().len();
    if frame_count > 0 {
        doc.fit_to_frame_count(frame_count);
    }
    doc.apply_to(anim);
}

/// Copy movement from the source for derived animations left without
/// frames (their source had nothing to clone when they were loaded).
pub fn resolve_inherited_movements(info: &mut AssetInfo) {
    let pending: Vec<(String, String)> = info
        .animations
        .iter()
        .filter(|(_, a)| {
            a.inherit_source_movement
                && a.source.kind == SourceKind::Animation
                && !a.source.name.is_empty()
                && a.movement_paths().iter().all(|p| p.is_empty())
        })
        .map(|(n, a)| (n.clone(), a.source.name.clone()))
        .collect();
    for (name, source_name) in pending {
        let Some(source) = info.animations.get(&source_name).cloned() else {
            continue;
        };
        if let Some(anim) = info.animations.get_mut(&name) {
            anim.inherit_movement_from(&source);
            anim.compute_totals();
        }
    }
}

/// Point on-end targets that name no animation back at the default
/// directive.
fn validate_on_end_targets(info: &mut AssetInfo) {
    let known: Vec<String> = info.animations.keys().cloned().collect();
    for anim in info.animations.values_mut() {
        let OnEndDirective::Animation(target) = &anim.on_end else {
            continue;
        };
        if is_reserved_animation_name(target) || !known.iter().any(|k| k == target) {
            log::warn!(
                "{}: on_end target '{}' is not a loaded animation, using default",
                anim.name,
                target
            );
            anim.on_end = OnEndDirective::Default;
        }
    }
}

fn load_light_textures<L: TextureLoader>(
    info: &mut AssetInfo,
    root: &Path,
    loader: &mut L,
    store: &mut TextureStore,
) {
    let dir = asset_dir(root, &info.name).join("lights");
    for (i, light) in info.lights.iter_mut().enumerate() {
        let path = dir.join(format!("light_{}.png", i));
        light.texture = loader.load_png(store, &path, true);
        if light.texture.is_none() {
            log::debug!("No light texture at {}", path.display());
        }
    }
}

/// Build an [`AssetInfo`] from an already parsed `info.json` object.
pub fn load_asset_info_from_value<L: TextureLoader>(
    root: &Path,
    asset: &str,
    data: &Value,
    loader: &mut L,
    store: &mut TextureStore,
) -> (AssetInfo, PartialLoad) {
    let mut info = AssetInfo::from_json(asset, data);
    let mut result = PartialLoad::default();
    let dir = asset_dir(root, asset);
    load_light_textures(&mut info, root, loader, store);

    let empty = Map::new();
    let payloads = field(data, "animations")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut derived: Vec<(Animation, &Value)> = Vec::new();
    for (name, payload) in payloads {
        let mut anim = match parse_animation_header(name, payload) {
            Ok(anim) => anim,
            Err(e) => {
                log::warn!("{}: skipping animation: {}", asset, e);
                continue;
            }
        };
        if anim.source.kind == SourceKind::Animation && !anim.source.name.is_empty() {
            derived.push((anim, payload));
            continue;
        }
        let layout = FrameLayout::from_info(root, &info);
        result.merge(load_folder_animation(&mut anim, &layout, loader, store));
        apply_audio(&mut anim, payload, &dir);
        apply_document(&mut anim, payload, &info);
        log::info!("{}::{} loaded {} frame(s)", asset, name, anim.frame_count());
        info.animations.insert(name.clone(), anim);
    }

    // Derived animations may chain; keep going while a round makes progress.
    while !derived.is_empty() {
        let before = derived.len();
        let mut waiting = Vec::new();
        for (mut anim, payload) in derived {
            let Some(source) = info.animations.get(&anim.source.name) else {
                waiting.push((anim, payload));
                continue;
            };
            let opts = CloneOptions::from_animation(&anim);
            match copy_from(source, &mut anim, &opts, info.smooth_scaling, loader, store) {
                Ok(load) => result.merge(load),
                Err(e) => log::warn!("{}::{} not copied: {}", asset, anim.name, e),
            }
            apply_playback_flags(&mut anim, payload, true);
            apply_audio(&mut anim, payload, &dir);
            apply_document(&mut anim, payload, &info);
            log::info!(
                "{}::{} derived from '{}' ({} frame(s))",
                asset,
                anim.name,
                anim.source.name,
                anim.frame_count()
            );
            info.animations.insert(anim.name.clone(), anim);
        }
        if waiting.len() == before {
            for (mut anim, payload) in waiting {
                log::warn!(
                    "{}::{} has no loadable source animation '{}'",
                    asset,
                    anim.name,
                    anim.source.name
                );
                apply_audio(&mut anim, payload, &dir);
                let doc = AnimationDocument::parse(payload, &info.animation_children);
                if payload.get("movement").is_some() || !anim.inherit_source_movement {
                    doc.apply_to(&mut anim);
                }
                info.animations.insert(anim.name.clone(), anim);
            }
            break;
        }
        derived = waiting;
    }

    resolve_inherited_movements(&mut info);
    validate_on_end_targets(&mut info);
    (info, result)
}

/// Read `root/cache/<asset>/info.json` and load everything it describes.
pub fn load_asset_info<L: TextureLoader>(
    root: &Path,
    asset: &str,
    loader: &mut L,
    store: &mut TextureStore,
) -> AnimResult<(AssetInfo, PartialLoad)> {
    let path = asset_dir(root, asset).join("info.json");
    let text = std::fs::read_to_string(&path)?;
    let data: Value = serde_json::from_str(&text)?;
    if !data.is_object() {
        return Err(AnimError::MalformedPayload {
            reason: format!("{} is not a JSON object", path.display()),
        });
    }
    Ok(load_asset_info_from_value(root, asset, &data, loader, store))
}

/// Load `asset` and every child asset it can attach, depth first.
///
/// Assets already in `animations` are not loaded twice. A child that fails
/// to load is logged and skipped; only a failure of `asset` itself is an
/// error. Returns the merged missing-variant report.
pub fn load_asset_tree<L: TextureLoader>(
    root: &Path,
    asset: &str,
    loader: &mut L,
    store: &mut TextureStore,
    animations: &mut AnimationStore,
) -> AnimResult<PartialLoad> {
    let mut result = PartialLoad::default();
    if animations.get(asset).is_some() {
        return Ok(result);
    }
    let (info, load) = load_asset_info(root, asset, loader, store)?;
    result.merge(load);

    let mut children: Vec<String> = info.animation_children.clone();
    for anim in info.animations.values() {
        for child in anim.child_assets() {
            if !children.contains(child) {
                children.push(child.clone());
            }
        }
    }
    animations.insert(info);

    for child in children {
        if child == asset {
            continue;
        }
        match load_asset_tree(root, &child, loader, store, animations) {
            Ok(load) => result.merge(load),
            Err(e) => log::warn!("{}: child asset '{}' not loaded: {}", asset, child, e),
        }
    }
    Ok(result)
}
