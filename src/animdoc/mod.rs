//! Animation documents.
//!
//! An animation document is the JSON object that carries one animation's
//! authored data: the child-asset names, one `movement` entry per frame,
//! matching `hit_geometry` and `attack_geometry` arrays, optional extra
//! `movement_paths`, and the `child_timelines` block. Keys this module does
//! not interpret (playback flags, source, audio, ...) are kept verbatim so a
//! document survives a load/save cycle.
//!
//! Parsing never fails on shape: unusable entries are skipped with a
//! warning, and a payload that is not an object yields a one-frame default
//! document.
//!
//! # Related
//!
//! - [`crate::loader::assetinfo`] – reads the playback keys from the same object
//! - [`crate::animation::Animation`] – what a document is applied to

pub mod geometry;
pub mod lenient;
pub mod movement;
pub mod timelines;

use std::path::Path;

use serde_json::{Map, Value};

use crate::animation::{
    Animation, AnimationChildData, AnimationChildFrameData, AnimationFrame, MovementPath,
};
use crate::error::{AnimError, AnimResult};
use geometry::{parse_attack_entry, parse_hit_entry, serialize_attack_entry, serialize_hit_entry};
use movement::{parse_movement, serialize_movement};
use timelines::{resolve_child_timelines, serialize_child_timelines};

/// Keys owned by the document model; everything else is passed through.
const DOCUMENT_KEYS: [&str; 6] = [
    "children",
    "movement",
    "movement_paths",
    "hit_geometry",
    "attack_geometry",
    "child_timelines",
];

/// Parsed form of one animation's JSON payload.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationDocument {
    pub children: Vec<String>,
    /// Path 0 is the primary path. Hit and attack geometry live on its frames.
    pub paths: Vec<MovementPath>,
    /// `None` when the payload had no usable `child_timelines` block.
    pub child_timelines: Option<Vec<AnimationChildData>>,
    /// Untouched keys.
    pub extra: Map<String, Value>,
}

impl Default for AnimationDocument {
    /// One still frame, no children.
    fn default() -> Self {
        Self {
            children: Vec::new(),
            paths: vec![MovementPath::new(vec![AnimationFrame::with_delta(0, 0)])],
            child_timelines: None,
            extra: Map::new(),
        }
    }
}

fn dedup_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

impl AnimationDocument {
    /// Parse a payload. `asset_children`, when not empty, replaces the
    /// document's own `children` list.
    pub fn parse(payload: &Value, asset_children: &[String]) -> Self {
        let Some(object) = payload.as_object() else {
            log::warn!(
                "{}",
                AnimError::MalformedPayload {
                    reason: "animation payload is not an object".to_string(),
                }
            );
            return Self::default();
        };

        let children = if asset_children.is_empty() {
            object
                .get("children")
                .and_then(Value::as_array)
                .map(|list| dedup_names(list.iter().filter_map(Value::as_str)))
                .unwrap_or_default()
        } else {
            dedup_names(asset_children.iter().map(String::as_str))
        };
        let child_count = children.len();

        let mut paths: Vec<MovementPath> = object
            .get("movement_paths")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .map(|p| MovementPath::new(parse_movement(p, child_count)))
                    .collect()
            })
            .unwrap_or_default();
        let primary = object
            .get("movement")
            .map(|m| parse_movement(m, child_count))
            .unwrap_or_default();
        if !primary.is_empty() {
            paths.insert(0, MovementPath::new(primary));
        }
        if paths.is_empty() {
            paths.push(MovementPath::default());
        }

        let hit = object.get("hit_geometry").and_then(Value::as_array);
        let attack = object.get("attack_geometry").and_then(Value::as_array);
        for path in &mut paths {
            for (i, frame) in path.frames.iter_mut().enumerate() {
                if let Some(entry) = hit.and_then(|h| h.get(i)) {
                    frame.hit_geometry = parse_hit_entry(entry);
                }
                if let Some(entry) = attack.and_then(|a| a.get(i)) {
                    frame.attack_geometry = parse_attack_entry(entry);
                }
            }
        }

        let frame_count = paths[0].len();
        let (children, child_timelines) =
            match resolve_child_timelines(object.get("child_timelines"), &children, &[], frame_count) {
                Some(resolved) => (resolved.child_names, Some(resolved.timelines)),
                None => (children, None),
            };

        let extra = object
            .iter()
            .filter(|(k, _)| !DOCUMENT_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            children,
            paths,
            child_timelines,
            extra,
        }
    }

    /// Parse JSON text. Only syntax errors are reported.
    pub fn parse_str(text: &str, asset_children: &[String]) -> AnimResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::parse(&value, asset_children))
    }

    pub fn load_from_file(path: &Path) -> AnimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_str(&text, &[])
    }

    pub fn save_to_file(&self, path: &Path) -> AnimResult<()> {
        let text = serde_json::to_string_pretty(&self.to_value()).map_err(|e| {
            AnimError::SaveFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        std::fs::write(path, text).map_err(|e| AnimError::SaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Capture an animation's authored data.
    pub fn from_animation(anim: &Animation) -> Self {
        let paths = anim
            .movement_paths()
            .iter()
            .map(|p| {
                let mut p = p.clone();
                for frame in &mut p.frames {
                    frame.variants.clear();
                    frame.child_start_events.clear();
                }
                p
            })
            .collect();
        let has_children = anim.has_child_assets();
        Self {
            children: anim.child_assets().to_vec(),
            paths,
            child_timelines: has_children.then(|| anim.child_timelines().to_vec()),
            extra: Map::new(),
        }
    }

    /// Install paths, child names and timelines on `anim`.
    ///
    /// Without a timeline block the animation rebuilds its timelines from
    /// the frames' child samples, keeping what it had per asset.
    pub fn apply_to(&self, anim: &mut Animation) {
        anim.set_movement_paths(self.paths.clone());
        match &self.child_timelines {
            Some(timelines) => anim.set_child_data(self.children.clone(), timelines.clone()),
            None => anim.set_child_names(&self.children),
        }
        anim.compute_totals();
    }

    /// Resize every path to `frame_count` frames and keep static timelines
    /// parallel to them. Added frames are still; added samples are hidden.
    pub fn fit_to_frame_count(&mut self, frame_count: usize) {
        for path in &mut self.paths {
            path.resize(frame_count);
        }
        if let Some(timelines) = &mut self.child_timelines {
            for (slot, timeline) in timelines.iter_mut().enumerate() {
                if timeline.is_static() {
                    timeline
                        .frames
                        .resize(frame_count, AnimationChildFrameData::hidden(slot as i32));
                }
            }
        }
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        self.paths.first().map(|p| p.frames.as_slice()).unwrap_or(&[])
    }

    pub fn frame_count(&self) -> usize {
        self.frames().len()
    }

    /// Write the document back out. `children` and `child_timelines` are
    /// omitted when there are no child assets.
    pub fn to_value(&self) -> Value {
        let mut out = self.extra.clone();
        let child_count = self.children.len();
        let frames = self.frames();

        if child_count > 0 {
            out.insert(
                "children".into(),
                Value::Array(self.children.iter().cloned().map(Value::String).collect()),
            );
        }
        out.insert("movement".into(), serialize_movement(frames, child_count));
        if self.paths.len() > 1 {
            out.insert(
                "movement_paths".into(),
                Value::Array(
                    self.paths[1..]
                        .iter()
                        .map(|p| serialize_movement(&p.frames, child_count))
                        .collect(),
                ),
            );
        }
        out.insert(
            "hit_geometry".into(),
            Value::Array(frames.iter().map(|f| serialize_hit_entry(&f.hit_geometry)).collect()),
        );
        out.insert(
            "attack_geometry".into(),
            Value::Array(
                frames
                    .iter()
                    .map(|f| serialize_attack_entry(&f.attack_geometry))
                    .collect(),
            ),
        );
        if child_count > 0 {
            let timelines = self.child_timelines.as_deref().unwrap_or(&[]);
            out.insert(
                "child_timelines".into(),
                serialize_child_timelines(&self.children, timelines),
            );
        }
        Value::Object(out)
    }
}
