//! The `child_timelines` block.
//!
//! One entry per child asset:
//! `{child, child_index, asset, animation, mode, auto_start, frames}`.
//! `mode` is required. A block with an entry that has no mode or cannot be
//! tied to a child asset is rejected as a whole, and the caller keeps the
//! timelines it already had.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value, json};

use super::lenient::{field, field_str, json_bool};
use super::movement::RawChildSample;
use crate::animation::{Animation, AnimationChildData, AnimationChildFrameData, ChildTimelineMode};
use crate::error::AnimError;

/// Accepted timelines together with the (possibly extended) child names.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTimelines {
    pub child_names: Vec<String>,
    pub timelines: Vec<AnimationChildData>,
}

/// Parse one timeline sample; `None` when its rotation is not finite.
pub fn parse_timeline_sample(node: &Value, child_index: i32) -> Option<AnimationChildFrameData> {
    let raw = match node {
        Value::Object(_) => RawChildSample::from_object(node),
        Value::Array(items) => RawChildSample::from_array(items),
        _ => return Some(AnimationChildFrameData::hidden(child_index)),
    };
    raw.resolve(child_index)
}

fn child_index_field(node: &Value) -> Option<i64> {
    field(node, "child")
        .and_then(Value::as_i64)
        .or_else(|| field(node, "child_index").and_then(Value::as_i64))
}

/// Resolve a `child_timelines` block against `child_names`.
///
/// `previous` supplies settings for assets the block does not mention and
/// samples for timelines the block leaves empty. `frame_count` sizes
/// static timelines. Returns `None` when the block is missing or rejected.
pub fn resolve_child_timelines(
    node: Option<&Value>,
    child_names: &[String],
    previous: &[AnimationChildData],
    frame_count: usize,
) -> Option<ResolvedTimelines> {
    let entries = node?.as_array()?;

    let mut names = child_names.to_vec();
    let mut lookup: FxHashMap<String, usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), i))
        .collect();
    let previous_by_asset: FxHashMap<&str, &AnimationChildData> = previous
        .iter()
        .filter(|t| !t.asset_name.is_empty())
        .map(|t| (t.asset_name.as_str(), t))
        .collect();

    let mut parsed: FxHashMap<usize, AnimationChildData> = FxHashMap::default();
    let mut rejected = false;

    for entry in entries.iter().filter(|e| e.is_object()) {
        let mut index = child_index_field(entry)
            .filter(|&i| i >= 0 && (i as usize) < names.len())
            .map(|i| i as usize);
        if index.is_none() {
            if let Some(asset) = field_str(entry, "asset").filter(|a| !a.is_empty()) {
                index = Some(match lookup.get(asset) {
                    Some(&i) => i,
                    None => {
                        names.push(asset.to_string());
                        lookup.insert(asset.to_string(), names.len() - 1);
                        names.len() - 1
                    }
                });
            }
        }
        let Some(index) = index else {
            log::warn!("child timeline entry has no valid child index");
            rejected = true;
            continue;
        };

        let asset_name = names[index].clone();
        let Some(mode) = field_str(entry, "mode").and_then(ChildTimelineMode::parse) else {
            log::warn!(
                "child timeline for asset '{}' omitted required mode (static|async)",
                asset_name
            );
            rejected = true;
            continue;
        };

        let slot = index as i32;
        let frames = field(entry, "frames")
            .and_then(Value::as_array)
            .map(|samples| {
                samples
                    .iter()
                    .map(|s| {
                        parse_timeline_sample(s, slot)
                            .unwrap_or(AnimationChildFrameData::hidden(slot))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let auto_start_default = mode == ChildTimelineMode::Static;
        let auto_start = field(entry, "auto_start")
            .or_else(|| field(entry, "autostart"))
            .map_or(auto_start_default, |v| json_bool(v, auto_start_default));

        parsed.insert(
            index,
            AnimationChildData {
                name: field_str(entry, "name").unwrap_or_default().to_string(),
                asset_name,
                animation_override: field_str(entry, "animation")
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
                mode,
                auto_start,
                frames,
            },
        );
    }

    if names.is_empty() || rejected {
        return None;
    }

    let mut timelines = Vec::with_capacity(names.len());
    for (index, asset_name) in names.iter().enumerate() {
        let slot = index as i32;
        let from_block = parsed.remove(&index);
        let prev = previous_by_asset.get(asset_name.as_str()).copied();
        let (mut timeline, block_samples) = match (from_block, prev) {
            (Some(mut t), _) => {
                let samples = std::mem::take(&mut t.frames);
                (t, samples)
            }
            (None, Some(p)) => (
                AnimationChildData {
                    frames: Vec::new(),
                    ..p.clone()
                },
                Vec::new(),
            ),
            (None, None) => {
                log::warn!(
                    "child timeline for asset '{}' is missing and cannot be inferred",
                    asset_name
                );
                return None;
            }
        };
        timeline.asset_name = asset_name.clone();
        if let Some(p) = prev.filter(|_| timeline.name.is_empty()) {
            timeline.name = p.name.clone();
        }

        timeline.frames = if timeline.is_static() {
            let count = if frame_count > 0 {
                frame_count
            } else {
                prev.filter(|p| p.is_static() && !p.frames.is_empty())
                    .map_or(1, |p| p.frames.len())
            };
            let mut frames = vec![AnimationChildFrameData::hidden(slot); count];
            let source: &[AnimationChildFrameData] = if !block_samples.is_empty() {
                &block_samples
            } else {
                prev.filter(|p| p.is_static())
                    .map(|p| p.frames.as_slice())
                    .unwrap_or(&[])
            };
            for (dst, src) in frames.iter_mut().zip(source) {
                *dst = *src;
            }
            frames
        } else if !block_samples.is_empty() {
            block_samples
        } else if let Some(p) = prev.filter(|p| p.is_async() && !p.frames.is_empty()) {
            p.frames.clone()
        } else {
            vec![AnimationChildFrameData::hidden(slot)]
        };
        for sample in &mut timeline.frames {
            sample.child_index = slot;
        }
        timelines.push(timeline);
    }

    Some(ResolvedTimelines {
        child_names: names,
        timelines,
    })
}

/// Load the `child_timelines` block of `payload` onto `anim`.
///
/// Returns `false`, leaving `anim` untouched, when the block is missing or
/// rejected.
pub fn load_child_timelines(payload: &Value, anim: &mut Animation) -> bool {
    let resolved = resolve_child_timelines(
        field(payload, "child_timelines"),
        anim.child_assets(),
        anim.child_timelines(),
        anim.frame_count(),
    );
    match resolved {
        Some(r) => {
            anim.set_child_data(r.child_names, r.timelines);
            true
        }
        None => {
            if field(payload, "child_timelines").is_some() {
                log::warn!(
                    "{}",
                    AnimError::MalformedPayload {
                        reason: format!("child_timelines of '{}' rejected", anim.name),
                    }
                );
            }
            false
        }
    }
}

fn serialize_sample(sample: &AnimationChildFrameData) -> Value {
    json!({
        "dx": sample.dx,
        "dy": sample.dy,
        "degree": if sample.degree.is_finite() { sample.degree as f64 } else { 0.0 },
        "visible": sample.visible,
        "render_in_front": sample.render_in_front,
    })
}

/// One entry per child name, in child order.
pub fn serialize_child_timelines(child_names: &[String], timelines: &[AnimationChildData]) -> Value {
    let entries = child_names
        .iter()
        .enumerate()
        .map(|(index, asset)| {
            let timeline = timelines.iter().find(|t| &t.asset_name == asset);
            let mode = timeline.map_or(ChildTimelineMode::Static, |t| t.mode);
            let mut entry = Map::new();
            entry.insert("child".into(), json!(index));
            entry.insert("child_index".into(), json!(index));
            entry.insert("asset".into(), json!(asset));
            if let Some(name) = timeline.map(|t| t.name.as_str()).filter(|n| !n.is_empty()) {
                entry.insert("name".into(), json!(name));
            }
            entry.insert(
                "animation".into(),
                json!(
                    timeline
                        .and_then(|t| t.animation_override.as_deref())
                        .unwrap_or("")
                ),
            );
            entry.insert("mode".into(), json!(mode.as_str()));
            entry.insert(
                "auto_start".into(),
                json!(timeline.map_or(mode == ChildTimelineMode::Static, |t| t.auto_start)),
            );
            let frames: Vec<Value> = match timeline {
                Some(t) if !t.frames.is_empty() => t.frames.iter().map(serialize_sample).collect(),
                _ => vec![serialize_sample(&AnimationChildFrameData::hidden(index as i32))],
            };
            entry.insert("frames".into(), Value::Array(frames));
            Value::Object(entry)
        })
        .collect();
    Value::Array(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationFrame, MovementPath};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_static_timeline_sized_to_frames() {
        let block = json!([{
            "child": 0, "asset": "torch", "mode": "static",
            "frames": [{"dx": 3, "visible": true}]
        }]);
        let r = resolve_child_timelines(Some(&block), &names(&["torch"]), &[], 3).unwrap();
        let t = &r.timelines[0];
        assert_eq!(t.frames.len(), 3);
        assert_eq!(t.frames[0].dx, 3);
        assert!(t.frames[0].visible);
        assert!(!t.frames[1].visible);
        assert!(t.auto_start);
    }

    #[test]
    fn test_async_keeps_parsed_samples() {
        let block = json!([{
            "child_index": 0, "mode": "Asynchronous",
            "frames": [{"dx": 1}, {"dx": 2}, {"dx": 3}, {"dx": 4}]
        }]);
        let r = resolve_child_timelines(Some(&block), &names(&["spark"]), &[], 2).unwrap();
        assert!(r.timelines[0].is_async());
        assert_eq!(r.timelines[0].frames.len(), 4);
        assert!(!r.timelines[0].auto_start);
    }

    #[test]
    fn test_missing_mode_rejects_block() {
        let block = json!([
            {"child": 0, "mode": "static"},
            {"child": 1, "frames": []}
        ]);
        assert!(resolve_child_timelines(Some(&block), &names(&["a", "b"]), &[], 1).is_none());
    }

    #[test]
    fn test_unknown_asset_appended() {
        let block = json!([
            {"child": 0, "mode": "static"},
            {"asset": "cape", "mode": "async", "animation": "flap"}
        ]);
        let r = resolve_child_timelines(Some(&block), &names(&["hat"]), &[], 1).unwrap();
        assert_eq!(r.child_names, names(&["hat", "cape"]));
        assert_eq!(r.timelines[1].animation_override.as_deref(), Some("flap"));
        assert_eq!(r.timelines[1].frames[0].child_index, 1);
    }

    #[test]
    fn test_unmentioned_child_without_previous_rejects() {
        let block = json!([{"child": 0, "mode": "static"}]);
        assert!(resolve_child_timelines(Some(&block), &names(&["a", "b"]), &[], 1).is_none());
    }

    #[test]
    fn test_unmentioned_child_inherits_previous() {
        let mut prev = AnimationChildData::new("b", ChildTimelineMode::Async);
        prev.frames = vec![AnimationChildFrameData::default(); 5];
        let block = json!([{"child": 0, "mode": "static"}]);
        let r = resolve_child_timelines(Some(&block), &names(&["a", "b"]), &[prev], 2).unwrap();
        assert!(r.timelines[1].is_async());
        assert_eq!(r.timelines[1].frames.len(), 5);
        assert_eq!(r.timelines[1].frames[0].child_index, 1);
    }

    #[test]
    fn test_load_rejected_keeps_previous_async() {
        let mut anim = Animation::new("swing");
        anim.set_movement_paths(vec![MovementPath::new(vec![AnimationFrame::default(); 2])]);
        anim.set_child_names(&["spark"]);
        {
            let t = anim.find_child_timeline_mut("spark").unwrap();
            t.mode = ChildTimelineMode::Async;
            t.frames = vec![AnimationChildFrameData::hidden(0); 6];
        }
        let payload = json!({"child_timelines": [{"child": 0, "frames": []}]});
        assert!(!load_child_timelines(&payload, &mut anim));
        let t = anim.find_child_timeline("spark").unwrap();
        assert!(t.is_async());
        assert_eq!(t.frames.len(), 6);
    }

    #[test]
    fn test_serialize_then_resolve() {
        let mut t = AnimationChildData::new("torch", ChildTimelineMode::Static);
        t.frames = vec![
            AnimationChildFrameData {
                child_index: 0,
                dx: 4,
                dy: -2,
                degree: 12.5,
                visible: true,
                render_in_front: false,
            },
            AnimationChildFrameData::hidden(0),
        ];
        let child_names = names(&["torch"]);
        let block = serialize_child_timelines(&child_names, std::slice::from_ref(&t));
        assert_eq!(block[0]["mode"], json!("static"));
        let r = resolve_child_timelines(Some(&block), &child_names, &[], 2).unwrap();
        assert_eq!(r.timelines[0], t);
    }
}
