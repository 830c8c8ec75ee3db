//! The `movement` array: per-frame deltas, tint and child samples.
//!
//! Array form: `[dx, dy, resort_z?, rgb?, children?]`. The child list sits
//! at index 4, at index 3 when that slot is not a colour, or at index 2
//! when it is an array. Object form: `{dx, dy, resort_z, rgb, children}`.

use serde_json::{Value, json};

use super::lenient::{field, field_bool, field_int, json_bool, json_float, json_int};
use crate::animation::{AnimationChildFrameData, AnimationFrame};
use crate::types::Rgba;

/// A child sample as written, before defaults are applied.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawChildSample {
    pub child_index: Option<i32>,
    pub dx: Option<i32>,
    pub dy: Option<i32>,
    pub degree: Option<f32>,
    pub visible: Option<bool>,
    pub render_in_front: Option<bool>,
}

impl RawChildSample {
    /// `[child_index, dx, dy, degree, visible, render_in_front]`.
    pub fn from_indexed_array(items: &[Value]) -> Self {
        let mut raw = RawChildSample::default();
        if let Some(v) = items.first() {
            raw.child_index = Some(json_int(v, -1));
        }
        raw.read_tail(&items[items.len().min(1)..]);
        raw
    }

    /// `[dx, dy, degree, visible, render_in_front]`, the timeline form.
    pub fn from_array(items: &[Value]) -> Self {
        let mut raw = RawChildSample::default();
        raw.read_tail(items);
        raw
    }

    fn read_tail(&mut self, items: &[Value]) {
        if let Some(v) = items.first().filter(|v| v.is_number()) {
            self.dx = Some(json_int(v, 0));
        }
        if let Some(v) = items.get(1).filter(|v| v.is_number()) {
            self.dy = Some(json_int(v, 0));
        }
        if let Some(v) = items.get(2).filter(|v| v.is_number()) {
            self.degree = Some(json_float(v, 0.0));
        }
        if let Some(v) = items.get(3).filter(|v| !v.is_null()) {
            self.visible = Some(json_bool(v, true));
        }
        if let Some(v) = items.get(4).filter(|v| !v.is_null()) {
            self.render_in_front = Some(json_bool(v, true));
        }
    }

    /// Object form; `rotation` and `front` are accepted aliases.
    pub fn from_object(node: &Value) -> Self {
        let degree = field(node, "degree")
            .or_else(|| field(node, "rotation"))
            .map(|v| json_float(v, 0.0));
        RawChildSample {
            child_index: field(node, "child_index").map(|v| json_int(v, -1)),
            dx: field(node, "dx").map(|v| json_int(v, 0)),
            dy: field(node, "dy").map(|v| json_int(v, 0)),
            degree,
            visible: field(node, "visible")
                .filter(|v| !v.is_null())
                .map(|v| json_bool(v, true)),
            render_in_front: field(node, "render_in_front")
                .or_else(|| field(node, "front"))
                .filter(|v| !v.is_null())
                .map(|v| json_bool(v, true)),
        }
    }

    /// Fill in defaults. Missing `visible` and `render_in_front` are true,
    /// everything else zero. `None` when the rotation is not finite.
    pub fn resolve(self, child_index: i32) -> Option<AnimationChildFrameData> {
        let degree = self.degree.unwrap_or(0.0);
        if !degree.is_finite() {
            return None;
        }
        Some(AnimationChildFrameData {
            child_index,
            dx: self.dx.unwrap_or(0),
            dy: self.dy.unwrap_or(0),
            degree,
            visible: self.visible.unwrap_or(true),
            render_in_front: self.render_in_front.unwrap_or(true),
        })
    }
}

fn parse_child_entries(list: &[Value], child_count: usize) -> Vec<AnimationChildFrameData> {
    let mut out = Vec::new();
    for entry in list {
        let raw = match entry {
            Value::Array(items) if !items.is_empty() => RawChildSample::from_indexed_array(items),
            Value::Object(_) => RawChildSample::from_object(entry),
            _ => continue,
        };
        let index = raw.child_index.unwrap_or(-1);
        if index < 0 || index as usize >= child_count {
            log::warn!(
                "Ignoring child entry with invalid index {} for {} child asset(s)",
                index,
                child_count
            );
            continue;
        }
        match raw.resolve(index) {
            Some(sample) => out.push(sample),
            None => log::warn!("Dropping child entry {} with non-finite rotation", index),
        }
    }
    out
}

fn parse_rgb(value: &Value) -> Option<Rgba> {
    let items = value.as_array()?;
    if items.len() != 3 || !items.iter().all(Value::is_number) {
        return None;
    }
    let channel = |v: &Value| json_int(v, 255).clamp(0, 255) as u8;
    Some(Rgba::rgb(
        channel(&items[0]),
        channel(&items[1]),
        channel(&items[2]),
    ))
}

/// Parse one movement entry. `None` for entries that are not frames.
pub fn parse_movement_entry(entry: &Value, child_count: usize) -> Option<AnimationFrame> {
    let mut frame = AnimationFrame::default();
    match entry {
        Value::Object(_) => {
            frame.dx = field_int(entry, "dx", 0);
            frame.dy = field_int(entry, "dy", 0);
            frame.z_resort = field_bool(entry, "resort_z", false);
            if let Some(rgb) = field(entry, "rgb").and_then(parse_rgb) {
                frame.rgb = rgb;
            }
            if let Some(list) = field(entry, "children").and_then(Value::as_array) {
                frame.children = parse_child_entries(list, child_count);
            }
        }
        Value::Array(items) if items.len() >= 2 => {
            frame.dx = json_int(&items[0], 0);
            frame.dy = json_int(&items[1], 0);
            if let Some(Value::Bool(resort)) = items.get(2) {
                frame.z_resort = *resort;
            }
            let rgb = items.get(3).and_then(parse_rgb);
            if let Some(rgb) = rgb {
                frame.rgb = rgb;
            }
            let children = match (items.get(4), items.get(3), items.get(2)) {
                (Some(Value::Array(list)), _, _) => Some(list),
                (_, Some(Value::Array(list)), _) if rgb.is_none() => Some(list),
                (_, _, Some(Value::Array(list))) => Some(list),
                _ => None,
            };
            if let Some(list) = children {
                frame.children = parse_child_entries(list, child_count);
            }
        }
        _ => return None,
    }
    Some(frame)
}

/// Parse a whole movement sequence, skipping unusable entries.
pub fn parse_movement(value: &Value, child_count: usize) -> Vec<AnimationFrame> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| parse_movement_entry(e, child_count))
                .collect()
        })
        .unwrap_or_default()
}

/// `[dx, dy, resort_z]`, then the tint when it is not white, then the
/// child list when the animation has child assets.
pub fn serialize_movement_entry(frame: &AnimationFrame, child_count: usize) -> Value {
    let mut entry = vec![json!(frame.dx), json!(frame.dy), json!(frame.z_resort)];
    if !frame.rgb.is_white() {
        entry.push(json!([frame.rgb.r, frame.rgb.g, frame.rgb.b]));
    }
    if child_count > 0 {
        while entry.len() < 4 {
            entry.push(Value::Null);
        }
        let children: Vec<Value> = frame
            .children
            .iter()
            .filter(|c| c.child_index >= 0 && (c.child_index as usize) < child_count)
            .filter(|c| c.degree.is_finite())
            .map(|c| {
                json!([
                    c.child_index,
                    c.dx,
                    c.dy,
                    c.degree as f64,
                    c.visible,
                    c.render_in_front
                ])
            })
            .collect();
        entry.push(Value::Array(children));
    }
    Value::Array(entry)
}

/// An empty sequence is written as `[[0, 0]]`.
pub fn serialize_movement(frames: &[AnimationFrame], child_count: usize) -> Value {
    if frames.is_empty() {
        return json!([[0, 0]]);
    }
    Value::Array(
        frames
            .iter()
            .map(|f| serialize_movement_entry(f, child_count))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_sample_without_visible_is_visible() {
        let entry = json!([0, 0, false, [255, 255, 255], [[0, 12, -3, 15.0]]]);
        let frame = parse_movement_entry(&entry, 1).unwrap();
        assert!(!frame.z_resort);
        assert_eq!(frame.rgb, Rgba::WHITE);
        assert_eq!(
            frame.children,
            vec![AnimationChildFrameData {
                child_index: 0,
                dx: 12,
                dy: -3,
                degree: 15.0,
                visible: true,
                render_in_front: true,
            }]
        );
    }

    #[test]
    fn test_children_at_index_three_without_colour() {
        let entry = json!([1, 2, true, [[0, 4, 5, 0.0, false, false]]]);
        let frame = parse_movement_entry(&entry, 1).unwrap();
        assert_eq!(frame.children.len(), 1);
        assert!(!frame.children[0].visible);
        assert!(!frame.children[0].render_in_front);
    }

    #[test]
    fn test_children_at_index_two() {
        let entry = json!([1, 2, [[0, 4, 5]]]);
        let frame = parse_movement_entry(&entry, 1).unwrap();
        assert!(frame.z_resort);
        assert_eq!(frame.children[0].dx, 4);
    }

    #[test]
    fn test_out_of_range_child_skipped() {
        let entry = json!([0, 0, true, null, [[3, 1, 1], [-1, 0, 0], [0, 1, 1]]]);
        let frame = parse_movement_entry(&entry, 1).unwrap();
        assert_eq!(frame.children.len(), 1);
        assert_eq!(frame.children[0].child_index, 0);
    }

    #[test]
    fn test_object_form_and_aliases() {
        let entry = json!({
            "dx": "3", "dy": -1, "rgb": [10, 300, -5],
            "children": [{"child_index": 0, "rotation": 45, "front": false}]
        });
        let frame = parse_movement_entry(&entry, 1).unwrap();
        assert_eq!((frame.dx, frame.dy), (3, -1));
        assert!(!frame.z_resort);
        assert_eq!(frame.rgb, Rgba::rgb(10, 255, 0));
        assert_eq!(frame.children[0].degree, 45.0);
        assert!(!frame.children[0].render_in_front);
        assert!(frame.children[0].visible);
    }

    #[test]
    fn test_short_entries_skipped() {
        let frames = parse_movement(&json!([[1], "x", [2, 3]]), 0);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].dx, 2);
    }

    #[test]
    fn test_non_finite_rotation_dropped() {
        let entry = json!([0, 0, true, null, [{"child_index": 0, "degree": "NaN"}]]);
        let frame = parse_movement_entry(&entry, 1).unwrap();
        assert!(frame.children.is_empty());
    }

    #[test]
    fn test_serialize_pads_before_children() {
        let mut frame = AnimationFrame::with_delta(2, -1);
        frame.children.push(AnimationChildFrameData {
            child_index: 0,
            dx: 1,
            dy: 2,
            degree: 15.0,
            visible: false,
            render_in_front: true,
        });
        let v = serialize_movement_entry(&frame, 1);
        assert_eq!(v, json!([2, -1, true, null, [[0, 1, 2, 15.0, false, true]]]));
        assert_eq!(parse_movement_entry(&v, 1).unwrap().children, frame.children);
    }

    #[test]
    fn test_serialize_tint_and_empty() {
        let mut frame = AnimationFrame::default();
        frame.rgb = Rgba::rgb(1, 2, 3);
        assert_eq!(serialize_movement_entry(&frame, 0), json!([0, 0, true, [1, 2, 3]]));
        assert_eq!(serialize_movement(&[], 0), json!([[0, 0]]));
    }
}
