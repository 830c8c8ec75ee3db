//! `hit_geometry` and `attack_geometry` arrays.
//!
//! Both hold one entry per parent frame, keyed by damage type.

use serde_json::{Map, Value, json};

use super::lenient::{field, field_float, field_int, json_float, json_int};
use crate::animation::{AttackVector, DamageType, FrameAttackGeometry, FrameHitGeometry, HitBox};

fn typed(node: &Value, fallback: DamageType) -> DamageType {
    field(node, "type")
        .and_then(Value::as_str)
        .and_then(DamageType::parse)
        .unwrap_or(fallback)
}

/// One hit box. Empty or non-finite boxes are dropped.
fn parse_hit_box(damage_type: DamageType, node: &Value) -> Option<HitBox> {
    let hit = match node {
        Value::Object(_) => HitBox {
            damage_type: typed(node, damage_type),
            center_x: field_float(node, "center_x", 0.0),
            center_y: field_float(node, "center_y", 0.0),
            half_width: field_float(node, "half_width", 0.0),
            half_height: field_float(node, "half_height", 0.0),
            rotation_degrees: field(node, "rotation")
                .or_else(|| field(node, "rotation_degrees"))
                .map_or(0.0, |v| json_float(v, 0.0)),
        },
        Value::Array(items) => {
            // A literal `false` in the fifth slot disables the legacy box.
            if matches!(items.get(4), Some(Value::Bool(false))) {
                return None;
            }
            let at = |i: usize| items.get(i).map_or(0.0, |v| json_float(v, 0.0));
            let rotation = match (items.get(4), items.get(5)) {
                (Some(v), _) if v.is_number() => json_float(v, 0.0),
                (_, Some(v)) if v.is_number() => json_float(v, 0.0),
                _ => 0.0,
            };
            HitBox {
                damage_type,
                center_x: at(0),
                center_y: at(1),
                half_width: at(2),
                half_height: at(3),
                rotation_degrees: rotation,
            }
        }
        _ => return None,
    };
    (!hit.is_empty() && hit.is_finite()).then_some(hit)
}

/// One frame's hit geometry. The legacy bare-box form is typed melee.
pub fn parse_hit_entry(entry: &Value) -> FrameHitGeometry {
    let mut geometry = FrameHitGeometry::default();
    match entry {
        Value::Object(map) => {
            for damage_type in DamageType::ALL {
                if let Some(hit) = map
                    .get(damage_type.as_str())
                    .and_then(|node| parse_hit_box(damage_type, node))
                {
                    geometry.upsert(hit);
                }
            }
        }
        Value::Null => {}
        other => {
            if let Some(hit) = parse_hit_box(DamageType::Melee, other) {
                geometry.upsert(hit);
            }
        }
    }
    geometry
}

fn parse_attack_vector(damage_type: DamageType, node: &Value) -> Option<AttackVector> {
    let vector = match node {
        Value::Object(_) => {
            let start = (
                field_float(node, "start_x", 0.0),
                field_float(node, "start_y", 0.0),
            );
            let end = (
                field_float(node, "end_x", 0.0),
                field_float(node, "end_y", 0.0),
            );
            let damage = field_int(node, "damage", 0);
            let mut v = AttackVector::segment(typed(node, damage_type), start, end, damage);
            if field(node, "control_x").is_some() || field(node, "control_y").is_some() {
                v.control_x = field_float(node, "control_x", start.0);
                v.control_y = field_float(node, "control_y", start.1);
            }
            v
        }
        Value::Array(items) => {
            let at = |i: usize| items.get(i).map_or(0.0, |v| json_float(v, 0.0));
            let damage = items.get(4).map_or(0, |v| json_int(v, 0));
            AttackVector::segment(damage_type, (at(0), at(1)), (at(2), at(3)), damage)
        }
        _ => return None,
    };
    vector.is_finite().then_some(vector)
}

/// One frame's attack geometry. Only the keyed object form is accepted.
pub fn parse_attack_entry(entry: &Value) -> FrameAttackGeometry {
    let mut geometry = FrameAttackGeometry::default();
    let Some(map) = entry.as_object() else {
        return geometry;
    };
    for damage_type in DamageType::ALL {
        let Some(list) = map.get(damage_type.as_str()).and_then(Value::as_array) else {
            continue;
        };
        for node in list {
            if let Some(v) = parse_attack_vector(damage_type, node) {
                geometry.push(v);
            }
        }
    }
    geometry
}

/// Every damage type gets a key: the box, or `null` when there is none to
/// store.
pub fn serialize_hit_entry(geometry: &FrameHitGeometry) -> Value {
    let mut out = Map::new();
    for damage_type in DamageType::ALL {
        let value = match geometry.get(damage_type) {
            Some(hit) if !hit.is_empty() && hit.is_finite() => json!({
                "center_x": hit.center_x,
                "center_y": hit.center_y,
                "half_width": hit.half_width,
                "half_height": hit.half_height,
                "rotation": hit.rotation_degrees,
                "type": damage_type.as_str(),
            }),
            _ => Value::Null,
        };
        out.insert(damage_type.as_str().to_string(), value);
    }
    Value::Object(out)
}

pub fn serialize_attack_entry(geometry: &FrameAttackGeometry) -> Value {
    let mut out = Map::new();
    for damage_type in DamageType::ALL {
        let vectors: Vec<Value> = geometry
            .of_type(damage_type)
            .filter(|v| v.is_finite())
            .map(|v| {
                json!({
                    "start_x": v.start_x,
                    "start_y": v.start_y,
                    "control_x": v.control_x,
                    "control_y": v.control_y,
                    "end_x": v.end_x,
                    "end_y": v.end_y,
                    "damage": v.damage,
                    "type": damage_type.as_str(),
                })
            })
            .collect();
        out.insert(damage_type.as_str().to_string(), Value::Array(vectors));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_hit_boxes() {
        let entry = json!({
            "melee": {"center_x": 1, "center_y": -20, "half_width": 8, "half_height": 12, "rotation": 15},
            "projectile": null,
            "explosion": {"center_x": 0, "center_y": 0, "half_width": 0, "half_height": 4}
        });
        let g = parse_hit_entry(&entry);
        assert_eq!(g.iter().count(), 1);
        let melee = g.get(DamageType::Melee).unwrap();
        assert_eq!(melee.center_y, -20.0);
        assert_eq!(melee.rotation_degrees, 15.0);
    }

    #[test]
    fn test_legacy_hit_box_is_melee() {
        let g = parse_hit_entry(&json!([2, 3, 4, 5, 30]));
        let b = g.get(DamageType::Melee).unwrap();
        assert_eq!((b.center_x, b.half_height, b.rotation_degrees), (2.0, 5.0, 30.0));
        assert!(parse_hit_entry(&json!([2, 3, 4, 5, false])).is_empty());
    }

    #[test]
    fn test_non_finite_hit_box_dropped() {
        let entry = json!({"melee": {"center_x": "inf", "half_width": 2, "half_height": 2}});
        assert!(parse_hit_entry(&entry).is_empty());
    }

    #[test]
    fn test_attack_vectors() {
        let entry = json!({
            "melee": [
                {"start_x": 0, "start_y": 0, "end_x": 10, "end_y": 0, "damage": 4},
                {"start_x": 0, "start_y": 0, "control_x": 5, "control_y": -5, "end_x": 10, "end_y": 0, "damage": 2},
                [0, 0, 4, 8, 1]
            ],
            "explosion": "nope"
        });
        let g = parse_attack_entry(&entry);
        let melee: Vec<_> = g.of_type(DamageType::Melee).collect();
        assert_eq!(melee.len(), 3);
        assert_eq!((melee[0].control_x, melee[0].damage), (5.0, 4));
        assert_eq!(melee[1].control_y, -5.0);
        assert_eq!((melee[2].control_x, melee[2].control_y), (2.0, 4.0));
        assert!(parse_attack_entry(&json!([[0, 0, 1, 1]])).is_empty());
    }

    #[test]
    fn test_serialize_hit_writes_null_for_missing() {
        let mut g = FrameHitGeometry::default();
        g.upsert(HitBox {
            damage_type: DamageType::Projectile,
            center_x: 1.0,
            center_y: 2.0,
            half_width: 3.0,
            half_height: 4.0,
            rotation_degrees: 0.0,
        });
        let v = serialize_hit_entry(&g);
        assert!(v["melee"].is_null());
        assert_eq!(v["projectile"]["half_height"], json!(4.0));
        assert_eq!(parse_hit_entry(&v), g);
    }

    #[test]
    fn test_serialize_attack_skips_non_finite() {
        let mut g = FrameAttackGeometry::default();
        g.push(AttackVector::segment(DamageType::Melee, (0.0, 0.0), (f32::NAN, 1.0), 1));
        g.push(AttackVector::segment(DamageType::Melee, (0.0, 0.0), (2.0, 1.0), 1));
        let v = serialize_attack_entry(&g);
        assert_eq!(v["melee"].as_array().unwrap().len(), 1);
        assert_eq!(v["projectile"], json!([]));
    }
}
