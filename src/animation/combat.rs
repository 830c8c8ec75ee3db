//! Per-frame hit and attack geometry.
//!
//! Hit boxes say where a frame can be hit, one optional box per damage
//! type. Attack vectors are quadratic Bezier curves along which the frame
//! deals damage; a frame may hold any number of them per type.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// The closed set of damage types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Projectile,
    Melee,
    Explosion,
}

impl DamageType {
    pub const ALL: [DamageType; 3] = [
        DamageType::Projectile,
        DamageType::Melee,
        DamageType::Explosion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageType::Projectile => "projectile",
            DamageType::Melee => "melee",
            DamageType::Explosion => "explosion",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "projectile" => Some(DamageType::Projectile),
            "melee" => Some(DamageType::Melee),
            "explosion" => Some(DamageType::Explosion),
            _ => None,
        }
    }
}

/// Rotated rectangle in asset-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitBox {
    pub damage_type: DamageType,
    pub center_x: f32,
    pub center_y: f32,
    pub half_width: f32,
    pub half_height: f32,
    pub rotation_degrees: f32,
}

impl HitBox {
    /// A box with a non-positive half extent covers nothing.
    pub fn is_empty(&self) -> bool {
        self.half_width <= 0.0 || self.half_height <= 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.center_x.is_finite()
            && self.center_y.is_finite()
            && self.half_width.is_finite()
            && self.half_height.is_finite()
            && self.rotation_degrees.is_finite()
    }
}

/// Hit boxes of one frame, at most one per damage type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameHitGeometry {
    boxes: ArrayVec<HitBox, 3>,
}

impl FrameHitGeometry {
    /// Insert or replace the box for `hit.damage_type`.
    pub fn upsert(&mut self, hit: HitBox) {
        if let Some(existing) = self
            .boxes
            .iter_mut()
            .find(|b| b.damage_type == hit.damage_type)
        {
            *existing = hit;
        } else {
            self.boxes.push(hit);
        }
    }

    pub fn get(&self, damage_type: DamageType) -> Option<&HitBox> {
        self.boxes.iter().find(|b| b.damage_type == damage_type)
    }

    pub fn remove(&mut self, damage_type: DamageType) {
        self.boxes.retain(|b| b.damage_type != damage_type);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitBox> {
        self.boxes.iter()
    }

    /// True when no box would be stored on disk.
    pub fn is_empty(&self) -> bool {
        self.boxes.iter().all(|b| b.is_empty())
    }
}

/// Quadratic Bezier attack curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackVector {
    pub damage_type: DamageType,
    pub start_x: f32,
    pub start_y: f32,
    pub control_x: f32,
    pub control_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub damage: i32,
}

impl AttackVector {
    /// Straight segment: the control point sits on the midpoint.
    pub fn segment(
        damage_type: DamageType,
        start: (f32, f32),
        end: (f32, f32),
        damage: i32,
    ) -> Self {
        Self {
            damage_type,
            start_x: start.0,
            start_y: start.1,
            control_x: 0.5 * (start.0 + end.0),
            control_y: 0.5 * (start.1 + end.1),
            end_x: end.0,
            end_y: end.1,
            damage,
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.start_x,
            self.start_y,
            self.control_x,
            self.control_y,
            self.end_x,
            self.end_y,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Attack curves of one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameAttackGeometry {
    pub vectors: Vec<AttackVector>,
}

impl FrameAttackGeometry {
    pub fn push(&mut self, vector: AttackVector) {
        self.vectors.push(vector);
    }

    pub fn of_type(&self, damage_type: DamageType) -> impl Iterator<Item = &AttackVector> {
        self.vectors
            .iter()
            .filter(move |v| v.damage_type == damage_type)
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(t: DamageType, hw: f32) -> HitBox {
        HitBox {
            damage_type: t,
            center_x: 0.0,
            center_y: -10.0,
            half_width: hw,
            half_height: 4.0,
            rotation_degrees: 0.0,
        }
    }

    #[test]
    fn test_upsert_replaces_same_type() {
        let mut g = FrameHitGeometry::default();
        g.upsert(hit(DamageType::Melee, 2.0));
        g.upsert(hit(DamageType::Projectile, 3.0));
        g.upsert(hit(DamageType::Melee, 5.0));
        assert_eq!(g.iter().count(), 2);
        assert_eq!(g.get(DamageType::Melee).map(|b| b.half_width), Some(5.0));
    }

    #[test]
    fn test_empty_box() {
        assert!(hit(DamageType::Melee, 0.0).is_empty());
        let mut g = FrameHitGeometry::default();
        g.upsert(hit(DamageType::Melee, 0.0));
        assert!(g.is_empty());
    }

    #[test]
    fn test_segment_midpoint_control() {
        let v = AttackVector::segment(DamageType::Melee, (0.0, 0.0), (10.0, -4.0), 3);
        assert_eq!(v.control_x, 5.0);
        assert_eq!(v.control_y, -2.0);
    }

    #[test]
    fn test_damage_type_parse() {
        assert_eq!(DamageType::parse("Melee"), Some(DamageType::Melee));
        assert_eq!(DamageType::parse("laser"), None);
    }
}
