//! Variant scale selection.
//!
//! Every frame of an asset is pre-rendered at a handful of discrete scales
//! (the asset's *scale steps*, e.g. `1.0, 0.75, 0.5, 0.25, 0.1`). When an
//! asset is drawn at an arbitrary on-screen scale, [`ScalePolicy::choose`]
//! picks which stored variant to sample and how much residual scaling the
//! renderer still has to apply.
//!
//! Selection prefers the smallest variant that is at least as large as the
//! request, so the renderer usually downscales slightly instead of
//! upscaling. With a [`HysteresisState`] from the previous tick, the choice
//! only moves once the smoothed scale leaves a widened band around the
//! current variant, so camera zoom jitter does not flip textures every frame.
//!
//! # Related
//!
//! - [`crate::resources::scaleprofiles::ScaleProfileStore`] – per-asset step lists and policy
//! - [`crate::systems::variantselect`] – runs the policy for each asset every tick

use std::path::{Path, PathBuf};

/// Scale steps used by assets that do not declare their own.
pub const DEFAULT_SCALE_STEPS: [f32; 5] = [1.00, 0.75, 0.50, 0.25, 0.10];

/// Default half-width of the hysteresis band around a variant boundary.
pub const DEFAULT_HYSTERESIS_MARGIN: f32 = 0.05;
/// Default distance from a boundary within which a neighbour is preloaded.
pub const DEFAULT_PRELOAD_MARGIN: f32 = 0.02;

/// Upper bound used for a variant that has no larger neighbour.
pub const UNBOUNDED_SCALE: f32 = f32::MAX;

const STEP_EPSILON: f32 = 1e-4;

/// Result of a variant choice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSelection {
    /// Index into the step list.
    pub index: usize,
    /// The sanitised scale that was asked for.
    pub requested_scale: f32,
    /// Scale the chosen variant was rendered at.
    pub stored_scale: f32,
    /// Residual scale to apply when drawing (`requested / stored`).
    pub remainder_scale: f32,
    /// Lower edge of the band that keeps this variant selected.
    pub hysteresis_min: f32,
    /// Upper edge of the band that keeps this variant selected.
    pub hysteresis_max: f32,
    /// Neighbour worth loading ahead of time, if the scale is near a boundary.
    pub preload_index: Option<usize>,
}

/// Selection state carried from one tick to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HysteresisState {
    pub last_index: usize,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for HysteresisState {
    fn default() -> Self {
        Self {
            last_index: 0,
            min_scale: 0.0,
            max_scale: UNBOUNDED_SCALE,
        }
    }
}

impl HysteresisState {
    /// State that keeps `index` selected within `[min, max]`.
    pub fn new(last_index: usize, min_scale: f32, max_scale: f32) -> Self {
        Self {
            last_index,
            min_scale,
            max_scale,
        }
    }

    /// Capture the band reported by a previous selection.
    pub fn from_selection(selection: &ScaleSelection) -> Self {
        Self {
            last_index: selection.index,
            min_scale: selection.hysteresis_min,
            max_scale: selection.hysteresis_max,
        }
    }
}

/// Margins and quality cap applied when choosing variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalePolicy {
    pub hysteresis_margin: f32,
    pub preload_margin: f32,
    /// Largest stored scale that may be sampled, in `(0, 1]`.
    pub quality_cap: f32,
}

impl Default for ScalePolicy {
    fn default() -> Self {
        Self {
            hysteresis_margin: DEFAULT_HYSTERESIS_MARGIN,
            preload_margin: DEFAULT_PRELOAD_MARGIN,
            quality_cap: 1.0,
        }
    }
}

impl ScalePolicy {
    /// Set the quality cap, sanitised to `[0.1, 1.0]`.
    pub fn set_quality_cap(&mut self, cap: f32) {
        self.quality_cap = sanitize_quality_cap(cap);
    }

    /// Choose without history: the base choice and its own bounds.
    pub fn choose_simple(&self, requested: f32, steps: &[f32]) -> ScaleSelection {
        self.choose(requested, steps, None, requested)
    }

    /// Choose a variant for `requested`, honouring `state` when given.
    ///
    /// `smoothed` is the low-pass filtered request used for the band test;
    /// non-finite or non-positive values fall back to `requested`.
    pub fn choose(
        &self,
        requested: f32,
        steps: &[f32],
        state: Option<&HysteresisState>,
        smoothed: f32,
    ) -> ScaleSelection {
        let base = choose_closest(requested, steps, self.quality_cap);
        if steps.is_empty() {
            return base;
        }

        let margin = sanitize_margin(self.hysteresis_margin, DEFAULT_HYSTERESIS_MARGIN);
        let preload_margin = sanitize_margin(self.preload_margin, DEFAULT_PRELOAD_MARGIN);
        let smoothed = if smoothed.is_finite() && smoothed > 0.0 {
            smoothed
        } else {
            base.requested_scale
        };
        let max_index = steps.len() - 1;

        let candidate = match state {
            None => base.index,
            Some(state) => {
                let last = state.last_index.min(max_index);
                let min_scale = if state.min_scale.is_finite() && state.min_scale >= 0.0 {
                    state.min_scale
                } else {
                    0.0
                };
                let max_scale = if state.max_scale.is_finite() && state.max_scale >= min_scale {
                    state.max_scale
                } else {
                    UNBOUNDED_SCALE
                };

                if smoothed >= min_scale && smoothed <= max_scale {
                    last
                } else if smoothed < min_scale && last < max_index {
                    // Toward smaller variants until the band's lower edge is below us.
                    let mut candidate = last;
                    loop {
                        candidate = (candidate + 1).min(max_index);
                        let (min_bound, _) = variant_bounds(steps, candidate, margin);
                        if smoothed >= min_bound || candidate >= max_index {
                            break candidate;
                        }
                    }
                } else if smoothed > max_scale && last > 0 {
                    let mut candidate = last;
                    loop {
                        candidate = candidate.saturating_sub(1);
                        let (_, max_bound) = variant_bounds(steps, candidate, margin);
                        if smoothed <= max_bound || candidate == 0 {
                            break candidate;
                        }
                    }
                } else {
                    base.index
                }
            }
        };

        let mut result = base;
        result.index = candidate;
        result.stored_scale = if steps[candidate] > 0.0 {
            steps[candidate]
        } else {
            1.0
        };
        result.remainder_scale = result.requested_scale / result.stored_scale;
        let (min_bound, max_bound) = variant_bounds(steps, candidate, margin);
        result.hysteresis_min = min_bound;
        result.hysteresis_max = max_bound;

        result.preload_index = None;
        let mut best_distance = f32::MAX;
        if candidate < max_index {
            let boundary = 0.5 * (steps[candidate] + steps[candidate + 1]);
            let diff = (smoothed - boundary).abs();
            if diff <= preload_margin {
                result.preload_index = Some(candidate + 1);
                best_distance = diff;
            }
        }
        if candidate > 0 {
            let boundary = 0.5 * (steps[candidate] + steps[candidate - 1]);
            let diff = (smoothed - boundary).abs();
            if diff <= preload_margin && diff < best_distance && candidate - 1 >= base.index {
                result.preload_index = Some(candidate - 1);
            }
        }

        result
    }
}

/// Clamp a quality cap into `[0.1, 1.0]`; garbage becomes the minimum.
pub fn sanitize_quality_cap(cap: f32) -> f32 {
    if !cap.is_finite() || cap <= 0.0 {
        return 0.1;
    }
    cap.clamp(0.1, 1.0)
}

fn sanitize_margin(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

/// Smallest step that covers `requested`, or the largest step overall.
fn choose_closest(requested: f32, steps: &[f32], quality_cap: f32) -> ScaleSelection {
    let mut result = ScaleSelection {
        index: 0,
        requested_scale: 1.0,
        stored_scale: 1.0,
        remainder_scale: 1.0,
        hysteresis_min: 0.0,
        hysteresis_max: UNBOUNDED_SCALE,
        preload_index: None,
    };

    let Some(&smallest) = steps.last() else {
        result.requested_scale = if requested.is_finite() && requested > 0.0 {
            requested
        } else {
            1.0
        };
        result.remainder_scale = result.requested_scale;
        return result;
    };

    let mut sanitized = if requested.is_finite() { requested } else { 1.0 };
    if sanitized <= 0.0 {
        sanitized = smallest;
    }
    result.requested_scale = sanitized;

    let enforce_cap = quality_cap.is_finite() && quality_cap > 0.0 && quality_cap < 0.999;
    let has_allowed = enforce_cap && steps.iter().any(|&s| s <= quality_cap + STEP_EPSILON);

    let mut chosen: Option<(usize, f32)> = None;
    let mut fallback: Option<(usize, f32)> = None;
    for (i, &candidate) in steps.iter().enumerate() {
        if has_allowed && candidate > quality_cap + STEP_EPSILON {
            continue;
        }
        let chosen_scale = chosen.map_or(f32::MAX, |(_, s)| s);
        if candidate + STEP_EPSILON >= sanitized && candidate < chosen_scale - 1e-6 {
            chosen = Some((i, candidate));
        }
        let fallback_scale = fallback.map_or(-f32::MAX, |(_, s)| s);
        if candidate > fallback_scale + 1e-6 {
            fallback = Some((i, candidate));
        }
    }

    let (index, scale) = chosen.or(fallback).unwrap_or((0, steps[0]));
    result.index = index;
    if scale > 0.0 {
        result.stored_scale = scale;
        result.remainder_scale = sanitized / scale;
    }
    result
}

/// Band `[min, max]` within which variant `index` stays selected.
///
/// Each edge sits on the midpoint to the neighbouring step, widened by
/// `margin`. A variant with no smaller neighbour reaches down to 0, one with
/// no larger neighbour reaches up to [`UNBOUNDED_SCALE`].
pub fn variant_bounds(steps: &[f32], index: usize, margin: f32) -> (f32, f32) {
    if steps.is_empty() {
        return (0.0, UNBOUNDED_SCALE);
    }
    let margin = if margin.is_finite() && margin > 0.0 {
        margin
    } else {
        0.0
    };
    let index = index.min(steps.len() - 1);
    let current = steps[index];
    let mut min_bound = 0.0_f32;
    let mut max_bound = UNBOUNDED_SCALE;

    if index + 1 < steps.len() {
        let boundary = 0.5 * (current + steps[index + 1]);
        min_bound = (boundary - margin).max(0.0);
    }
    if index > 0 {
        let boundary = 0.5 * (current + steps[index - 1]);
        max_bound = boundary + margin;
    }

    if min_bound > max_bound {
        let midpoint = 0.5 * (min_bound + max_bound);
        min_bound = min_bound.min(midpoint);
        max_bound = max_bound.max(midpoint);
    }
    (min_bound, max_bound)
}

/// Integer percentage used in on-disk folder names (`0.75` -> `75`).
pub fn scale_percent(scale: f32) -> i32 {
    (scale * 100.0).round() as i32
}

/// Folder holding the variant rendered at `scale`: `<root>/scale_<pct>`.
pub fn variant_folder(root: &Path, scale: f32) -> PathBuf {
    root.join(format!("scale_{}", scale_percent(scale)))
}

/// Clean a step list: drop values outside (0, 1], sort largest first and
/// merge near-duplicates. An empty result becomes `[1.0]`.
pub fn normalize_variant_steps(steps: &mut Vec<f32>) {
    steps.retain(|s| s.is_finite() && *s > 0.0 && *s <= 1.0 + STEP_EPSILON);
    for s in steps.iter_mut() {
        *s = s.min(1.0);
    }
    steps.sort_by(|a, b| b.total_cmp(a));
    steps.dedup_by(|a, b| (*a - *b).abs() <= STEP_EPSILON);
    if steps.is_empty() {
        steps.push(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS: [f32; 5] = DEFAULT_SCALE_STEPS;

    fn policy() -> ScalePolicy {
        ScalePolicy::default()
    }

    #[test]
    fn test_base_choice_prefers_smallest_covering_step() {
        let sel = policy().choose_simple(0.6, &STEPS);
        assert_eq!(sel.index, 1);
        assert!((sel.stored_scale - 0.75).abs() < 1e-6);
        assert!((sel.remainder_scale - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_request_above_all_steps_uses_largest() {
        let sel = policy().choose_simple(2.0, &STEPS);
        assert_eq!(sel.index, 0);
        assert!((sel.remainder_scale - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_request_is_one() {
        let sel = policy().choose_simple(f32::NAN, &STEPS);
        assert_eq!(sel.index, 0);
        assert!((sel.requested_scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_request_uses_smallest_step() {
        let sel = policy().choose_simple(0.0, &STEPS);
        assert_eq!(sel.index, 4);
        assert!((sel.requested_scale - 0.1).abs() < 1e-6);
        assert!((sel.remainder_scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_steps_passes_request_through() {
        let sel = policy().choose_simple(0.4, &[]);
        assert_eq!(sel.index, 0);
        assert!((sel.stored_scale - 1.0).abs() < 1e-6);
        assert!((sel.remainder_scale - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_quality_cap_skips_large_steps() {
        let mut p = policy();
        p.set_quality_cap(0.5);
        let sel = p.choose_simple(0.9, &STEPS);
        assert_eq!(sel.index, 2);
        assert!((sel.remainder_scale - 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_quality_cap_ignored_when_no_step_fits() {
        let mut p = policy();
        p.set_quality_cap(0.1);
        let sel = p.choose_simple(0.9, &[1.0, 0.5]);
        assert_eq!(sel.index, 0);
    }

    #[test]
    fn test_sanitize_quality_cap() {
        assert!((sanitize_quality_cap(f32::NAN) - 0.1).abs() < 1e-6);
        assert!((sanitize_quality_cap(-1.0) - 0.1).abs() < 1e-6);
        assert!((sanitize_quality_cap(0.05) - 0.1).abs() < 1e-6);
        assert!((sanitize_quality_cap(3.0) - 1.0).abs() < 1e-6);
        assert!((sanitize_quality_cap(0.6) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_variant_bounds_edges() {
        let (min0, max0) = variant_bounds(&STEPS, 0, 0.05);
        assert!((min0 - 0.825).abs() < 1e-6);
        assert_eq!(max0, UNBOUNDED_SCALE);

        let (min4, max4) = variant_bounds(&STEPS, 4, 0.05);
        assert_eq!(min4, 0.0);
        assert!((max4 - 0.225).abs() < 1e-6);

        let (min2, max2) = variant_bounds(&STEPS, 2, 0.0);
        assert!((min2 - 0.375).abs() < 1e-6);
        assert!((max2 - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_variant_bounds_collapse_when_margin_overlaps() {
        let (min, max) = variant_bounds(&[1.0, 0.9, 0.8], 1, 10.0);
        assert!(min <= max);
    }

    #[test]
    fn test_hysteresis_steps_down_and_holds() {
        let p = policy();
        let (min, max) = variant_bounds(&STEPS, 2, 0.0);
        let state = HysteresisState::new(2, min, max);

        let sel = p.choose(0.40, &STEPS, Some(&state), 0.40);
        assert_eq!(sel.index, 2);
        assert!((sel.stored_scale - 0.5).abs() < 1e-6);

        let sel = p.choose(0.33, &STEPS, Some(&state), 0.33);
        assert_eq!(sel.index, 3);
        assert!((sel.stored_scale - 0.25).abs() < 1e-6);
        assert!((sel.hysteresis_min - 0.125).abs() < 1e-6);
        assert!((sel.hysteresis_max - 0.425).abs() < 1e-6);

        let next = HysteresisState::from_selection(&sel);
        let sel = p.choose(0.40, &STEPS, Some(&next), 0.40);
        assert_eq!(sel.index, 3);

        let sel = p.choose(0.44, &STEPS, Some(&next), 0.44);
        assert_eq!(sel.index, 2);
    }

    #[test]
    fn test_hysteresis_steps_up_multiple_variants() {
        let p = policy();
        let state = HysteresisState::new(4, 0.0, 0.225);
        let sel = p.choose(0.95, &STEPS, Some(&state), 0.95);
        assert_eq!(sel.index, 0);
    }

    #[test]
    fn test_remainder_times_stored_is_request() {
        let p = policy();
        let mut s = 0.013_f32;
        while s < 3.0 {
            let sel = p.choose_simple(s, &STEPS);
            let back = sel.stored_scale * sel.remainder_scale;
            assert!(((back - s) / s).abs() < 1e-4, "s={s}");
            assert!(sel.remainder_scale > 0.0);
            s *= 1.37;
        }
    }

    #[test]
    fn test_preload_hint_near_lower_boundary() {
        let p = policy();
        let state = HysteresisState::new(1, 0.575, 0.925);
        let sel = p.choose(0.63, &STEPS, Some(&state), 0.63);
        assert_eq!(sel.index, 1);
        assert_eq!(sel.preload_index, Some(2));
    }

    #[test]
    fn test_preload_never_proposes_larger_than_base() {
        let p = policy();
        let state = HysteresisState::new(2, 0.325, 0.675);
        let sel = p.choose(0.62, &STEPS, Some(&state), 0.62);
        assert_eq!(sel.index, 2);
        assert_eq!(sel.preload_index, Some(1));

        // Request maps to index 2, so index 1 is not offered.
        let sel = p.choose(0.40, &STEPS, Some(&state), 0.62);
        assert_eq!(sel.index, 2);
        assert_eq!(sel.preload_index, None);

        let sel = p.choose(0.36, &STEPS, Some(&state), 0.36);
        assert_eq!(sel.preload_index, Some(3));
    }

    #[test]
    fn test_scale_percent_and_folder() {
        assert_eq!(scale_percent(0.75), 75);
        assert_eq!(scale_percent(0.1), 10);
        let folder = variant_folder(Path::new("cache/hero/animations"), 0.25);
        assert_eq!(folder, PathBuf::from("cache/hero/animations/scale_25"));
    }

    #[test]
    fn test_normalize_variant_steps() {
        let mut steps = vec![0.25, 1.0, f32::NAN, 0.5, 0.25, -1.0, 1.5, 0.50001];
        normalize_variant_steps(&mut steps);
        assert_eq!(steps, vec![1.0, 0.50001, 0.25]);
        let mut empty = Vec::new();
        normalize_variant_steps(&mut empty);
        assert_eq!(empty, vec![1.0]);
    }
}
