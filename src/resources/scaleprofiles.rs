//! Per-asset scale profiles.
//!
//! Holds the variant step list of every asset type together with the
//! selection policy seeded from [`GameConfig`](crate::resources::gameconfig::GameConfig).
//! Lookups remember the revision they last reported so callers can tell
//! when an asset's steps were replaced and cached selections must be dropped.
//!
//! # Related
//!
//! - [`crate::scaling`] – the selection policy itself
//! - [`crate::systems::variantselect`] – the per-tick consumer

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::scaling::{DEFAULT_SCALE_STEPS, ScalePolicy, normalize_variant_steps};

/// Step list of one asset type.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleProfile {
    /// Strictly decreasing scales in `(0, 1]`.
    pub steps: Vec<f32>,
    /// Bumped every time `steps` is replaced.
    pub revision: u64,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl ScaleProfile {
    fn new(mut steps: Vec<f32>, revision: u64) -> Self {
        normalize_variant_steps(&mut steps);
        if steps.is_empty() {
            steps = DEFAULT_SCALE_STEPS.to_vec();
        }
        let max_scale = steps.first().copied().unwrap_or(1.0);
        let min_scale = steps.last().copied().unwrap_or(1.0);
        Self {
            steps,
            revision,
            min_scale,
            max_scale,
        }
    }
}

/// Outcome of [`ScaleProfileStore::profile_for_asset`].
#[derive(Clone, Debug)]
pub struct ProfileLookup {
    pub profile: ScaleProfile,
    /// The asset had no profile and the default one was created for it.
    pub created_entry: bool,
    /// The revision differs from the one reported by the previous lookup.
    pub revision_changed: bool,
}

#[derive(Resource, Debug, Default)]
pub struct ScaleProfileStore {
    profiles: FxHashMap<String, ScaleProfile>,
    reported: FxHashMap<String, u64>,
    policy: ScalePolicy,
    next_revision: u64,
}

impl ScaleProfileStore {
    pub fn new(policy: ScalePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> &ScalePolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: ScalePolicy) {
        self.policy = policy;
        self.policy.set_quality_cap(policy.quality_cap);
    }

    pub fn set_quality_cap(&mut self, cap: f32) {
        self.policy.set_quality_cap(cap);
    }

    /// Register (or replace) the step list of an asset.
    ///
    /// Returns the profile's revision. Registering identical steps keeps the
    /// current revision.
    pub fn register(&mut self, asset: &str, steps: &[f32]) -> u64 {
        let candidate = ScaleProfile::new(steps.to_vec(), 0);
        if let Some(existing) = self.profiles.get(asset)
            && existing.steps == candidate.steps
        {
            return existing.revision;
        }
        self.next_revision += 1;
        let revision = self.next_revision;
        self.profiles.insert(
            asset.to_string(),
            ScaleProfile {
                revision,
                ..candidate
            },
        );
        log::debug!("Scale profile for '{}' at revision {}", asset, revision);
        revision
    }

    /// Profile of `asset` without touching the lookup history.
    pub fn get(&self, asset: &str) -> Option<&ScaleProfile> {
        self.profiles.get(asset)
    }

    /// Steps of `asset`, or the default steps for unknown assets.
    pub fn steps_for(&self, asset: &str) -> &[f32] {
        self.profiles
            .get(asset)
            .map(|p| p.steps.as_slice())
            .unwrap_or(&DEFAULT_SCALE_STEPS)
    }

    /// Look up the profile of `asset`, creating a default one if needed.
    pub fn profile_for_asset(&mut self, asset: &str) -> ProfileLookup {
        let mut created_entry = false;
        if !self.profiles.contains_key(asset) {
            self.next_revision += 1;
            let profile = ScaleProfile::new(DEFAULT_SCALE_STEPS.to_vec(), self.next_revision);
            self.profiles.insert(asset.to_string(), profile);
            created_entry = true;
        }
        let profile = self.profiles[asset].clone();
        let previous = self.reported.insert(asset.to_string(), profile.revision);
        ProfileLookup {
            revision_changed: previous != Some(profile.revision),
            profile,
            created_entry,
        }
    }

    /// Forget which revisions were reported.
    pub fn reset_history(&mut self) {
        self.reported.clear();
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_asset_gets_default_profile() {
        let mut store = ScaleProfileStore::default();
        let lookup = store.profile_for_asset("crate");
        assert!(lookup.created_entry);
        assert!(lookup.revision_changed);
        assert_eq!(lookup.profile.steps, DEFAULT_SCALE_STEPS.to_vec());
        assert_eq!(lookup.profile.max_scale, 1.0);
        assert!((lookup.profile.min_scale - 0.1).abs() < 1e-6);

        let again = store.profile_for_asset("crate");
        assert!(!again.created_entry);
        assert!(!again.revision_changed);
    }

    #[test]
    fn test_register_bumps_revision_only_on_change() {
        let mut store = ScaleProfileStore::default();
        let r1 = store.register("hero", &[1.0, 0.5]);
        let r2 = store.register("hero", &[1.0, 0.5]);
        assert_eq!(r1, r2);
        store.profile_for_asset("hero");

        let r3 = store.register("hero", &[1.0, 0.5, 0.25]);
        assert!(r3 > r1);
        let lookup = store.profile_for_asset("hero");
        assert!(lookup.revision_changed);
        assert_eq!(lookup.profile.steps, vec![1.0, 0.5, 0.25]);
    }

    #[test]
    fn test_reset_history_reports_again() {
        let mut store = ScaleProfileStore::default();
        store.register("hero", &[1.0]);
        assert!(store.profile_for_asset("hero").revision_changed);
        assert!(!store.profile_for_asset("hero").revision_changed);
        store.reset_history();
        assert!(store.profile_for_asset("hero").revision_changed);
    }

    #[test]
    fn test_quality_cap_is_sanitised() {
        let mut store = ScaleProfileStore::default();
        store.set_quality_cap(-3.0);
        assert!((store.policy().quality_cap - 0.1).abs() < 1e-6);
        assert_eq!(store.steps_for("nobody"), &DEFAULT_SCALE_STEPS);
    }
}
