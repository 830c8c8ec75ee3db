//! Configuration file round-trip and its effect on the running world.

use bevy_ecs::prelude::*;

use aberredanim::resources::gameconfig::GameConfig;
use aberredanim::resources::scaleprofiles::ScaleProfileStore;
use aberredanim::systems::gameconfig::apply_gameconfig_changes;

#[test]
fn saved_config_loads_back() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.ini");

    let mut config = GameConfig::with_path(&path);
    config.window_width = 800;
    config.window_height = 600;
    config.vsync = false;
    config.base_fps = 12;
    config.default_animation = "Idle".to_string();
    config.quality_cap = 0.5;
    config.hysteresis_margin = 0.08;
    config.smooth_scaling = false;
    config.save_to_file().unwrap();

    let mut loaded = GameConfig::with_path(&path);
    loaded.load_from_file().unwrap();
    assert_eq!(loaded.window_size(), (800, 600));
    assert!(!loaded.vsync);
    assert_eq!(loaded.base_fps, 12);
    assert_eq!(loaded.default_animation, "Idle");
    assert_eq!(loaded.quality_cap, 0.5);
    assert!((loaded.hysteresis_margin - 0.08).abs() < 1e-6);
    assert!(!loaded.smooth_scaling);
    assert!((loaded.frame_duration() - 1.0 / 12.0).abs() < 1e-6);
}

#[test]
fn partial_file_keeps_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.ini");
    std::fs::write(&path, "[scaling]\nquality_cap = 7\n\n[animation]\nbase_fps = 0\n").unwrap();

    let mut config = GameConfig::with_path(&path);
    config.load_from_file().unwrap();
    assert_eq!(config.quality_cap, 1.0);
    assert_eq!(config.base_fps, GameConfig::new().base_fps);
    assert_eq!(config.window_size(), GameConfig::new().window_size());
}

#[test]
fn changed_config_replaces_the_scale_policy() {
    let mut world = World::new();
    world.insert_resource(GameConfig::new());
    world.insert_resource(ScaleProfileStore::default());
    let mut schedule = Schedule::default();
    schedule.add_systems(apply_gameconfig_changes);
    schedule.run(&mut world);

    world.resource_mut::<ScaleProfileStore>().register("tree", &[1.0, 0.5]);
    assert!(world.resource_mut::<ScaleProfileStore>().profile_for_asset("tree").revision_changed);
    world.clear_trackers();

    // Untouched config leaves the reported revisions alone.
    schedule.run(&mut world);
    assert!(!world.resource_mut::<ScaleProfileStore>().profile_for_asset("tree").revision_changed);

    world.resource_mut::<GameConfig>().quality_cap = 0.25;
    schedule.run(&mut world);
    let mut profiles = world.resource_mut::<ScaleProfileStore>();
    assert_eq!(profiles.policy().quality_cap, 0.25);
    assert!(profiles.profile_for_asset("tree").revision_changed);
}
