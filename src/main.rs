//! Aberred animation viewer.
//!
//! Opens a raylib window and plays one asset from an asset cache, with its
//! child attachments, lights and scale variants, using:
//! - **raylib** for windowing, texture loading and drawing
//! - **bevy_ecs** for the entity-component-system loop
//!
//! With `--validate` it only parses an animation document, reports what it
//! found and prints the normalised JSON, without opening a window.
//!
//! # Main Loop
//!
//! 1. Load `config.ini` and open the window
//! 2. Load the asset and every child asset it can attach
//! 3. Spawn one instance and register the observers
//! 4. Each frame: advance time, run the update schedule, draw
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --asset-root ./data --asset knight --animation walk
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::{Path, PathBuf};

use aberredanim::animdoc::AnimationDocument;
use aberredanim::components::animation::AnimationPlayer;
use aberredanim::components::assetinstance::asset_bundle;
use aberredanim::components::mapposition::MapPosition;
use aberredanim::events::animationend::AnimationEndedEvent;
use aberredanim::loader::assetinfo::load_asset_tree;
use aberredanim::loader::raylibloader::RaylibTextureLoader;
use aberredanim::resources::animationrng::AnimationRng;
use aberredanim::resources::animationstore::AnimationStore;
use aberredanim::resources::camera2d::Camera2DRes;
use aberredanim::resources::gameconfig::GameConfig;
use aberredanim::resources::scaleprofiles::ScaleProfileStore;
use aberredanim::resources::texturestore::TextureStore;
use aberredanim::resources::worldtime::WorldTime;
use aberredanim::systems::animation::animation_advance;
use aberredanim::systems::childattachment::update_child_attachments;
use aberredanim::systems::composite::composite_build;
use aberredanim::systems::gameconfig::apply_gameconfig_changes;
use aberredanim::systems::render::render_system;
use aberredanim::systems::time::update_world_time;
use aberredanim::systems::variantselect::select_variants;
use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use raylib::prelude::{Camera2D, Vector2};

/// Aberred animation viewer
#[derive(Parser)]
#[command(version, about = "Plays pre-rendered sprite animations from an asset cache.")]
struct Cli {
    /// Configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Parse an animation document, print it normalised and exit.
    #[arg(long, value_name = "DOC.json")]
    validate: Option<PathBuf>,

    /// Directory that holds `cache/<asset>/info.json`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    asset_root: PathBuf,

    /// Asset to play.
    #[arg(long)]
    asset: Option<String>,

    /// Animation to start with (default: the asset's default animation).
    #[arg(long)]
    animation: Option<String>,
}

fn validate_document(path: &Path) -> i32 {
    match AnimationDocument::load_from_file(path) {
        Ok(doc) => {
            log::info!(
                "{}: {} frame(s), {} path(s), {} child asset(s)",
                path.display(),
                doc.frame_count(),
                doc.paths.len(),
                doc.children.len()
            );
            match serde_json::to_string_pretty(&doc.to_value()) {
                Ok(text) => {
                    println!("{text}");
                    0
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    1
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}: {e}", path.display());
            1
        }
    }
}

fn observe_animation_end(trigger: On<AnimationEndedEvent>) {
    let event = trigger.event();
    log::info!(
        "{:?} finished '{}' ({})",
        event.entity,
        event.animation,
        event.directive.as_str()
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Early-exit: document validation needs no window
    if let Some(path) = cli.validate.as_ref() {
        std::process::exit(validate_document(path));
    }

    let Some(asset) = cli.asset.clone() else {
        eprintln!("Error: --asset is required unless --validate is given");
        std::process::exit(2);
    };

    let mut config = match cli.config.clone() {
        Some(path) => GameConfig::with_path(path),
        None => GameConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        log::warn!("Using default configuration: {}", e);
    }

    let (window_width, window_height) = config.window_size();
    let (mut rl, thread) = raylib::init()
        .size(window_width as i32, window_height as i32)
        .resizable()
        .title("Aberred Animation")
        .build();
    rl.set_target_fps(config.target_fps);

    // --------------- Assets ---------------
    let mut textures = TextureStore::new();
    let mut animations = AnimationStore::default();
    {
        let mut loader = RaylibTextureLoader::new(&mut rl, &thread);
        match load_asset_tree(&cli.asset_root, &asset, &mut loader, &mut textures, &mut animations) {
            Ok(load) if !load.is_complete() => {
                log::warn!("'{}' loaded with {} missing variant(s)", asset, load.missing.len())
            }
            Ok(_) => log::info!("'{}' loaded, {} texture(s)", asset, textures.len()),
            Err(e) => {
                log::error!("Failed to load '{}': {}", asset, e);
                std::process::exit(1);
            }
        }
    }

    let camera = Camera2D {
        target: Vector2 { x: 0.0, y: 0.0 },
        offset: Vector2 {
            x: rl.get_screen_width() as f32 * 0.5,
            y: rl.get_screen_height() as f32 * 0.75,
        },
        rotation: 0.0,
        zoom: 1.0,
    };

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    let mut rng = AnimationRng::default();
    let Some(info) = animations.get(&asset) else {
        log::error!("Asset '{}' is not in the store", asset);
        std::process::exit(1);
    };
    let entity = world
        .spawn(asset_bundle(info, MapPosition::new(0.0, 0.0), false, &mut rng))
        .id();
    if let Some(name) = cli.animation.as_deref()
        && let Some(mut player) = world.get_mut::<AnimationPlayer>(entity)
    {
        player.switch_to(info, name, &mut rng);
    }

    world.insert_resource(WorldTime::default());
    world.insert_resource(ScaleProfileStore::new(config.scale_policy()));
    world.insert_resource(config);
    world.insert_resource(animations);
    world.insert_resource(textures);
    world.insert_resource(rng);
    world.insert_resource(Camera2DRes(camera));
    world.insert_non_send_resource(rl);
    world.insert_non_send_resource(thread);

    world.spawn(Observer::new(observe_animation_end));
    // Ensure the observer is registered before we run any systems that may trigger events.
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(
        (
            apply_gameconfig_changes,
            animation_advance,
            select_variants,
            update_child_attachments,
            composite_build,
            render_system,
        )
            .chain(),
    );

    if let Err(e) = update.initialize(&mut world) {
        log::error!("Failed to initialize schedule: {}", e);
        std::process::exit(1);
    }

    // --------------- Main loop ---------------
    while !world
        .non_send_resource::<raylib::RaylibHandle>()
        .window_should_close()
    {
        let dt = world
            .non_send_resource::<raylib::RaylibHandle>()
            .get_frame_time();
        update_world_time(&mut world, dt);

        update.run(&mut world);

        world.clear_trackers(); // Clear changed components for next frame
    }
}
