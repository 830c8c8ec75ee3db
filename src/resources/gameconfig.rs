//! Game configuration resource.
//!
//! Manages settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 1280
//! height = 720
//! target_fps = 60
//! vsync = true
//!
//! [animation]
//! base_fps = 24
//! default_animation = default
//!
//! [scaling]
//! quality_cap = 1.0
//! hysteresis_margin = 0.05
//! preload_margin = 0.02
//! smooth_scaling = true
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::animation::DEFAULT_BASE_FPS;
use crate::scaling::{
    DEFAULT_HYSTERESIS_MARGIN, DEFAULT_PRELOAD_MARGIN, ScalePolicy, sanitize_quality_cap,
};

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_VSYNC: bool = true;
const DEFAULT_ANIMATION_NAME: &str = "default";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
///
/// Stores window settings, the animation clock and the variant scaling
/// policy. The [`apply_gameconfig_changes`] system pushes the scaling
/// section into [`ScaleProfileStore`] whenever this resource changes.
///
/// [`apply_gameconfig_changes`]: crate::systems::gameconfig::apply_gameconfig_changes
/// [`ScaleProfileStore`]: crate::resources::scaleprofiles::ScaleProfileStore
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Enable vertical sync.
    pub vsync: bool,
    /// Animation frames per second. Every animation steps in `1/base_fps`.
    pub base_fps: u32,
    /// Animation an asset falls back to; children restart when their
    /// parent plays it.
    pub default_animation: String,
    /// Largest variant scale that may be sampled, in `[0.1, 1.0]`.
    pub quality_cap: f32,
    pub hysteresis_margin: f32,
    pub preload_margin: f32,
    /// Bilinear filtering for assets that do not say otherwise.
    pub smooth_scaling: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: DEFAULT_VSYNC,
            base_fps: DEFAULT_BASE_FPS,
            default_animation: DEFAULT_ANIMATION_NAME.to_string(),
            quality_cap: 1.0,
            hysteresis_margin: DEFAULT_HYSTERESIS_MARGIN,
            preload_margin: DEFAULT_PRELOAD_MARGIN,
            smooth_scaling: true,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(vsync) = config.getbool("window", "vsync").ok().flatten() {
            self.vsync = vsync;
        }

        // [animation] section
        if let Some(fps) = config.getuint("animation", "base_fps").ok().flatten()
            && fps > 0
        {
            self.base_fps = fps as u32;
        }
        if let Some(name) = config.get("animation", "default_animation") {
            let name = name.trim();
            if !name.is_empty() {
                self.default_animation = name.to_string();
            }
        }

        // [scaling] section
        if let Some(cap) = config.getfloat("scaling", "quality_cap").ok().flatten() {
            self.quality_cap = sanitize_quality_cap(cap as f32);
        }
        if let Some(m) = config.getfloat("scaling", "hysteresis_margin").ok().flatten() {
            self.hysteresis_margin = m as f32;
        }
        if let Some(m) = config.getfloat("scaling", "preload_margin").ok().flatten() {
            self.preload_margin = m as f32;
        }
        if let Some(smooth) = config.getbool("scaling", "smooth_scaling").ok().flatten() {
            self.smooth_scaling = smooth;
        }

        info!(
            "Loaded config: {}x{} window, fps={}, vsync={}, base_fps={}, default_animation={}, quality_cap={}",
            self.window_width,
            self.window_height,
            self.target_fps,
            self.vsync,
            self.base_fps,
            self.default_animation,
            self.quality_cap
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "vsync", Some(self.vsync.to_string()));

        // [animation] section
        config.set("animation", "base_fps", Some(self.base_fps.to_string()));
        config.set(
            "animation",
            "default_animation",
            Some(self.default_animation.clone()),
        );

        // [scaling] section
        config.set("scaling", "quality_cap", Some(self.quality_cap.to_string()));
        config.set(
            "scaling",
            "hysteresis_margin",
            Some(self.hysteresis_margin.to_string()),
        );
        config.set(
            "scaling",
            "preload_margin",
            Some(self.preload_margin.to_string()),
        );
        config.set(
            "scaling",
            "smooth_scaling",
            Some(self.smooth_scaling.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Seconds per animation frame.
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.base_fps.max(1) as f32
    }

    /// Variant selection policy described by the `[scaling]` section.
    pub fn scale_policy(&self) -> ScalePolicy {
        let mut policy = ScalePolicy {
            hysteresis_margin: self.hysteresis_margin,
            preload_margin: self.preload_margin,
            ..ScalePolicy::default()
        };
        policy.set_quality_cap(self.quality_cap);
        policy
    }
}
