//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: configuration, timing, the frame
//! texture cache and the asset definitions. Each submodule documents the
//! semantics and intended usage of its resource(s).
//!
//! Overview
//! - `animationrng` – random source for randomised animation starts
//! - `animationstore` – asset definitions (animations, lights) keyed by asset name
//! - `camera2d` – shared 2D camera used for world/screen transforms
//! - `gameconfig` – INI-backed window, animation and scaling settings
//! - `scaleprofiles` – per-asset variant steps and the selection policy
//! - `texturestore` – frame textures keyed by [`texturestore::TextureId`]
//! - `worldtime` – simulation time and delta
pub mod animationrng;
pub mod animationstore;
pub mod camera2d;
pub mod gameconfig;
pub mod scaleprofiles;
pub mod texturestore;
pub mod worldtime;
