//! Aberred animation core.
//!
//! Sprite animations with pre-rendered scale variants, attached child
//! animations, lights and hit geometry, driven by `bevy_ecs` systems and
//! drawn with raylib. This module exposes the data model, loaders, ECS
//! components, resources, systems and events for use in integration tests
//! and as a reusable library.

pub mod animation;
pub mod animdoc;
pub mod components;
pub mod error;
pub mod events;
pub mod loader;
pub mod resources;
pub mod scaling;
pub mod systems;
pub mod types;
