//! ECS components for animated assets.
//!
//! This module groups the component types attached to every animated asset
//! in the world: where it is, what it plays, which children hang off it and
//! the render package built for it.
//!
//! Submodules overview:
//! - [`animation`] – playback state of the asset's current animation
//! - [`assetinstance`] – which asset definition an entity shows, and its mirroring
//! - [`childattachment`] – runtime slots of the attached child animations
//! - [`composite`] – variant selection state and the per-tick render package
//! - [`lightsources`] – light sources emitted with the package
//! - [`mapposition`] – world-space anchor (bottom centre) of an asset
//! - [`perspectivescale`] – distance scale supplied by the map grid
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod animation;
pub mod assetinstance;
pub mod childattachment;
pub mod composite;
pub mod lightsources;
pub mod mapposition;
pub mod perspectivescale;
pub mod zindex;
