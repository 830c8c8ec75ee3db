//! Animation systems.
//!
//! This module groups the ECS systems that advance animations, position
//! children, choose scale variants and build and submit render packages.
//!
//! Per tick the schedule runs, in order:
//! [`time`] → [`animation`] → [`variantselect`] → [`childattachment`] →
//! [`composite`], then [`render`] inside the drawing scope.
//!
//! Submodules overview
//! - [`animation`] – advance players, root motion and on-end directives
//! - [`childattachment`] – child slot state machine and timelines
//! - [`composite`] – per-asset render package builder
//! - [`gameconfig`] – push configuration changes into dependent resources
//! - [`lightflicker`] – deterministic light brightness over time
//! - [`render`] – submit packages to raylib (or any quad sink)
//! - [`time`] – update simulation time and delta
//! - [`variantselect`] – choose the scale variant of every asset

pub mod animation;
pub mod childattachment;
pub mod composite;
pub mod gameconfig;
pub mod lightflicker;
pub mod render;
pub mod time;
pub mod variantselect;
