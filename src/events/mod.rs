//! Event types and observers used by the animation core.
//!
//! Events provide a decoupled way for systems to tell game code what
//! happened without tight coupling or direct dependencies.
//!
//! Submodules:
//! - [`animationend`] – a non-looping animation reached its last frame
pub mod animationend;
