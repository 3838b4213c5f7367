//! Engine systems.
//!
//! Submodules overview
//! - [`animation`] – advance animation frames by elapsed time
//! - [`render`] – z-ordered compositing through a [`render::Canvas`]
//! - [`time`] – update the animation clock
pub mod animation;
pub mod render;
pub mod time;
