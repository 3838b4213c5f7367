//! Tilesprite library.
//!
//! Turns an asset directory and map files into a time-evolving scene of
//! animated sprites and tiles:
//!
//! - [`assetgrammar`] – parser for `objects.txt` animation definitions
//! - [`mapfile`] – parser for tile map files
//! - [`resources`] – frame store, animation catalog, asset manager, tile grid
//! - [`components`] – per-animation ECS components
//! - [`systems`] – advancing animations and compositing them
//! - [`scheduler`] – the registry that owns live animations
//!
//! Windowing, image decoding and blitting are provided by the caller through
//! [`resources::framestore::FrameLoader`] and [`systems::render::Canvas`],
//! or by the raylib implementations behind the `raylib` feature.

pub mod assetgrammar;
pub mod components;
pub mod error;
pub mod mapfile;
pub mod resources;
pub mod scheduler;
pub mod systems;
