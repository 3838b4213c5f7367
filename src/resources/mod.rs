//! Long-lived data shared by the scheduler and its callers.
//!
//! Overview
//! - `animationstore` – the animation catalog: sets, sequences, frame steps
//! - `assetmanager` – one-shot loader for an asset directory
//! - `camera2d` – visible world rectangle for compositing
//! - `engineconfig` – INI-backed engine settings
//! - `framestore` – owner of loaded frames, keyed by stable ids
//! - `tilegrid` – grid of tile animations built from a map file
//! - `worldtime` – animation clock and delta
//! - `raylibframes`, `rendertarget` – raylib implementations (feature `raylib`)
pub mod animationstore;
pub mod assetmanager;
pub mod camera2d;
pub mod engineconfig;
pub mod framestore;
#[cfg(feature = "raylib")]
pub mod raylibframes;
#[cfg(feature = "raylib")]
pub mod rendertarget;
pub mod tilegrid;
pub mod worldtime;
