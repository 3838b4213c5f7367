//! Tilesprite viewer.
//!
//! Opens a window, loads an asset directory and an optional map, and plays
//! every animation in it:
//! - **raylib** for windowing, image decoding and blitting
//! - **bevy_ecs** inside the scheduler that owns the live animations
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (falls back to defaults) and apply CLI overrides
//! 2. Open the window and the fixed-resolution render target
//! 3. Load `objects.txt` and the frames it needs, then the map as a tile grid
//! 4. Each frame: pan the camera, tick the scheduler by the frame time,
//!    composite into the render target, and present it letterboxed
//!
//! Arrow keys pan, `H` toggles the tile grid, `P` places a preview sprite.
//!
//! # Running
//!
//! ```sh
//! cargo run --release --features raylib -- --assets ./assets --map ./assets/maps/demo.map
//! cargo run --features raylib -- --assets ./assets --dump-catalog
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};
use raylib::prelude::*;

use tilesprite::resources::assetmanager::AssetManager;
use tilesprite::resources::camera2d::Camera;
use tilesprite::resources::engineconfig::EngineConfig;
use tilesprite::resources::raylibframes::{ImageLoader, RaylibCanvas, TextureLoader};
use tilesprite::resources::rendertarget::RenderTarget;
use tilesprite::resources::tilegrid::TileGrid;
use tilesprite::scheduler::{AnimationScheduler, Placement, SpriteHandle};

const PAN_SPEED: f32 = 240.0;
const PREVIEW_Z: i32 = 100;

/// Tilesprite animation viewer
#[derive(Parser)]
#[command(version, about = "Plays the animations and tile maps of an asset directory.")]
struct Cli {
    /// Configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Asset directory containing objects.txt. Overrides the config file.
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Map file to show. Overrides the config file.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,

    /// Load the asset catalog, print it as JSON and exit (no window needed).
    #[arg(long)]
    dump_catalog: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => EngineConfig::with_path(path),
        None => EngineConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        warn!("{e}, using defaults");
    }
    if let Some(dir) = cli.assets {
        config.asset_dir = dir;
    }
    if cli.map.is_some() {
        config.map_path = cli.map;
    }

    // Early-exit: print the catalog and quit
    if cli.dump_catalog {
        std::process::exit(dump_catalog(&config));
    }

    info!("tilesprite viewer starting");
    let (window_width, window_height) = config.window_size();
    let (render_width, render_height) = config.render_size();

    let (mut rl, thread) = raylib::init()
        .size(window_width as i32, window_height as i32)
        .resizable()
        .title("Tilesprite")
        .build();
    rl.set_target_fps(config.target_fps);

    let mut render_target = match RenderTarget::new(&mut rl, &thread, render_width, render_height)
    {
        Ok(target) => target,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let mut assets = AssetManager::new();
    {
        let mut loader = TextureLoader {
            rl: &mut rl,
            thread: &thread,
        };
        if let Err(e) = assets.load_assets(&mut loader, &config.asset_dir) {
            error!("could not load assets from {}: {e}", config.asset_dir.display());
            std::process::exit(1);
        }
    }

    let mut scheduler = AnimationScheduler::new();
    let mut grid = match &config.map_path {
        Some(path) => match TileGrid::load_map(path, &assets, &mut scheduler, config.map_scale) {
            Ok(grid) => Some(grid),
            Err(e) => {
                error!("could not load map {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => None,
    };

    let mut camera = Camera::new(0, 0, render_width as i32, render_height as i32);
    let mut previews: Vec<SpriteHandle> = Vec::new();
    let mut pan = (0.0f32, 0.0f32);

    // --------------- Main loop ---------------
    while !rl.window_should_close() {
        let dt = rl.get_frame_time();

        pan.0 += axis(&rl, KeyboardKey::KEY_LEFT, KeyboardKey::KEY_RIGHT) * PAN_SPEED * dt;
        pan.1 += axis(&rl, KeyboardKey::KEY_UP, KeyboardKey::KEY_DOWN) * PAN_SPEED * dt;
        let (dx, dy) = (pan.0.trunc(), pan.1.trunc());
        camera.pan(dx as i32, dy as i32);
        pan = (pan.0 - dx, pan.1 - dy);

        if rl.is_key_pressed(KeyboardKey::KEY_H)
            && let Some(grid) = grid.as_mut()
        {
            let visible = !grid.is_visible();
            if let Err(e) = grid.set_visible(&mut scheduler, visible) {
                warn!("could not toggle map: {e}");
            }
        }
        if rl.is_key_pressed(KeyboardKey::KEY_P) {
            match place_preview(&assets, &mut scheduler, &camera) {
                Some(sprite) => previews.push(sprite),
                None => warn!("no animated asset to preview"),
            }
        }

        scheduler.tick(f64::from(dt) * 1000.0);

        let (screen_w, screen_h) = (rl.get_screen_width(), rl.get_screen_height());
        let mut d = rl.begin_drawing(&thread);
        {
            let mut t = d.begin_texture_mode(&thread, &mut render_target.texture);
            t.clear_background(Color::DARKGRAY);
            let mut canvas = RaylibCanvas(&mut t);
            scheduler.composite(&camera, assets.frames(), &mut canvas);
        }
        render_target.present(&mut d, screen_w, screen_h);
    }

    for sprite in previews {
        scheduler.deregister(sprite);
    }
    if let Some(grid) = grid {
        grid.despawn(&mut scheduler);
    }
    info!("bye");
}

fn axis(rl: &RaylibHandle, negative: KeyboardKey, positive: KeyboardKey) -> f32 {
    let mut v = 0.0;
    if rl.is_key_down(negative) {
        v -= 1.0;
    }
    if rl.is_key_down(positive) {
        v += 1.0;
    }
    v
}

/// Drop the first sequence of a random asset somewhere in view.
fn place_preview(
    assets: &AssetManager<Texture2D>,
    scheduler: &mut AnimationScheduler,
    camera: &Camera,
) -> Option<SpriteHandle> {
    let catalog = assets.catalog().ok()?;
    let animated: Vec<_> = catalog
        .iter()
        .filter(|(_, set)| set.sequence_names().next().is_some())
        .collect();
    if animated.is_empty() {
        return None;
    }
    let (name, set) = animated[fastrand::usize(..animated.len())];
    let sequence = set.sequence_names().next()?.to_string();
    let x = camera.x + fastrand::i32(0..camera.w.max(1));
    let y = camera.y + fastrand::i32(0..camera.h.max(1));
    match scheduler.register(
        set.clone(),
        &sequence,
        Placement::at(x, y).with_z(PREVIEW_Z),
    ) {
        Ok(sprite) => {
            info!("preview {name}::{sequence} at ({x}, {y})");
            Some(sprite)
        }
        Err(e) => {
            warn!("could not preview {name}::{sequence}: {e}");
            None
        }
    }
}

/// Load the catalog with CPU images and print it. Returns the exit code.
fn dump_catalog(config: &EngineConfig) -> i32 {
    let mut assets = AssetManager::new();
    if let Err(e) = assets.load_assets(&mut ImageLoader, &config.asset_dir) {
        eprintln!("Error: {e}");
        return 1;
    }
    let catalog = match assets.catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    match serde_json::to_string_pretty(&catalog.to_definition()) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("Error serializing catalog: {e}");
            1
        }
    }
}
