//! Engine configuration.
//!
//! Settings loaded from an INI configuration file. Provides defaults for
//! safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [assets]
//! dir = ./assets
//!
//! [map]
//! path = ./assets/maps/demo.map
//! scale = 2.0
//!
//! [render]
//! width = 640
//! height = 360
//!
//! [window]
//! width = 1280
//! height = 720
//! target_fps = 60
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_ASSET_DIR: &str = "./assets";
const DEFAULT_MAP_SCALE: f64 = 1.0;
const DEFAULT_RENDER_WIDTH: u32 = 640;
const DEFAULT_RENDER_HEIGHT: u32 = 360;
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Engine configuration resource.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory holding `objects.txt` and the frame folders.
    pub asset_dir: PathBuf,
    /// Map file to load at startup, if any.
    pub map_path: Option<PathBuf>,
    /// Per-tile scale for the startup map.
    pub map_scale: f64,
    /// Internal render width in pixels.
    pub render_width: u32,
    /// Internal render height in pixels.
    pub render_height: u32,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            map_path: None,
            map_scale: DEFAULT_MAP_SCALE,
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
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
        self.apply(&config);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [assets] section
        if let Some(dir) = config.get("assets", "dir") {
            self.asset_dir = PathBuf::from(dir);
        }

        // [map] section
        if let Some(path) = config.get("map", "path") {
            self.map_path = Some(PathBuf::from(path));
        }
        if let Some(scale) = config.getfloat("map", "scale").ok().flatten() {
            self.map_scale = scale;
        }

        // [render] section
        if let Some(width) = config.getuint("render", "width").ok().flatten() {
            self.render_width = width as u32;
        }
        if let Some(height) = config.getuint("render", "height").ok().flatten() {
            self.render_height = height as u32;
        }

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

        info!(
            "Loaded config: assets={}, map={:?} x{}, {}x{} render, {}x{} window, fps={}",
            self.asset_dir.display(),
            self.map_path,
            self.map_scale,
            self.render_width,
            self.render_height,
            self.window_width,
            self.window_height,
            self.target_fps
        );
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("assets", "dir", Some(self.asset_dir.display().to_string()));
        if let Some(path) = &self.map_path {
            config.set("map", "path", Some(path.display().to_string()));
        }
        config.set("map", "scale", Some(self.map_scale.to_string()));

        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));

        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

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

    /// Get the render resolution.
    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let mut config = EngineConfig::new();
        config
            .load_from_str("[window]\nwidth = 800\n")
            .unwrap();
        assert_eq!(config.window_size(), (800, DEFAULT_WINDOW_HEIGHT));
        assert_eq!(config.asset_dir, PathBuf::from(DEFAULT_ASSET_DIR));
        assert_eq!(config.map_path, None);
        assert_eq!(config.map_scale, 1.0);
    }

    #[test]
    fn reads_asset_and_map_sections() {
        let mut config = EngineConfig::new();
        config
            .load_from_str(
                "[assets]\ndir = data/art\n[map]\npath = data/level1.map\nscale = 2.5\n[render]\nwidth = 320\nheight = 200\n",
            )
            .unwrap();
        assert_eq!(config.asset_dir, PathBuf::from("data/art"));
        assert_eq!(config.map_path, Some(PathBuf::from("data/level1.map")));
        assert_eq!(config.map_scale, 2.5);
        assert_eq!(config.render_size(), (320, 200));
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = std::env::temp_dir().join(format!(
            "tilesprite-config-{}.ini",
            std::process::id()
        ));
        let mut config = EngineConfig::with_path(&path);
        config.map_path = Some(PathBuf::from("maps/a.map"));
        config.target_fps = 30;
        config.save_to_file().unwrap();

        let mut loaded = EngineConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut config = EngineConfig::with_path("/nonexistent/tilesprite/config.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.target_fps, DEFAULT_TARGET_FPS);
    }
}
