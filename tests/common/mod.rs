//! Shared fixtures for the integration tests.
//!
//! Asset directories are written to a scratch folder under the system temp
//! dir. Frame "images" are tiny text files holding `<w>x<h>`, so the real
//! directory layout and scanning can be exercised without an image decoder.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tilesprite::resources::assetmanager::AssetManager;
use tilesprite::resources::framestore::{Frame, FrameLoader};
use tilesprite::systems::render::{Canvas, DrawRect};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "tilesprite_{label}_{}_{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` to `relative`, creating parent folders.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Write frames `0..sizes.len()` of `asset`.
    pub fn frames(&self, asset: &str, sizes: &[(i32, i32)]) {
        for (i, (w, h)) in sizes.iter().enumerate() {
            self.write(&format!("{asset}/{asset}_{i}.png"), &format!("{w}x{h}"));
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// A decoded test frame: its file stem and size.
#[derive(Debug, Clone, PartialEq)]
pub struct TestFrame {
    pub name: String,
    pub w: i32,
    pub h: i32,
}

impl Frame for TestFrame {
    fn size(&self) -> (i32, i32) {
        (self.w, self.h)
    }
}

/// Reads `<w>x<h>` frame files and records every path it was asked for.
#[derive(Debug, Default)]
pub struct TextFrameLoader {
    pub requested: Vec<PathBuf>,
}

impl FrameLoader for TextFrameLoader {
    type Frame = TestFrame;

    fn load_frame(&mut self, path: &Path) -> Option<TestFrame> {
        self.requested.push(path.to_path_buf());
        let text = std::fs::read_to_string(path).ok()?;
        let (w, h) = text.trim().split_once('x')?;
        Some(TestFrame {
            name: path.file_stem()?.to_str()?.to_string(),
            w: w.parse().ok()?,
            h: h.parse().ok()?,
        })
    }
}

/// Canvas that records what was drawn, in order.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub draws: Vec<(String, DrawRect)>,
}

impl Canvas<TestFrame> for RecordingCanvas {
    fn draw_frame(&mut self, frame: &TestFrame, dst: DrawRect) {
        self.draws.push((frame.name.clone(), dst));
    }
}

impl RecordingCanvas {
    pub fn names(&self) -> Vec<&str> {
        self.draws.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// Write `objects.txt` plus frames and load the directory.
pub fn load_assets(
    objects: &str,
    frames: &[(&str, &[(i32, i32)])],
) -> (ScratchDir, AssetManager<TestFrame>) {
    let dir = ScratchDir::new("assets");
    dir.write("objects.txt", objects);
    for (asset, sizes) in frames {
        dir.frames(asset, sizes);
    }
    let mut assets = AssetManager::new();
    assets
        .load_assets(&mut TextFrameLoader::default(), dir.path())
        .unwrap();
    (dir, assets)
}
