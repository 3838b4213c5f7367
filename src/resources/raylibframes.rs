//! Raylib-backed frames and canvas.
//!
//! - [`TextureLoader`] uploads frames as GPU textures; needs an open window.
//! - [`ImageLoader`] decodes frames into CPU images; works headless and is
//!   enough to inspect a catalog.
//! - [`RaylibCanvas`] blits textures with any raylib draw handle.
//!
//! Note: textures belong to the main thread, so the frame store holding them
//! must stay there too.

use std::path::Path;

use raylib::prelude::*;

use crate::resources::framestore::{Frame, FrameLoader};
use crate::systems::render::{Canvas, DrawRect};

impl Frame for Texture2D {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

impl Frame for Image {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

/// Loads frame files as textures.
pub struct TextureLoader<'a> {
    pub rl: &'a mut RaylibHandle,
    pub thread: &'a RaylibThread,
}

impl FrameLoader for TextureLoader<'_> {
    type Frame = Texture2D;

    fn load_frame(&mut self, path: &Path) -> Option<Texture2D> {
        // Scanning past the last frame is routine; skip raylib's warning for it.
        if !path.is_file() {
            return None;
        }
        let path = path.to_str()?;
        self.rl.load_texture(self.thread, path).ok()
    }
}

/// Loads frame files as CPU-side images.
#[derive(Debug, Default)]
pub struct ImageLoader;

impl FrameLoader for ImageLoader {
    type Frame = Image;

    fn load_frame(&mut self, path: &Path) -> Option<Image> {
        if !path.is_file() {
            return None;
        }
        Image::load_image(path.to_str()?).ok()
    }
}

/// [`Canvas`] over a raylib draw handle.
pub struct RaylibCanvas<'a, D: RaylibDraw>(pub &'a mut D);

impl<D: RaylibDraw> Canvas<Texture2D> for RaylibCanvas<'_, D> {
    fn draw_frame(&mut self, frame: &Texture2D, dst: DrawRect) {
        let src = Rectangle {
            x: 0.0,
            y: 0.0,
            width: frame.width as f32,
            height: frame.height as f32,
        };
        let dest = Rectangle {
            x: dst.x as f32,
            y: dst.y as f32,
            width: dst.w as f32,
            height: dst.h as f32,
        };
        self.0
            .draw_texture_pro(frame, src, dest, Vector2::zero(), 0.0, Color::WHITE);
    }
}
