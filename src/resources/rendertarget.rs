//! Render target for fixed-resolution compositing.
//!
//! The scheduler composites into a texture at the game's internal
//! resolution, which is then scaled into the window with
//! [`letterbox`](crate::systems::render::letterbox) so the aspect ratio is
//! preserved.

use raylib::ffi::{self, TextureFilter};
use raylib::prelude::*;

use crate::systems::render::letterbox;

/// Backbuffer at the game's internal resolution.
///
/// # Note
/// `RenderTexture2D` holds GPU resources and must stay on the main thread.
pub struct RenderTarget {
    /// The underlying raylib render texture.
    pub texture: RenderTexture2D,
    /// Game's internal render width in pixels.
    pub game_width: u32,
    /// Game's internal render height in pixels.
    pub game_height: u32,
}

impl RenderTarget {
    /// Create a new render target with nearest-neighbor filtering.
    pub fn new(
        rl: &mut RaylibHandle,
        th: &RaylibThread,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = rl
            .load_render_texture(th, width, height)
            .map_err(|e| format!("Failed to create render texture: {}", e))?;

        // Pixel art frames should stay sharp when the backbuffer is scaled up.
        unsafe {
            ffi::SetTextureFilter(texture.texture, TextureFilter::TEXTURE_FILTER_POINT as i32);
        }

        Ok(Self {
            texture,
            game_width: width,
            game_height: height,
        })
    }

    /// Get the source rectangle for drawing this texture.
    ///
    /// Returns a rectangle with negative height to flip the Y axis,
    /// compensating for OpenGL's inverted texture coordinates.
    pub fn source_rect(&self) -> Rectangle {
        Rectangle {
            x: 0.0,
            y: 0.0,
            width: self.game_width as f32,
            height: -(self.game_height as f32), // Negative to flip Y
        }
    }

    /// Where the backbuffer lands in a window of the given size.
    pub fn dest_rect(&self, window_width: i32, window_height: i32) -> Rectangle {
        let r = letterbox(
            (self.game_width as i32, self.game_height as i32),
            (window_width, window_height),
        );
        Rectangle {
            x: r.x as f32,
            y: r.y as f32,
            width: r.w as f32,
            height: r.h as f32,
        }
    }

    /// Draw the backbuffer into the window, black bars around it.
    pub fn present(&self, d: &mut RaylibDrawHandle, window_width: i32, window_height: i32) {
        d.clear_background(Color::BLACK);
        d.draw_texture_pro(
            self.texture.texture(),
            self.source_rect(),
            self.dest_rect(window_width, window_height),
            Vector2::zero(),
            0.0,
            Color::WHITE,
        );
    }
}
