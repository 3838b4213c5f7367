//! Camera rectangle used when compositing.
//!
//! Positions of animations are world coordinates; compositing subtracts the
//! camera's top-left corner to get screen coordinates. Width and height
//! describe the visible area and are kept for collaborators that size the
//! render target from it.

/// Visible world rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Camera {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// World to screen.
    pub fn to_screen(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.x, y - self.y)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }
}
