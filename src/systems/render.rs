use bevy_ecs::prelude::*;
use log::warn;

use crate::components::animation::Animation;
use crate::components::hidden::Hidden;
use crate::components::mapposition::MapPosition;
use crate::components::scale::Scale;
use crate::components::zindex::{SpawnOrder, ZIndex};
use crate::resources::camera2d::Camera;
use crate::resources::framestore::{Frame, FrameId, FrameStore};

/// Destination rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Render target that can blit a whole frame into a rectangle.
pub trait Canvas<F> {
    fn draw_frame(&mut self, frame: &F, dst: DrawRect);
}

/// Natural size multiplied by `scale`, truncated to whole pixels.
pub fn scaled_size((w, h): (i32, i32), scale: f64) -> (i32, i32) {
    ((w as f64 * scale) as i32, (h as f64 * scale) as i32)
}

/// Where a frame lands on screen: camera-relative position plus the step's
/// offset, sized by the sequence scale times the instance scale.
pub fn frame_rect(
    screen: (i32, i32),
    offset: (i32, i32),
    natural: (i32, i32),
    scale: f64,
) -> DrawRect {
    let (w, h) = scaled_size(natural, scale);
    DrawRect {
        x: screen.0 + offset.0,
        y: screen.1 + offset.1,
        w,
        h,
    }
}

/// Fit a fixed-resolution backbuffer into a window, keeping its aspect
/// ratio and centering it on the axis with spare room.
pub fn letterbox(virtual_size: (i32, i32), screen: (i32, i32)) -> DrawRect {
    let (vw, vh) = virtual_size;
    let (sw, sh) = screen;
    if vw <= 0 || vh <= 0 {
        return DrawRect { x: 0, y: 0, w: 0, h: 0 };
    }
    let scale = (sw as f64 / vw as f64).min(sh as f64 / vh as f64);
    let w = (vw as f64 * scale) as i32;
    let h = (vh as f64 * scale) as i32;
    DrawRect {
        x: (sw - w) / 2,
        y: (sh - h) / 2,
        w,
        h,
    }
}

struct DrawItem {
    z: ZIndex,
    order: SpawnOrder,
    frame: FrameId,
    pos: MapPosition,
    offset: (i32, i32),
    scale: f64,
}

/// Draw every visible animation once, lowest [`ZIndex`] first.
///
/// Equal z-indices draw in registration order. Returns the number of frames
/// drawn.
pub fn composite_pass<F, C>(
    world: &mut World,
    camera: &Camera,
    frames: &FrameStore<F>,
    canvas: &mut C,
) -> usize
where
    F: Frame,
    C: Canvas<F>,
{
    // Collect, sort by (z, registration), then draw.
    let mut to_draw: Vec<DrawItem> = {
        let mut q = world.query_filtered::<
            (&Animation, &MapPosition, &ZIndex, &Scale, &SpawnOrder),
            Without<Hidden>,
        >();
        q.iter(world)
            .filter_map(|(anim, pos, z, scale, order)| {
                let seq = anim.sequence()?;
                let step = seq.frame(anim.frame_index)?;
                Some(DrawItem {
                    z: *z,
                    order: *order,
                    frame: step.frame,
                    pos: *pos,
                    offset: step.offset,
                    scale: seq.scale() * scale.0,
                })
            })
            .collect()
    };

    to_draw.sort_by_key(|item| (item.z, item.order));

    let mut drawn = 0;
    for item in &to_draw {
        let Some(frame) = frames.get(item.frame) else {
            warn!("frame {:?} missing from store, skipping", item.frame);
            continue;
        };
        let dst = frame_rect(
            camera.to_screen(item.pos.x, item.pos.y),
            item.offset,
            frame.size(),
            item.scale,
        );
        canvas.draw_frame(frame, dst);
        drawn += 1;
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_applies_camera_offset_and_scale() {
        let rect = frame_rect((10 - 4, 20 - 5), (3, -4), (16, 8), 2.5);
        assert_eq!(
            rect,
            DrawRect {
                x: 9,
                y: 11,
                w: 40,
                h: 20
            }
        );
    }

    #[test]
    fn letterbox_pillarboxes_wide_windows() {
        assert_eq!(
            letterbox((640, 360), (1920, 720)),
            DrawRect {
                x: 320,
                y: 0,
                w: 1280,
                h: 720
            }
        );
    }

    #[test]
    fn letterbox_bands_tall_windows() {
        assert_eq!(
            letterbox((640, 360), (640, 480)),
            DrawRect {
                x: 0,
                y: 60,
                w: 640,
                h: 360
            }
        );
        assert_eq!(letterbox((0, 360), (640, 480)).w, 0);
    }

    #[test]
    fn scaled_size_truncates() {
        assert_eq!(scaled_size((3, 3), 1.5), (4, 4));
        assert_eq!(scaled_size((10, 7), 0.5), (5, 3));
    }
}
