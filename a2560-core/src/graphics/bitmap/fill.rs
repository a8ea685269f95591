use anyhow::Result;

use crate::graphics::{rect::Rectangle, ColorIndex};

use super::{Bitmap, Canvas};

impl Bitmap {
    /// Fill every visible pixel of the bitmap with the given colour
    pub fn fill_memory(&mut self, color: ColorIndex) -> Result<()> {
        self.with_pixels_mut(|p| p.fill(color))
    }

    /// Fill `width x height` pixels starting at (x, y). Anything outside the bitmap is clipped.
    pub fn fill_box(&mut self, x: i16, y: i16, width: i16, height: i16, color: ColorIndex) -> Result<()> {
        let (x, y) = (x as i32, y as i32);
        let (width, height) = (width as i32, height as i32);

        self.canvas_mut(|canvas| {
            for row in y..y + height {
                canvas.hspan(x, x + width - 1, row, color);
            }
        })
    }

    /// Fill the inclusive rectangle
    pub fn fill_box_rect(&mut self, rect: &Rectangle, color: ColorIndex) -> Result<()> {
        self.fill_box(rect.min_x, rect.min_y, rect.width(), rect.height(), color)
    }

    /// Paint the 4-connected region around (x, y) that is not already `color`.
    /// Pixels that already have `color` bound the region. Returns the number of pixels painted.
    #[tracing::instrument(skip_all)]
    pub fn flood_fill(&mut self, x: i16, y: i16, color: ColorIndex) -> Result<usize> {
        self.require_xy(x, y)?;

        self.canvas_mut(|canvas| scanline_fill(canvas, x as i32, y as i32, color))
    }
}

/// Span based fill with an explicit work stack.
/// Each entry is a seed point; its whole run on that row is painted, then the rows
/// above and below are scanned for new runs.
pub(crate) fn scanline_fill(canvas: &mut Canvas<'_>, x: i32, y: i32, color: u8) -> usize {
    let fillable = |c: &Canvas<'_>, x: i32, y: i32| matches!(c.get(x, y), Some(p) if p != color);

    let mut painted = 0;
    let mut stack = vec![(x, y)];

    while let Some((sx, sy)) = stack.pop() {
        if !fillable(canvas, sx, sy) {
            continue;
        }

        let mut left = sx;
        while fillable(canvas, left - 1, sy) {
            left -= 1;
        }

        let mut right = sx;
        while fillable(canvas, right + 1, sy) {
            right += 1;
        }

        canvas.hspan(left, right, sy, color);
        painted += (right - left + 1) as usize;

        for ny in [sy - 1, sy + 1] {
            if ny < 0 || ny >= canvas.height() {
                continue;
            }

            let mut in_run = false;

            for nx in left..=right {
                if fillable(canvas, nx, ny) {
                    if !in_run {
                        stack.push((nx, ny));
                        in_run = true;
                    }
                }
                else {
                    in_run = false;
                }
            }
        }
    }

    trace!("flood fill painted {} pixels", painted);

    painted
}
