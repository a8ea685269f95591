use anyhow::Result;

use crate::{common::clamp_to_i16, graphics::{rect::Rectangle, ColorIndex}};

use super::{Bitmap, BitmapError, Canvas, FillMode, Quadrants};

const ROUND_BOX_MIN_RADIUS: i16 = 3;
const ROUND_BOX_MAX_RADIUS: i16 = 20;

/// Points of one circle quadrant as positive (dx, dy) offsets, midpoint algorithm.
/// Includes both axis end points; a point may appear twice.
pub(crate) fn quadrant_points(radius: i32) -> Vec<(i32, i32)> {
    let mut points = vec![(0, radius), (radius, 0)];

    let mut f = 1 - radius;
    let mut ddf_x = 0;
    let mut ddf_y = -2 * radius;
    let mut x = 0;
    let mut y = radius;

    while x < y {
        if f >= 0 {
            y -= 1;
            ddf_y += 2;
            f += ddf_y;
        }

        x += 1;
        ddf_x += 2;
        f += ddf_x + 1;

        points.push((x, y));
        points.push((y, x));
    }

    points
}

fn plot_quadrants(canvas: &mut Canvas<'_>, cx: i32, cy: i32, points: &[(i32, i32)], quadrants: Quadrants, color: u8) {
    for &(dx, dy) in points {
        if quadrants.contains(Quadrants::SE) {
            canvas.plot(cx + dx, cy + dy, color);
        }

        if quadrants.contains(Quadrants::SW) {
            canvas.plot(cx - dx, cy + dy, color);
        }

        if quadrants.contains(Quadrants::NE) {
            canvas.plot(cx + dx, cy - dy, color);
        }

        if quadrants.contains(Quadrants::NW) {
            canvas.plot(cx - dx, cy - dy, color);
        }
    }
}

impl Bitmap {
    /// Draw a line between two points using Bresenham.
    /// The start point must be on the bitmap; the rest of the line is clipped.
    pub fn draw_line(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, color: ColorIndex) -> Result<()> {
        self.require_xy(x1, y1)?;

        let (mut x, mut y) = (x1 as i32, y1 as i32);
        let (x2, y2) = (x2 as i32, y2 as i32);

        let dx = (x2 - x).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let dy = (y2 - y).abs();
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = (if dx > dy { dx } else { -dy }) / 2;

        self.canvas_mut(|canvas| loop {
            canvas.plot(x, y, color);

            if x == x2 && y == y2 {
                break;
            }

            let e2 = err;

            if e2 > -dx {
                err -= dy;
                x += sx;
            }

            if e2 < dy {
                err += dx;
                y += sy;
            }
        })
    }

    /// Horizontal line of `len` pixels going right from (x, y)
    pub fn draw_hline(&mut self, x: i16, y: i16, len: i16, color: ColorIndex) -> Result<()> {
        self.require_xy(x, y)?;

        let (x, y) = (x as i32, y as i32);
        self.canvas_mut(|canvas| canvas.hspan(x, x + len as i32 - 1, y, color))
    }

    /// Vertical line of `len` pixels going down from (x, y)
    pub fn draw_vline(&mut self, x: i16, y: i16, len: i16, color: ColorIndex) -> Result<()> {
        self.require_xy(x, y)?;

        let (x, y) = (x as i32, y as i32);
        let bottom = (y + len as i32).min(self.height as i32);

        self.canvas_mut(|canvas| {
            for row in y..bottom {
                canvas.plot(x, row, color);
            }
        })
    }

    /// Outline of the box with corners (x1, y1) and (x2, y2), both inclusive
    pub fn draw_box_coords(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, color: ColorIndex) -> Result<()> {
        self.require_xy(x1, y1)?;
        self.require_xy(x2, y2)?;

        if x1 > x2 || y1 > y2 {
            error!("illegal coordinates {} to {}, {} to {}", x1, x2, y1, y2);
            return Err(BitmapError::InvalidCoordinates.into());
        }

        let dx = x2 - x1 + 1;
        let dy = y2 - y1 + 1;

        self.draw_hline(x1, y1, dx, color)?;
        self.draw_vline(x2, y1, dy, color)?;
        self.draw_hline(x1, y2, dx, color)?;
        self.draw_vline(x1, y1, dy, color)
    }

    pub fn draw_box_rect(&mut self, rect: &Rectangle, color: ColorIndex) -> Result<()> {
        self.draw_box_coords(rect.min_x, rect.min_y, rect.max_x, rect.max_y, color)
    }

    fn require_box(&self, x: i16, y: i16, width: i16, height: i16) -> Result<()> {
        if width <= 0 || height <= 0 {
            error!("illegal box size {} x {}", width, height);
            return Err(BitmapError::InvalidDimensions { width, height }.into());
        }

        self.require_xy(x, y)?;

        let x2 = x as i32 + width as i32 - 1;
        let y2 = y as i32 + height as i32 - 1;

        if x2 >= self.width as i32 || y2 >= self.height as i32 {
            error!("illegal coordinates. x2={}, y2={}", x2, y2);
            return Err(BitmapError::CoordinateOutOfBounds { x: clamp_to_i16(x2), y: clamp_to_i16(y2) }.into());
        }

        Ok(())
    }

    /// Box of `width x height` pixels with its top-left at (x, y)
    pub fn draw_box(&mut self, x: i16, y: i16, width: i16, height: i16, color: ColorIndex, mode: FillMode) -> Result<()> {
        self.require_box(x, y, width, height)?;

        match mode {
            FillMode::Fill => self.fill_box(x, y, width, height, color),
            FillMode::Outline => self.draw_box_coords(x, y, x + width - 1, y + height - 1, color),
        }
    }

    /// Box of `width x height` pixels with rounded corners.
    /// The radius is held to 3..=20 and then to what fits in the box.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_round_box(&mut self, x: i16, y: i16, width: i16, height: i16, radius: i16, color: ColorIndex, mode: FillMode) -> Result<()> {
        self.require_box(x, y, width, height)?;

        let radius = radius
            .clamp(ROUND_BOX_MIN_RADIUS, ROUND_BOX_MAX_RADIUS)
            .min((width - 1) / 2)
            .min((height - 1) / 2);

        if radius < 1 {
            debug!("box {}x{} too small for rounded corners", width, height);
            return self.draw_box(x, y, width, height, color, mode);
        }

        let r = radius as i32;
        let (left, top) = (x as i32, y as i32);
        let right = left + width as i32 - 1;
        let bottom = top + height as i32 - 1;

        // arc centres
        let (cx_l, cx_r) = (left + r, right - r);
        let (cy_t, cy_b) = (top + r, bottom - r);

        let points = quadrant_points(r);

        self.canvas_mut(|canvas| match mode {
            FillMode::Outline => {
                plot_quadrants(canvas, cx_l, cy_t, &points, Quadrants::NW, color);
                plot_quadrants(canvas, cx_r, cy_t, &points, Quadrants::NE, color);
                plot_quadrants(canvas, cx_l, cy_b, &points, Quadrants::SW, color);
                plot_quadrants(canvas, cx_r, cy_b, &points, Quadrants::SE, color);

                canvas.hspan(cx_l, cx_r, top, color);
                canvas.hspan(cx_l, cx_r, bottom, color);

                for row in cy_t..=cy_b {
                    canvas.plot(left, row, color);
                    canvas.plot(right, row, color);
                }
            },
            FillMode::Fill => {
                // widest arc offset for each distance from the arc centre row
                let mut extent = vec![0i32; (r + 1) as usize];
                for &(dx, dy) in &points {
                    extent[dy as usize] = extent[dy as usize].max(dx);
                }

                for row in top..=bottom {
                    let dy = if row < cy_t {
                        cy_t - row
                    }
                    else if row > cy_b {
                        row - cy_b
                    }
                    else {
                        0
                    };

                    let e = extent[dy as usize];
                    canvas.hspan(cx_l - e, cx_r + e, row, color);
                }
            },
        })
    }

    /// Circle around (cx, cy); the centre must be on the bitmap
    pub fn draw_circle(&mut self, cx: i16, cy: i16, radius: i16, color: ColorIndex) -> Result<()> {
        self.require_xy(cx, cy)?;

        self.draw_circle_quadrants(cx, cy, radius, color, Quadrants::all())
    }

    /// Draw the selected quadrants of a circle. Points off the bitmap are skipped,
    /// so the centre may lie anywhere.
    pub fn draw_circle_quadrants(&mut self, cx: i16, cy: i16, radius: i16, color: ColorIndex, quadrants: Quadrants) -> Result<()> {
        if radius < 0 {
            warn!("negative radius {}, nothing drawn", radius);
            return Ok(());
        }

        let points = quadrant_points(radius as i32);
        self.canvas_mut(|canvas| plot_quadrants(canvas, cx as i32, cy as i32, &points, quadrants, color))
    }
}
