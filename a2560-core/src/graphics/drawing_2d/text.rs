use anyhow::Result;

use crate::{
    common::clamp_to_i16,
    graphics::bitmap::{Bitmap, BitmapError, Canvas},
};

use super::font::Font;

/// Paint the set bits of one glyph with its top-left at (x, y). Clear bits are left alone.
fn draw_glyph(canvas: &mut Canvas<'_>, rows: &[u8], width: usize, height: usize, x: i32, y: i32, color: u8) {
    let row_bytes = (width + 7) >> 3;

    for row in 0..height {
        let data = &rows[row * row_bytes..(row + 1) * row_bytes];

        for col in 0..width {
            if data[col >> 3] & (0x80 >> (col & 7)) != 0 {
                canvas.plot(x + col as i32, y + row as i32, color);
            }
        }
    }
}

impl Bitmap {
    /// Draw a string at the pen position using the pen font and colour.
    /// Glyph tops sit on the pen y. `num_chars` limits how much of the string is drawn.
    /// The pen x moves past the drawn text. Returns the number of chars drawn.
    pub fn draw_string(&mut self, text: &str, num_chars: Option<usize>) -> Result<usize> {
        let font = match self.font() {
            Some(f) => f,
            None => {
                error!("bitmap has no font to draw with");
                return Err(BitmapError::NoFont.into());
            }
        };

        let limit = num_chars.unwrap_or(usize::MAX);
        let (start_x, y, color) = (self.x() as i32, self.y() as i32, self.color());

        let (count, end_x) = self.canvas_mut(|canvas| draw_chars(canvas, &font, text, limit, start_x, y, color))?;

        self.x = clamp_to_i16(end_x);

        Ok(count)
    }
}

fn draw_chars(canvas: &mut Canvas<'_>, font: &Font, text: &str, limit: usize, x: i32, y: i32, color: u8) -> (usize, i32) {
    let height = font.height() as usize;
    let mut pen_x = x;
    let mut count = 0;

    for ch in text.chars().take(limit) {
        match font.glyph(ch) {
            Some((rows, width)) => {
                draw_glyph(canvas, rows, width, height, pen_x, y, color);
                pen_x += width as i32;
            },
            None => trace!("char {:?} is not in font {}", ch, font.name()),
        }

        count += 1;
    }

    (count, pen_x)
}

#[cfg(test)]
pub mod tests {
    use std::rc::Rc;

    use function_name::named;

    use crate::graphics::{bitmap::MemoryKind, drawing_2d::font::tests::build_test_font};

    use super::*;

    #[test]
    #[named]
    fn draws_set_bits_only() {
        crate::test_common::setup();

        let font = Rc::new(build_test_font());
        let mut bitmap = Bitmap::new(20, 4, Some(font), MemoryKind::NotInVram).unwrap();
        bitmap.fill_memory(9).unwrap();
        bitmap.set_color(1);
        bitmap.set_xy(1, 1).unwrap();

        let drawn = bitmap.draw_string("AB", None).unwrap();
        assert_eq!(drawn, 2);
        assert_eq!(bitmap.x(), 1 + 3 + 5);
        assert_eq!(bitmap.y(), 1);

        // 'A' row 0 = 111, row 1 = 101
        assert_eq!(bitmap.get_pixel_at_xy(1, 1).unwrap(), 1);
        assert_eq!(bitmap.get_pixel_at_xy(3, 1).unwrap(), 1);
        assert_eq!(bitmap.get_pixel_at_xy(2, 2).unwrap(), 9);
        // 'B' starts at x = 4
        assert_eq!(bitmap.get_pixel_at_xy(8, 1).unwrap(), 1);
        assert_eq!(bitmap.get_pixel_at_xy(5, 2).unwrap(), 9);
        assert_eq!(bitmap.get_pixel_at_xy(8, 2).unwrap(), 1);

        crate::display_8bpp!(function_name!(), &bitmap);
    }

    #[test]
    fn wide_glyph_and_clipping() {
        crate::test_common::setup();

        let font = Rc::new(build_test_font());
        let mut bitmap = Bitmap::new(8, 2, None, MemoryKind::NotInVram).unwrap();

        assert!(bitmap.draw_string("A", None).is_err());

        bitmap.set_font(font);
        bitmap.set_color(3);
        bitmap.set_xy(-2, 0).unwrap();

        // 'C' is 10 wide, second byte of each row holds pixels 8 and 9
        assert_eq!(bitmap.draw_string("CCC", Some(1)).unwrap(), 1);
        assert_eq!(bitmap.x(), 8);

        // row 0 is all set: pixels -2..=7 land on columns 0..=5
        for x in 0..6 {
            assert_eq!(bitmap.get_pixel_at_xy(x, 0).unwrap(), 3);
        }
        // row 1 = 1000_0000 01: pixel 0 is off screen, pixel 9 lands on column 7
        assert_eq!(bitmap.get_pixel_at_xy(0, 1).unwrap(), 0);
        assert_eq!(bitmap.get_pixel_at_xy(7, 1).unwrap(), 3);
    }

    #[test]
    fn unknown_chars_count_but_do_not_move() {
        crate::test_common::setup();

        let mut bitmap = Bitmap::new(16, 4, Some(Rc::new(build_test_font())), MemoryKind::NotInVram).unwrap();
        assert_eq!(bitmap.draw_string("zA", None).unwrap(), 2);
        assert_eq!(bitmap.x(), 3);
    }
}
