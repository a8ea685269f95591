use anyhow::Result;

use crate::graphics::rect::Rectangle;

use super::{Bitmap, BitmapError};

/// A copy region after clipping: source origin, destination origin, size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlitRegion {
    pub src_x: usize,
    pub src_y: usize,
    pub dst_x: usize,
    pub dst_y: usize,
    pub width: usize,
    pub height: usize,
}

/// Clip a copy of `width x height` pixels from (src_x, src_y) to (dst_x, dst_y)
/// against both bitmap sizes. A negative origin on either side trims the same
/// number of pixels from the other side.
pub(crate) fn clip_blit(
    src_size: (i32, i32),
    src_origin: (i32, i32),
    dst_size: (i32, i32),
    dst_origin: (i32, i32),
    size: (i32, i32),
) -> Option<BlitRegion> {
    let (mut src_x, mut src_y) = src_origin;
    let (mut dst_x, mut dst_y) = dst_origin;
    let (mut width, mut height) = size;

    if src_x < 0 {
        width += src_x;
        dst_x -= src_x;
        src_x = 0;
    }

    if src_y < 0 {
        height += src_y;
        dst_y -= src_y;
        src_y = 0;
    }

    if dst_x < 0 {
        width += dst_x;
        src_x -= dst_x;
        dst_x = 0;
    }

    if dst_y < 0 {
        height += dst_y;
        src_y -= dst_y;
        dst_y = 0;
    }

    width = width.min(src_size.0 - src_x).min(dst_size.0 - dst_x);
    height = height.min(src_size.1 - src_y).min(dst_size.1 - dst_y);

    if width <= 0 || height <= 0 {
        return None;
    }

    Some(BlitRegion {
        src_x: src_x as usize,
        src_y: src_y as usize,
        dst_x: dst_x as usize,
        dst_y: dst_y as usize,
        width: width as usize,
        height: height as usize,
    })
}

fn copy_region(src: &[u8], src_stride: usize, dst: &mut [u8], dst_stride: usize, region: &BlitRegion) {
    for row in 0..region.height {
        let s = (region.src_y + row) * src_stride + region.src_x;
        let d = (region.dst_y + row) * dst_stride + region.dst_x;
        dst[d..d + region.width].copy_from_slice(&src[s..s + region.width]);
    }
}

fn extract_region(src: &[u8], src_stride: usize, region: &BlitRegion) -> Vec<u8> {
    let mut out = Vec::with_capacity(region.width * region.height);

    for row in 0..region.height {
        let s = (region.src_y + row) * src_stride + region.src_x;
        out.extend_from_slice(&src[s..s + region.width]);
    }

    out
}

fn region_rect(region: &BlitRegion) -> Rectangle {
    Rectangle::from_xywh(
        region.dst_x as i16,
        region.dst_y as i16,
        region.width as i16,
        region.height as i16,
    )
}

impl Bitmap {
    /// Blit a rect from `src` to `dst`, clipping against both bitmaps.
    /// Returns the destination rectangle that was written, or `None` when
    /// nothing was left to copy after clipping.
    #[allow(clippy::too_many_arguments)]
    pub fn blit(
        src: &Bitmap,
        src_x: i16,
        src_y: i16,
        dst: &mut Bitmap,
        dst_x: i16,
        dst_y: i16,
        width: i16,
        height: i16,
    ) -> Result<Option<Rectangle>> {
        if !src.has_storage() || !dst.has_storage() {
            error!("passed bitmap had no pixel storage");
            return Err(BitmapError::NoStorage.into());
        }

        let region = clip_blit(
            (src.width as i32, src.height as i32),
            (src_x as i32, src_y as i32),
            (dst.width as i32, dst.height as i32),
            (dst_x as i32, dst_y as i32),
            (width as i32, height as i32),
        );

        let region = match region {
            Some(r) => r,
            None => {
                info!("blit of {}x{} from ({}, {}) to ({}, {}) was clipped away", width, height, src_x, src_y, dst_x, dst_y);
                return Ok(None);
            }
        };

        let src_stride = src.width as usize;
        let dst_stride = dst.width as usize;

        if src.shares_memory_with(dst) {
            // both bitmaps sit in the same VRAM, the RefCell can only be held once
            let temp = src.with_pixels(|s| extract_region(s, src_stride, &region))?;
            let staged = BlitRegion { src_x: 0, src_y: 0, ..region };

            dst.with_pixels_mut(|d| copy_region(&temp, region.width, d, dst_stride, &staged))?;
        }
        else {
            src.with_pixels(|s| {
                dst.with_pixels_mut(|d| copy_region(s, src_stride, d, dst_stride, &region))
            })??;
        }

        Ok(Some(region_rect(&region)))
    }

    /// Blit the inclusive `src_rect` of `src` to (dst_x, dst_y) in `dst`
    pub fn blit_rect(src: &Bitmap, src_rect: &Rectangle, dst: &mut Bitmap, dst_x: i16, dst_y: i16) -> Result<Option<Rectangle>> {
        Bitmap::blit(
            src,
            src_rect.min_x,
            src_rect.min_y,
            dst,
            dst_x,
            dst_y,
            src_rect.width(),
            src_rect.height(),
        )
    }

    /// Copy a rect to another spot of the same bitmap. Overlap is fine.
    pub fn blit_within(&mut self, src_x: i16, src_y: i16, dst_x: i16, dst_y: i16, width: i16, height: i16) -> Result<Option<Rectangle>> {
        let size = (self.width as i32, self.height as i32);

        let region = match clip_blit(size, (src_x as i32, src_y as i32), size, (dst_x as i32, dst_y as i32), (width as i32, height as i32)) {
            Some(r) => r,
            None => {
                info!("blit within bitmap was clipped away");
                return Ok(None);
            }
        };

        let stride = self.width as usize;

        self.with_pixels_mut(|p| {
            let temp = extract_region(p, stride, &region);
            let staged = BlitRegion { src_x: 0, src_y: 0, ..region };
            copy_region(&temp, region.width, p, stride, &staged);
        })?;

        Ok(Some(region_rect(&region)))
    }

    /// Validates the tile against the source and reads it out, clamped to the destination size.
    fn read_tile(src: &Bitmap, src_x: i16, src_y: i16, dst: &Bitmap, width: i16, height: i16) -> Result<(Vec<u8>, usize, usize)> {
        if !dst.has_storage() {
            error!("passed bitmap had no pixel storage");
            return Err(BitmapError::NoStorage.into());
        }

        if width <= 0
            || height <= 0
            || src_x < 0
            || src_y < 0
            || src_x as i32 + width as i32 > src.width as i32
            || src_y as i32 + height as i32 > src.height as i32
        {
            error!("tile ({}, {}) {}x{} does not fit in source {}x{}", src_x, src_y, width, height, src.width, src.height);
            return Err(BitmapError::TileOutOfSource.into());
        }

        let width = width.min(dst.width) as usize;
        let height = height.min(dst.height) as usize;

        let region = BlitRegion {
            src_x: src_x as usize,
            src_y: src_y as usize,
            dst_x: 0,
            dst_y: 0,
            width,
            height,
        };

        let stride = src.width as usize;
        let tile = src.with_pixels(|s| extract_region(s, stride, &region))?;

        Ok((tile, width, height))
    }

    /// Fill `dst` with copies of a tile from `src`, starting at the top-left corner.
    /// The first band is built one scanline at a time across the full width,
    /// then copied down the bitmap a band at a time.
    #[tracing::instrument(skip_all)]
    pub fn tile(src: &Bitmap, src_x: i16, src_y: i16, dst: &mut Bitmap, width: i16, height: i16) -> Result<()> {
        let (tile, tw, th) = Bitmap::read_tile(src, src_x, src_y, dst, width, height)?;
        let (dw, dh) = (dst.width as usize, dst.height as usize);

        dst.with_pixels_mut(|p| {
            for row in 0..th {
                let tile_row = &tile[row * tw..(row + 1) * tw];
                let dst_row = &mut p[row * dw..(row + 1) * dw];

                for chunk in dst_row.chunks_mut(tw) {
                    chunk.copy_from_slice(&tile_row[..chunk.len()]);
                }
            }

            let mut y = th;

            while y < dh {
                let rows = th.min(dh - y);
                p.copy_within(0..rows * dw, y * dw);
                y += th;
            }
        })
    }

    /// Same result as [`Bitmap::tile`]. The first band is laid down one whole tile
    /// at a time, the rest of the bitmap is then copied scanline by scanline.
    #[tracing::instrument(skip_all)]
    pub fn tile_v1(src: &Bitmap, src_x: i16, src_y: i16, dst: &mut Bitmap, width: i16, height: i16) -> Result<()> {
        let (tile, tw, th) = Bitmap::read_tile(src, src_x, src_y, dst, width, height)?;
        let (dw, dh) = (dst.width as usize, dst.height as usize);

        dst.with_pixels_mut(|p| {
            let mut x = 0;

            while x < dw {
                let n = tw.min(dw - x);

                for row in 0..th {
                    let d = row * dw + x;
                    p[d..d + n].copy_from_slice(&tile[row * tw..row * tw + n]);
                }

                x += tw;
            }

            for y in th..dh {
                let s = (y % th) * dw;
                p.copy_within(s..s + dw, y * dw);
            }
        })
    }

    /// Same result as [`Bitmap::tile`]. Every scanline of the first band is
    /// finished before the next one starts; each later scanline copies the one
    /// a tile height above it.
    #[tracing::instrument(skip_all)]
    pub fn tile_v2(src: &Bitmap, src_x: i16, src_y: i16, dst: &mut Bitmap, width: i16, height: i16) -> Result<()> {
        let (tile, tw, th) = Bitmap::read_tile(src, src_x, src_y, dst, width, height)?;
        let (dw, dh) = (dst.width as usize, dst.height as usize);

        dst.with_pixels_mut(|p| {
            for row in 0..th {
                let tile_row = &tile[row * tw..(row + 1) * tw];
                let start = row * dw;

                // seed one tile width, then double the filled span
                p[start..start + tw].copy_from_slice(tile_row);

                let mut filled = tw;
                while filled < dw {
                    let n = filled.min(dw - filled);
                    p.copy_within(start..start + n, start + filled);
                    filled += n;
                }
            }

            for y in th..dh {
                let s = (y - th) * dw;
                p.copy_within(s..s + dw, y * dw);
            }
        })
    }

    /// Same result as [`Bitmap::tile`], copying pixel by pixel instead of by slice.
    /// Counts the whole tiles and the remainder in each direction up front, then
    /// repeats the first band for every later band.
    #[tracing::instrument(skip_all)]
    pub fn tile_v3(src: &Bitmap, src_x: i16, src_y: i16, dst: &mut Bitmap, width: i16, height: i16) -> Result<()> {
        let (tile, tw, th) = Bitmap::read_tile(src, src_x, src_y, dst, width, height)?;
        let (dw, dh) = (dst.width as usize, dst.height as usize);

        let (h_tiles, h_rem) = (dw / tw, dw % tw);
        let (v_tiles, v_rem) = (dh / th, dh % th);

        trace!("h_tiles={}, h_rem={}, v_tiles={}, v_rem={}", h_tiles, h_rem, v_tiles, v_rem);

        dst.with_pixels_mut(|p| {
            for row in 0..th {
                let tile_row = &tile[row * tw..(row + 1) * tw];
                let mut write = row * dw;

                for _ in 0..h_tiles {
                    for &pixel in tile_row {
                        p[write] = pixel;
                        write += 1;
                    }
                }

                for &pixel in &tile_row[..h_rem] {
                    p[write] = pixel;
                    write += 1;
                }
            }

            let band = dw * th;
            let mut write = band;

            for _ in 1..v_tiles {
                for read in 0..band {
                    p[write] = p[read];
                    write += 1;
                }
            }

            for read in 0..dw * v_rem {
                p[write] = p[read];
                write += 1;
            }
        })
    }
}
