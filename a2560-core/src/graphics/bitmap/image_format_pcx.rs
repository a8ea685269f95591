use std::io::Read;

use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};

use crate::{config::VideoConfig, graphics::palette::Palette};

use super::{Bitmap, MemoryKind};

const PCX_HEADER_SIZE: usize = 128;
const PCX_MANUFACTURER: u8 = 0x0A;
const PCX_RLE_ENCODING: u8 = 1;
const PCX_PALETTE_MARKER: u8 = 0x0C;
const PCX_PALETTE_SIZE: usize = 768;
const PCX_INITIAL_CAPACITY: usize = 800 * 600;

const VERSION_OFFSET: usize = 1;
const ENCODING_OFFSET: usize = 2;
const NUM_BPP_OFFSET: usize = 3;
const WINDOW_OFFSET: usize = 4;
const COLOR_INFO_OFFSET: usize = 65;
const PLANE_SIZE_OFFSET: usize = 66;

/// An 8-bit, single plane, RLE encoded PCX image with its 256 colour palette
#[derive(Debug, Clone)]
pub struct PcxImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
    palette: Palette,
}

fn header_i16(header: &[u8], offset: usize) -> Result<i16> {
    let mut field = &header[offset..offset + 2];
    field.read_i16::<LittleEndian>().context("Failed to read header field")
}

fn header_u16(header: &[u8], offset: usize) -> Result<u16> {
    let mut field = &header[offset..offset + 2];
    field.read_u16::<LittleEndian>().context("Failed to read header field")
}

impl PcxImage {
    pub fn new<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; PCX_HEADER_SIZE];
        reader.read_exact(&mut header).context("Failed to read header")?;

        if header[0] != PCX_MANUFACTURER {
            return Err(anyhow!("Not a PCX file"));
        }

        trace!("Version: {}", header[VERSION_OFFSET]);
        trace!("Depth: {}", header[NUM_BPP_OFFSET]);
        trace!("Plane(s): {}", header[COLOR_INFO_OFFSET]);

        if header[ENCODING_OFFSET] != PCX_RLE_ENCODING {
            return Err(anyhow!("Unknown PCX encoding: {}", header[ENCODING_OFFSET]));
        }

        if header[NUM_BPP_OFFSET] != 8 {
            return Err(anyhow!("Only 8-bit depth is acceptable"));
        }

        if header[COLOR_INFO_OFFSET] != 1 {
            return Err(anyhow!("Unknown PCX depth: {} planes", header[COLOR_INFO_OFFSET]));
        }

        let xmin = header_i16(&header, WINDOW_OFFSET)?;
        let ymin = header_i16(&header, WINDOW_OFFSET + 2)?;
        let xmax = header_i16(&header, WINDOW_OFFSET + 4)?;
        let ymax = header_i16(&header, WINDOW_OFFSET + 6)?;

        if xmax < xmin || ymax < ymin {
            return Err(anyhow!("Bad PCX window ({}, {}) - ({}, {})", xmin, ymin, xmax, ymax));
        }

        let width = (1 + xmax as i32 - xmin as i32) as usize;
        let height = (1 + ymax as i32 - ymin as i32) as usize;

        let bytes_per_line = header_u16(&header, PLANE_SIZE_OFFSET)? as usize;

        if bytes_per_line == 0 || bytes_per_line < width {
            return Err(anyhow!("PCX scanline of {} bytes is narrower than the image ({})", bytes_per_line, width));
        }

        let total = bytes_per_line
            .checked_mul(height)
            .ok_or_else(|| anyhow!("PCX image of {} x {} lines is too large", bytes_per_line, height))?;

        // grown while decoding, never sized from the header alone
        let mut scanlines = Vec::with_capacity(total.min(PCX_INITIAL_CAPACITY));

        while scanlines.len() < total {
            let read = reader.read_u8().context("PCX image data ended early")?;

            if read >= 192 {
                let value = reader.read_u8().context("PCX image data ended early")?;
                let count = ((read - 192) as usize).min(total - scanlines.len());

                scanlines.resize(scanlines.len() + count, value);
            }
            else {
                scanlines.push(read);
            }
        }

        // drop the scanline padding
        let mut data = Vec::with_capacity(width * height);
        for row in scanlines.chunks_exact(bytes_per_line) {
            data.extend_from_slice(&row[..width]);
        }

        let marker = reader.read_u8().context("Failed to read palette marker")?;

        if marker != PCX_PALETTE_MARKER {
            return Err(anyhow!("PCX has no 256 colour palette (marker {:#x})", marker));
        }

        let mut rgb = [0u8; PCX_PALETTE_SIZE];
        reader.read_exact(&mut rgb).context("Failed to read palette")?;

        debug!("loaded PCX {} x {}", width, height);

        Ok(Self {
            width,
            height,
            data,
            palette: Palette::from_rgb_triplets(&rgb),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Copy the image into a new system memory bitmap
    pub fn into_bitmap(self, config: VideoConfig) -> Result<(Bitmap, Palette)> {
        let width = i16::try_from(self.width).context("PCX too wide for a bitmap")?;
        let height = i16::try_from(self.height).context("PCX too tall for a bitmap")?;

        let mut bitmap = Bitmap::new_with_config(width, height, None, MemoryKind::NotInVram, config)?;
        bitmap.with_pixels_mut(|p| p.copy_from_slice(&self.data))?;

        Ok((bitmap, self.palette))
    }
}

#[cfg(test)]
pub mod tests {
    use std::{fs::File, io::{BufReader, Cursor}};

    use function_name::named;

    use crate::{graphics::color_conversion::convert_8_to_32, testdata};

    use super::*;

    #[test]
    #[named]
    fn read_8bit_pcx() {
        crate::test_common::setup();

        let file = File::open(testdata!("checker_6x4.pcx")).unwrap();
        let mut reader = BufReader::new(file);
        let image = PcxImage::new(&mut reader).unwrap();

        assert_eq!(image.width(), 6);
        assert_eq!(image.height(), 4);
        assert_eq!(&image.data()[0..6], &[0, 0, 1, 1, 2, 2]);
        assert_eq!(&image.data()[18..24], &[200; 6]);
        assert_eq!(image.palette().get(1), 0xFF01FE02);

        let (bitmap, palette) = image.into_bitmap(VideoConfig::default()).unwrap();
        assert_eq!(bitmap.get_pixel_at_xy(4, 1).unwrap(), 3);
        assert_eq!(bitmap.get_pixel_at_xy(0, 3).unwrap(), 200);

        let argb = convert_8_to_32(&bitmap.pixels().unwrap(), &palette);
        crate::display_argb32!(function_name!(), &argb, 6, 4);
        assert_eq!(argb[23], palette.get(200));
    }

    #[test]
    fn rejects_other_depths() {
        crate::test_common::setup();

        let mut bytes = std::fs::read(testdata!("checker_6x4.pcx")).unwrap();

        bytes[COLOR_INFO_OFFSET] = 3;
        assert!(PcxImage::new(&mut Cursor::new(&bytes)).is_err());

        bytes[COLOR_INFO_OFFSET] = 1;
        bytes[NUM_BPP_OFFSET] = 4;
        assert!(PcxImage::new(&mut Cursor::new(&bytes)).is_err());
    }

    #[test]
    fn rejects_bad_scanline_size() {
        crate::test_common::setup();

        let mut bytes = std::fs::read(testdata!("checker_6x4.pcx")).unwrap();

        bytes[PLANE_SIZE_OFFSET] = 0xFF;
        bytes[PLANE_SIZE_OFFSET + 1] = 0xFF;
        assert!(PcxImage::new(&mut Cursor::new(&bytes)).is_err());

        bytes[PLANE_SIZE_OFFSET] = 0;
        bytes[PLANE_SIZE_OFFSET + 1] = 0;
        assert!(PcxImage::new(&mut Cursor::new(&bytes)).is_err());
    }

    #[test]
    fn truncated_data_is_an_error() {
        crate::test_common::setup();

        let bytes = std::fs::read(testdata!("checker_6x4.pcx")).unwrap();
        assert!(PcxImage::new(&mut Cursor::new(&bytes[..140])).is_err());
        assert!(PcxImage::new(&mut Cursor::new(&bytes[..bytes.len() - 10])).is_err());
    }
}
