use std::{io::{Read, Write}, ops::{Range, RangeInclusive}};

use anyhow::{Context, Result};
use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FontFlags: u8 {
        const Proportional = 0b00000001;
    }
}

macro_rules! bits_to_bytes {
    ($v:expr) => {
        ($v + 7) >> 3
    };
}

pub const FONT_MAGIC: &[u8; 4] = b"A2FN";

/// VICKY text mode font: 256 glyphs, 8x8 pixels, 1 byte per row
pub const FONT_8X8_DATA_SIZE: usize = 2048;
const FONT_8X8_GLYPH_SIZE: usize = 8;

/// A 1-bit bitmap font. Each glyph row is `ceil(width / 8)` bytes,
/// most significant bit = leftmost pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    name: String,
    height: u16,
    /// rows above the baseline
    ascent: u16,
    min_char: u8,
    max_char: u8,
    flags: FontFlags,
    /// pixel width of each char from min_char to max_char
    char_widths: Vec<u8>,
    /// glyph pixel data
    raw_data: Vec<u8>,
    /// range in raw_data of each char
    char_data: Vec<Range<usize>>,
}

impl Font {
    pub fn new(name: &str, height: u16, ascent: u16, min_char: u8, char_widths: Vec<u8>, raw_data: Vec<u8>) -> Result<Self> {
        if char_widths.is_empty() {
            return Err(anyhow!("font {} has no characters", name));
        }

        if height == 0 {
            return Err(anyhow!("font {} has a height of 0", name));
        }

        if ascent > height {
            return Err(anyhow!("font {} ascent {} is taller than its height {}", name, ascent, height));
        }

        let max_char = min_char as usize + char_widths.len() - 1;

        if max_char > u8::MAX as usize {
            return Err(anyhow!("font {} covers chars past 255 ({}..={})", name, min_char, max_char));
        }

        let mut char_data = Vec::with_capacity(char_widths.len());
        let mut offset = 0;

        for &w in &char_widths {
            let size = bits_to_bytes!(w as usize) * height as usize;
            char_data.push(offset..offset + size);
            offset += size;
        }

        if offset != raw_data.len() {
            return Err(anyhow!(
                "font {} glyph data is {} bytes, widths and height need {}",
                name,
                raw_data.len(),
                offset
            ));
        }

        let fixed = char_widths.iter().all(|&w| w == char_widths[0]);
        let flags = if fixed { FontFlags::empty() } else { FontFlags::Proportional };

        debug!("font {}: chars {}..={}, height {}, {:?}", name, min_char, max_char, height, flags);

        Ok(Self {
            name: name.to_owned(),
            height,
            ascent,
            min_char,
            max_char: max_char as u8,
            flags,
            char_widths,
            raw_data,
            char_data,
        })
    }

    /// Load a 2048 byte text mode font (256 glyphs of 8x8).
    pub fn from_8x8(name: &str, data: &[u8]) -> Result<Self> {
        if data.len() != FONT_8X8_DATA_SIZE {
            return Err(anyhow!("8x8 font data must be {} bytes, got {}", FONT_8X8_DATA_SIZE, data.len()));
        }

        Font::new(name, FONT_8X8_GLYPH_SIZE as u16, 7, 0, vec![8u8; 256], data.to_vec())
    }

    pub fn from_stream<R: Read>(name: &str, reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).context("Failed to read font magic")?;

        if &magic != FONT_MAGIC {
            return Err(anyhow!("magic in font not valid"));
        }

        let height = reader.read_u16::<LittleEndian>().context("Failed to read font height")?;
        let ascent = reader.read_u16::<LittleEndian>().context("Failed to read font ascent")?;
        let min_char = reader.read_u8().context("Failed to read min char")?;
        let max_char = reader.read_u8().context("Failed to read max char")?;

        if max_char < min_char {
            return Err(anyhow!("font char range {}..={} is inverted", min_char, max_char));
        }

        let num_chars = (max_char - min_char) as usize + 1;
        let mut char_widths = vec![0u8; num_chars];
        reader.read_exact(&mut char_widths).context("Failed to read char widths")?;

        let byte_size = reader.read_u32::<LittleEndian>().context("Failed to read glyph byte count")? as usize;
        let mut raw_data = vec![0u8; byte_size];
        reader.read_exact(&mut raw_data).context("Failed to read raw_data")?;

        Font::new(name, height, ascent, min_char, char_widths, raw_data)
    }

    /// Write the font in the format [`Font::from_stream`] reads
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(FONT_MAGIC)?;
        writer.write_u16::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.ascent)?;
        writer.write_u8(self.min_char)?;
        writer.write_u8(self.max_char)?;
        writer.write_all(&self.char_widths)?;
        writer.write_u32::<LittleEndian>(self.raw_data.len() as u32)?;
        writer.write_all(&self.raw_data)?;

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn ascent(&self) -> u16 {
        self.ascent
    }

    pub fn char_range(&self) -> RangeInclusive<u8> {
        self.min_char..=self.max_char
    }

    pub fn is_proportional(&self) -> bool {
        self.flags.contains(FontFlags::Proportional)
    }

    fn char_index(&self, ch: char) -> Option<usize> {
        let code = ch as u32;

        if code < self.min_char as u32 || code > self.max_char as u32 {
            return None;
        }

        Some((code - self.min_char as u32) as usize)
    }

    /// Pixel width of a char, 0 for chars the font does not have
    pub fn char_width(&self, ch: char) -> usize {
        self.char_index(ch).map_or(0, |i| self.char_widths[i] as usize)
    }

    /// Glyph rows of a char plus its width
    pub fn glyph(&self, ch: char) -> Option<(&[u8], usize)> {
        let index = self.char_index(ch)?;
        Some((&self.raw_data[self.char_data[index].clone()], self.char_widths[index] as usize))
    }

    /// Work out how many chars of `text` fit in `available_width` pixels.
    /// `num_chars` limits the measure to the first n chars, `None` measures them all.
    /// Returns the number of chars that fit and their width in pixels.
    pub fn measure_string_width(&self, text: &str, num_chars: Option<usize>, available_width: usize) -> Result<(usize, usize)> {
        if num_chars == Some(0) {
            return Err(anyhow!("asked to measure 0 chars"));
        }

        let limit = num_chars.unwrap_or(usize::MAX);
        let mut fit_count = 0;
        let mut measured = 0;

        for ch in text.chars().take(limit) {
            let w = self.char_width(ch);

            if measured + w > available_width {
                break;
            }

            measured += w;
            fit_count += 1;
        }

        Ok((fit_count, measured))
    }
}
