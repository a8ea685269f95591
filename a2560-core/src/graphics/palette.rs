use once_cell::sync::Lazy;

use crate::argb;

use super::{ColorIndex, CLUT_SIZE};

/// 16 system colours, in the order the text mode uses them
const SYSTEM_COLORS: [u32; 16] = [
    argb!(0xFF, 0x00, 0x00, 0x00), // black
    argb!(0xFF, 0x00, 0x00, 0xAA), // dark blue
    argb!(0xFF, 0x00, 0xAA, 0x00), // dark green
    argb!(0xFF, 0x00, 0xAA, 0xAA), // dark cyan
    argb!(0xFF, 0xAA, 0x00, 0x00), // dark red
    argb!(0xFF, 0xAA, 0x00, 0xAA), // dark magenta
    argb!(0xFF, 0xAA, 0x55, 0x00), // brown
    argb!(0xFF, 0xAA, 0xAA, 0xAA), // light gray
    argb!(0xFF, 0x55, 0x55, 0x55), // dark gray
    argb!(0xFF, 0x55, 0x55, 0xFF), // bright blue
    argb!(0xFF, 0x55, 0xFF, 0x55), // bright green
    argb!(0xFF, 0x55, 0xFF, 0xFF), // bright cyan
    argb!(0xFF, 0xFF, 0x55, 0x55), // bright red
    argb!(0xFF, 0xFF, 0x55, 0xFF), // bright magenta
    argb!(0xFF, 0xFF, 0xFF, 0x55), // bright yellow
    argb!(0xFF, 0xFF, 0xFF, 0xFF), // white
];

const CUBE_START: usize = 16;
const CUBE_SIDE: usize = 6;
const GRAY_START: usize = CUBE_START + CUBE_SIDE * CUBE_SIDE * CUBE_SIDE;

const fn generate_default_lut() -> [u32; CLUT_SIZE] {
    let mut lut = [0u32; CLUT_SIZE];

    let mut i = 0;
    while i < SYSTEM_COLORS.len() {
        lut[i] = SYSTEM_COLORS[i];
        i += 1;
    }

    /* 6x6x6 colour cube */
    let mut i = 0;
    while i < CUBE_SIDE * CUBE_SIDE * CUBE_SIDE {
        let r = (i / 36) * 51;
        let g = ((i / 6) % 6) * 51;
        let b = (i % 6) * 51;
        lut[CUBE_START + i] = argb!(0xFF, r, g, b);
        i += 1;
    }

    /* grey ramp */
    let mut i = 0;
    while GRAY_START + i < CLUT_SIZE {
        let v = 8 + i * 10;
        lut[GRAY_START + i] = argb!(0xFF, v, v, v);
        i += 1;
    }

    lut
}

static DEFAULT_LUT: Lazy<[u32; CLUT_SIZE]> = Lazy::new(generate_default_lut);

/// A 256 entry colour lookup table, ARGB32 per entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [u32; CLUT_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self { entries: *DEFAULT_LUT }
    }
}

impl Palette {
    pub fn from_entries(entries: [u32; CLUT_SIZE]) -> Self {
        Self { entries }
    }

    /// Build a palette from packed RGB triplets (as stored in PCX trailers).
    pub fn from_rgb_triplets(rgb: &[u8]) -> Self {
        let mut entries = [argb!(0xFF, 0, 0, 0); CLUT_SIZE];

        for (i, chunk) in rgb.chunks_exact(3).take(CLUT_SIZE).enumerate() {
            entries[i] = argb!(0xFF, chunk[0], chunk[1], chunk[2]);
        }

        Self { entries }
    }

    pub fn get(&self, index: ColorIndex) -> u32 {
        self.entries[index as usize]
    }

    pub fn set(&mut self, index: ColorIndex, argb: u32) {
        self.entries[index as usize] = argb;
    }

    pub fn entries(&self) -> &[u32; CLUT_SIZE] {
        &self.entries
    }

    /// Index of the system colour cube entry nearest to an 8-bit RGB triple.
    pub fn cube_index(r: u8, g: u8, b: u8) -> ColorIndex {
        let q = |v: u8| ((v as usize + 25) / 51).min(CUBE_SIDE - 1);
        (CUBE_START + q(r) * 36 + q(g) * 6 + q(b)) as ColorIndex
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn default_lut_layout() {
        crate::test_common::setup();

        let palette = Palette::default();
        assert_eq!(palette.get(0), 0xFF000000);
        assert_eq!(palette.get(15), 0xFFFFFFFF);
        // first and last cube entries
        assert_eq!(palette.get(16), 0xFF000000);
        assert_eq!(palette.get(231), 0xFFFFFFFF);
        // grey ramp
        assert_eq!(palette.get(232), 0xFF080808);
        assert_eq!(palette.get(255), 0xFFEEEEEE);
    }

    #[test]
    fn cube_index_round_trips() {
        let palette = Palette::default();
        let index = Palette::cube_index(255, 0, 0);
        assert_eq!(palette.get(index), 0xFFFF0000);
        assert_eq!(Palette::cube_index(0, 0, 0), 16);
    }

    #[test]
    fn rgb_triplets() {
        let palette = Palette::from_rgb_triplets(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(palette.get(0), 0xFF010203);
        assert_eq!(palette.get(1), 0xFF040506);
        assert_eq!(palette.get(2), 0xFF000000);
    }
}
