pub mod bitmap;
pub mod drawing_2d;
pub mod palette;
pub mod rect;
pub mod vram;

/// 1-byte index into the current colour lookup table (CLUT)
pub type ColorIndex = u8;

pub const CLUT_SIZE: usize = 256;

/// bitmaps on VICKY are 8 bits per pixel, one CLUT index each
pub const BITMAP_BPP: usize = 8;

#[macro_export]
macro_rules! argb {
    ($a:expr, $r:expr, $g:expr, $b:expr) => {
        ((($a as u32) << 24) | (($r as u32) << 16) | (($g as u32) << 8) | ($b as u32))
    };
}

pub mod color_conversion {
    use super::palette::Palette;

    /// Expand CLUT indices to ARGB32 through the given lookup table.
    pub fn convert_8_to_32(buffer: &[u8], palette: &Palette) -> Vec<u32> {
        buffer.iter().map(|&index| palette.get(index)).collect()
    }

    pub fn convert_8_to_grayscale_32(buffer: &[u8]) -> Vec<u32> {
        buffer.iter().map(|&gray| {
            let grayscale = gray as u32;
            (0xFF << 24) | (grayscale << 16) | (grayscale << 8) | grayscale
        }).collect()
    }
}

#[cfg(test)]
pub mod tests {
    use super::{color_conversion::*, palette::Palette};

    #[test]
    fn argb_macro_packs_channels() {
        assert_eq!(argb!(0xFF, 0x12, 0x34, 0x56), 0xFF123456);
        assert_eq!(argb!(0, 0, 0, 1), 1);
    }

    #[test]
    fn convert_uses_palette() {
        crate::test_common::setup();

        let mut palette = Palette::default();
        palette.set(3, 0xFFABCDEF);

        let out = convert_8_to_32(&[3, 3, 0], &palette);
        assert_eq!(out, vec![0xFFABCDEF, 0xFFABCDEF, palette.get(0)]);

        assert_eq!(convert_8_to_grayscale_32(&[0x80]), vec![0xFF808080]);
    }
}
