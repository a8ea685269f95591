use anyhow::Result;
use derive_builder::Builder;

use crate::graphics::bitmap::BitmapError;

/// VICKY in the A2560K supports a max resolution of 800x600 for graphics
pub const VICKY_BITMAP_MAX_H_RES: i16 = 800;
pub const VICKY_BITMAP_MAX_V_RES: i16 = 600;
pub const BITMAP_MIN_DIMENSION: i16 = 2;

/// VRAM runs from $00:0000 to $1F:FFFF from VICKY's perspective
pub const VRAM_SIZE: usize = 0x20_0000;

#[derive(Debug, Builder, Clone, Copy, PartialEq, Eq)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct VideoConfig {
    #[builder(default = VICKY_BITMAP_MAX_H_RES)]
    pub max_width: i16,

    #[builder(default = VICKY_BITMAP_MAX_V_RES)]
    pub max_height: i16,

    #[builder(default = BITMAP_MIN_DIMENSION)]
    pub min_dimension: i16,

    #[builder(default = VRAM_SIZE)]
    pub vram_size: usize,
}

impl VideoConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        let min = self.min_dimension.unwrap_or(BITMAP_MIN_DIMENSION);
        let max_w = self.max_width.unwrap_or(VICKY_BITMAP_MAX_H_RES);
        let max_h = self.max_height.unwrap_or(VICKY_BITMAP_MAX_V_RES);

        if min < 1 {
            return Err(format!("min_dimension must be at least 1, got {}", min));
        }

        if max_w < min || max_h < min {
            return Err(format!("max resolution {}x{} is below min_dimension {}", max_w, max_h, min));
        }

        Ok(())
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            max_width: VICKY_BITMAP_MAX_H_RES,
            max_height: VICKY_BITMAP_MAX_V_RES,
            min_dimension: BITMAP_MIN_DIMENSION,
            vram_size: VRAM_SIZE,
        }
    }
}

impl VideoConfig {
    pub fn validate_dimensions(&self, width: i16, height: i16) -> Result<()> {
        if width < self.min_dimension
            || width > self.max_width
            || height < self.min_dimension
            || height > self.max_height
        {
            error!("Illegal width ({}) and/or height ({})", width, height);
            return Err(BitmapError::InvalidDimensions { width, height }.into());
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn default_matches_vicky_limits() {
        crate::test_common::setup();

        let built = VideoConfigBuilder::default().build().unwrap();
        assert_eq!(built, VideoConfig::default());
        assert_eq!(built.max_width, 800);
        assert_eq!(built.max_height, 600);
        assert_eq!(built.vram_size, 0x20_0000);
    }

    #[test]
    fn builder_rejects_inverted_limits() {
        crate::test_common::setup();

        let result = VideoConfigBuilder::default()
            .min_dimension(16)
            .max_width(8)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn dimension_validation() {
        crate::test_common::setup();

        let config = VideoConfig::default();
        assert!(config.validate_dimensions(2, 2).is_ok());
        assert!(config.validate_dimensions(800, 600).is_ok());

        let err = config.validate_dimensions(1, 10).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BitmapError>(),
            Some(&BitmapError::InvalidDimensions { width: 1, height: 10 })
        );
        assert!(config.validate_dimensions(801, 10).is_err());
        assert!(config.validate_dimensions(10, 601).is_err());
    }
}
