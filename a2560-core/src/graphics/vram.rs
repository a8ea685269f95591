use std::fmt;

use anyhow::Result;

use crate::{common::{new_shared_mut_ref, SharedMutRef}, config::VideoConfig};

use super::bitmap::BitmapError;

/// Video memory shared by every bitmap that lives "in VRAM".
/// Bitmaps only borrow a region of it, they never own or free it.
pub struct VideoMemory {
    data: Vec<u8>,
}

impl fmt::Debug for VideoMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoMemory")
            .field("len", &self.data.len())
            .finish()
    }
}

impl VideoMemory {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
        }
    }

    pub fn with_config(config: &VideoConfig) -> Self {
        Self::new(config.vram_size)
    }

    pub fn new_shared(size: usize) -> SharedMutRef<VideoMemory> {
        new_shared_mut_ref(Self::new(size))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn check_span(&self, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => {
                error!("VRAM span {:#x}+{:#x} exceeds VRAM size {:#x}", offset, len, self.data.len());
                Err(BitmapError::VramOutOfRange { offset, len }.into())
            }
        }
    }

    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.check_span(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    pub fn slice_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        self.check_span(offset, len)?;
        Ok(&mut self.data[offset..offset + len])
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn spans_are_bounds_checked() {
        crate::test_common::setup();

        let mut vram = VideoMemory::new(64);
        assert_eq!(vram.len(), 64);

        vram.slice_mut(60, 4).unwrap().fill(7);
        assert_eq!(vram.as_slice()[63], 7);

        let err = vram.slice(60, 5).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BitmapError>(),
            Some(&BitmapError::VramOutOfRange { offset: 60, len: 5 })
        );
        assert!(vram.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn default_config_size() {
        let vram = VideoMemory::with_config(&VideoConfig::default());
        assert_eq!(vram.len(), 0x20_0000);
        assert!(format!("{:?}", vram).contains("2097152"));
    }
}
