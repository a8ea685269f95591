pub mod blit;
pub mod draw;
pub mod fill;
pub mod image_format_pcx;


use std::{fmt, rc::Rc};

use anyhow::Result;
use bitflags::bitflags;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

use crate::{
    common::SharedMutRef,
    config::VideoConfig,
    graphics::{drawing_2d::font::Font, vram::VideoMemory, ColorIndex},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BitmapError {
    #[error("illegal bitmap size {width} x {height}")]
    InvalidDimensions { width: i16, height: i16 },
    #[error("coordinate ({x}, {y}) is outside the bitmap")]
    CoordinateOutOfBounds { x: i16, y: i16 },
    #[error("bitmap has no pixel storage assigned")]
    NoStorage,
    #[error("coordinates are not ordered min to max")]
    InvalidCoordinates,
    #[error("tile must lie entirely within the source bitmap")]
    TileOutOfSource,
    #[error("VRAM span {offset:#x} + {len:#x} is out of range")]
    VramOutOfRange { offset: usize, len: usize },
    #[error("bitmap has no font assigned")]
    NoFont,
}

bitflags! {
    /// Quadrants of a circle to draw. A quadrant left out is skipped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Quadrants: u8 {
        const NE = 0b0001;
        const SE = 0b0010;
        const SW = 0b0100;
        const NW = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FillMode {
    Fill,
    Outline,
}

impl From<bool> for FillMode {
    fn from(do_fill: bool) -> Self {
        if do_fill { FillMode::Fill } else { FillMode::Outline }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum MemoryKind {
    /// pixels live in shared video memory, assigned after creation
    InVram,
    /// pixels live in a buffer owned by the bitmap
    NotInVram,
}

enum PixelStorage {
    System(Vec<u8>),
    Vram {
        memory: SharedMutRef<VideoMemory>,
        offset: usize,
    },
    Unassigned,
}

/// An 8-bit CLUT-indexed bitmap with a drawing "pen".
pub struct Bitmap {
    width: i16,
    height: i16,
    pub(crate) x: i16,
    pub(crate) y: i16,
    color: ColorIndex,
    font: Option<Rc<Font>>,
    memory: MemoryKind,
    storage: PixelStorage,
    config: VideoConfig,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("color", &self.color)
            .field("font", &self.font.as_ref().map(|f| f.name().to_owned()))
            .field("memory", &self.memory)
            .field("address", &self.base_address())
            .finish()
    }
}

impl Bitmap {
    /// Create a new bitmap. `NotInVram` allocates a zeroed `width * height` buffer;
    /// `InVram` allocates nothing and expects a VRAM region via [`Bitmap::assign_vram`].
    pub fn new(width: i16, height: i16, font: Option<Rc<Font>>, memory: MemoryKind) -> Result<Self> {
        Self::new_with_config(width, height, font, memory, VideoConfig::default())
    }

    pub fn new_with_config(
        width: i16,
        height: i16,
        font: Option<Rc<Font>>,
        memory: MemoryKind,
        config: VideoConfig,
    ) -> Result<Self> {
        config.validate_dimensions(width, height)?;

        let storage = match memory {
            MemoryKind::NotInVram => {
                let size = width as usize * height as usize;
                trace!("__ALLOC__ bitmap data size {}", size);
                PixelStorage::System(vec![0u8; size])
            },
            MemoryKind::InVram => PixelStorage::Unassigned,
        };

        Ok(Self {
            width,
            height,
            x: 0,
            y: 0,
            color: 0,
            font,
            memory,
            storage,
            config,
        })
    }

    /// Point an `InVram` bitmap at a region of video memory.
    pub fn assign_vram(&mut self, memory: SharedMutRef<VideoMemory>, offset: usize) -> Result<()> {
        if self.memory != MemoryKind::InVram {
            error!("only VRAM bitmaps can be assigned a VRAM address");
            return Err(BitmapError::NoStorage.into());
        }

        memory.borrow().check_span(offset, self.area())?;
        self.storage = PixelStorage::Vram { memory, offset };

        Ok(())
    }

    /// Resize the bitmap. Storage is only reallocated when the bitmap is in system memory
    /// and grew; a smaller size keeps using the existing buffer.
    pub fn resize(&mut self, width: i16, height: i16) -> Result<()> {
        self.config.validate_dimensions(width, height)?;

        debug!("start bitmap resizing; old = {} x {}; new = {} x {}", self.width, self.height, width, height);

        let old_size = self.area();
        let new_size = width as usize * height as usize;

        if let PixelStorage::Vram { memory, offset } = &self.storage {
            memory.borrow().check_span(*offset, new_size)?;
        }

        self.width = width;
        self.height = height;

        if let PixelStorage::System(buffer) = &mut self.storage {
            if new_size > old_size {
                trace!("__FREE__ bitmap data size {}", old_size);
                trace!("__ALLOC__ bitmap data size {}", new_size);
                *buffer = vec![0u8; new_size];
            }
        }

        Ok(())
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn memory_kind(&self) -> MemoryKind {
        self.memory
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    pub fn bounds(&self) -> super::rect::Rectangle {
        super::rect::Rectangle::from_xywh(0, 0, self.width, self.height)
    }

    pub(crate) fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn has_storage(&self) -> bool {
        !matches!(self.storage, PixelStorage::Unassigned)
    }

    /// Offset of pixel 0,0 in the backing memory, if any is assigned
    fn base_address(&self) -> Option<usize> {
        match &self.storage {
            PixelStorage::System(_) => Some(0),
            PixelStorage::Vram { offset, .. } => Some(*offset),
            PixelStorage::Unassigned => None,
        }
    }

    pub(crate) fn shares_memory_with(&self, other: &Bitmap) -> bool {
        match (&self.storage, &other.storage) {
            (PixelStorage::Vram { memory: a, .. }, PixelStorage::Vram { memory: b, .. }) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn with_pixels<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let len = self.area();

        match &self.storage {
            PixelStorage::System(buffer) => Ok(f(&buffer[..len])),
            PixelStorage::Vram { memory, offset } => {
                let memory = memory.borrow();
                Ok(f(memory.slice(*offset, len)?))
            },
            PixelStorage::Unassigned => {
                error!("passed bitmap had no pixel storage");
                Err(BitmapError::NoStorage.into())
            },
        }
    }

    pub(crate) fn with_pixels_mut<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R> {
        let len = self.area();

        match &mut self.storage {
            PixelStorage::System(buffer) => Ok(f(&mut buffer[..len])),
            PixelStorage::Vram { memory, offset } => {
                let mut memory = memory.borrow_mut();
                Ok(f(memory.slice_mut(*offset, len)?))
            },
            PixelStorage::Unassigned => {
                error!("passed bitmap had no pixel storage");
                Err(BitmapError::NoStorage.into())
            },
        }
    }

    pub(crate) fn canvas_mut<R>(&mut self, f: impl FnOnce(&mut Canvas<'_>) -> R) -> Result<R> {
        let (width, height) = (self.width as i32, self.height as i32);
        self.with_pixels_mut(|pixels| f(&mut Canvas { pixels, width, height }))
    }

    /// A copy of the visible pixels, row-major
    pub fn pixels(&self) -> Result<Vec<u8>> {
        self.with_pixels(|p| p.to_vec())
    }

    /// Validate the coordinates are within the bounds of the bitmap.
    pub fn validate_xy(&self, x: i16, y: i16) -> bool {
        !(x < 0 || x >= self.width || y < 0 || y >= self.height)
    }

    pub(crate) fn require_xy(&self, x: i16, y: i16) -> Result<()> {
        if !self.validate_xy(x, y) {
            error!("illegal coordinate ({}, {})", x, y);
            return Err(BitmapError::CoordinateOutOfBounds { x, y }.into());
        }

        Ok(())
    }

    // **** pen ****

    /// Set the font used for all string drawing in this bitmap.
    /// The bitmap shares the font, it never owns it.
    pub fn set_font(&mut self, font: Rc<Font>) {
        self.font = Some(font);
    }

    pub fn font(&self) -> Option<Rc<Font>> {
        self.font.clone()
    }

    /// Set the "pen" color used by the pen-based functions.
    pub fn set_color(&mut self, color: ColorIndex) {
        self.color = color;
    }

    pub fn color(&self) -> ColorIndex {
        self.color
    }

    /// Set the "pen" position.
    /// Negative values are allowed, so text can start partly left of/above the bitmap,
    /// but not values past the right or bottom edge.
    pub fn set_xy(&mut self, x: i16, y: i16) -> Result<()> {
        if x >= self.width || y >= self.height {
            error!("invalid coordinates passed ({}, {})", x, y);
            return Err(BitmapError::CoordinateOutOfBounds { x, y }.into());
        }

        self.x = x;
        self.y = y;

        Ok(())
    }

    pub fn x(&self) -> i16 {
        self.x
    }

    pub fn y(&self) -> i16 {
        self.y
    }

    // **** memory locations ****

    /// Memory location of the specified coordinate: the offset within VRAM for
    /// VRAM bitmaps, or the index within the bitmap's own buffer otherwise.
    pub fn mem_loc_for_xy(&self, x: i16, y: i16) -> Result<usize> {
        let base = match self.base_address() {
            Some(b) => b,
            None => {
                error!("passed bitmap had no pixel storage");
                return Err(BitmapError::NoStorage.into());
            }
        };

        self.require_xy(x, y)?;

        Ok(base + self.width as usize * y as usize + x as usize)
    }

    /// Memory location of the current pen position
    pub fn mem_loc(&self) -> Result<usize> {
        self.mem_loc_for_xy(self.x, self.y)
    }

    // **** pixels ****

    pub fn set_pixel_at_xy(&mut self, x: i16, y: i16, color: ColorIndex) -> Result<()> {
        self.require_xy(x, y)?;

        let index = self.width as usize * y as usize + x as usize;
        self.with_pixels_mut(|p| p[index] = color)
    }

    /// Get the CLUT index at the specified coordinate
    pub fn get_pixel_at_xy(&self, x: i16, y: i16) -> Result<ColorIndex> {
        self.require_xy(x, y)?;

        let index = self.width as usize * y as usize + x as usize;
        self.with_pixels(|p| p[index])
    }

    pub fn debug_print(&self) {
        debug!("Bitmap print out:");
        debug!("  width: {}", self.width);
        debug!("  height: {}", self.height);
        debug!("  x: {}", self.x);
        debug!("  y: {}", self.y);
        debug!("  color: {}", self.color);
        debug!("  font: {:?}", self.font.as_ref().map(|f| f.name().to_owned()));
        debug!("  memory: {}", self.memory);
        debug!("  address: {:?}", self.base_address());
    }
}

/// Mutable view over a bitmap's pixels. Plotting outside the bitmap is silently skipped,
/// which is what the rasterizers rely on for clipping.
pub(crate) struct Canvas<'a> {
    pixels: &'a mut [u8],
    width: i32,
    height: i32,
}

impl Canvas<'_> {
    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    #[inline(always)]
    pub(crate) fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline(always)]
    pub(crate) fn get(&self, x: i32, y: i32) -> Option<u8> {
        if self.contains(x, y) {
            Some(self.pixels[(y * self.width + x) as usize])
        }
        else {
            None
        }
    }

    #[inline(always)]
    pub(crate) fn plot(&mut self, x: i32, y: i32, color: u8) -> bool {
        if self.contains(x, y) {
            self.pixels[(y * self.width + x) as usize] = color;
            true
        }
        else {
            false
        }
    }

    /// Fill the inclusive horizontal span x1..=x2 on row y, clipped.
    pub(crate) fn hspan(&mut self, x1: i32, x2: i32, y: i32, color: u8) {
        if y < 0 || y >= self.height {
            return;
        }

        let x1 = x1.max(0);
        let x2 = x2.min(self.width - 1);

        if x1 > x2 {
            return;
        }

        let row = (y * self.width) as usize;
        self.pixels[row + x1 as usize..=row + x2 as usize].fill(color);
    }
}
