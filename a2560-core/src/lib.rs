#[macro_use]
extern crate log;

#[macro_use]
extern crate anyhow;

pub mod common;
pub mod config;
pub mod doc_index;
pub mod graphics;

#[cfg(test)]
pub mod test_common;

pub use config::{VideoConfig, VideoConfigBuilder};
pub use graphics::bitmap::{Bitmap, BitmapError, FillMode, MemoryKind, Quadrants};
pub use graphics::drawing_2d::font::Font;
pub use graphics::rect::Rectangle;
pub use graphics::vram::VideoMemory;
pub use graphics::ColorIndex;

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
