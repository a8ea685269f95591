use std::{env, fs, rc::Rc};

use a2560_core::{
    graphics::{color_conversion::convert_8_to_32, palette::Palette},
    Bitmap, FillMode, Font, MemoryKind, Quadrants, Rectangle, VideoConfig, VideoMemory,
};
use anyhow::{Context, Result};
use log::{info, warn};
use minifb::{Key, Window, WindowOptions};
use once_cell::sync::Lazy;
use strum::IntoEnumIterator;
use tinyrand::{Rand, Seeded, StdRand};
use tinyrand_std::clock_seed::ClockSeed;

const SCREEN_WIDTH: i16 = 640;
const SCREEN_HEIGHT: i16 = 480;
const PATTERN_SIZE: i16 = 16;

const COLOR_BLACK: u8 = 0;
const COLOR_DARK_BLUE: u8 = 1;
const COLOR_LIGHT_GRAY: u8 = 7;
const COLOR_DARK_GRAY: u8 = 8;
const COLOR_BRIGHT_CYAN: u8 = 11;
const COLOR_BRIGHT_YELLOW: u8 = 14;
const COLOR_WHITE: u8 = 15;

static PALETTE: Lazy<Palette> = Lazy::new(Palette::default);

/// 16x16 desktop tile: grey field with a darker rounded outline
fn build_desktop_pattern() -> Result<Bitmap> {
    let mut pattern = Bitmap::new(PATTERN_SIZE, PATTERN_SIZE, None, MemoryKind::NotInVram)?;

    pattern.fill_memory(COLOR_LIGHT_GRAY)?;
    pattern.draw_round_box(1, 1, PATTERN_SIZE - 2, PATTERN_SIZE - 2, 3, COLOR_DARK_GRAY, FillMode::Outline)?;
    pattern.set_pixel_at_xy(PATTERN_SIZE / 2, PATTERN_SIZE / 2, COLOR_WHITE)?;

    Ok(pattern)
}

fn draw_shapes(screen: &mut Bitmap) -> Result<()> {
    let mut x = 20;

    for (i, mode) in FillMode::iter().enumerate() {
        let color = Palette::cube_index(255, 51 * i as u8, 0);

        screen.draw_box(x, 20, 80, 60, color, mode)?;
        screen.draw_round_box(x, 100, 80, 60, 12, color, mode)?;
        x += 100;
    }

    screen.draw_box_rect(&Rectangle::new(20, 180, 219, 239), COLOR_WHITE)?;
    screen.fill_box_rect(&Rectangle::new(30, 190, 209, 229), COLOR_DARK_BLUE)?;

    screen.draw_circle(320, 100, 60, COLOR_BRIGHT_YELLOW)?;
    screen.draw_circle_quadrants(320, 100, 40, COLOR_BRIGHT_CYAN, Quadrants::NE | Quadrants::SW)?;

    // the fill stops at pixels already in the fill colour, so the ring uses it too
    let green = Palette::cube_index(0, 153, 51);
    screen.draw_circle(520, 100, 50, green)?;
    let painted = screen.flood_fill(520, 100, green)?;
    info!("flood fill painted {} pixels", painted);

    Ok(())
}

fn draw_random_lines(screen: &mut Bitmap, rand: &mut impl Rand, count: usize) -> Result<()> {
    let (left, top, right, bottom) = (20u32, 260u32, 300u32, 420u32);

    for _ in 0..count {
        let x1 = (left + rand.next_lim_u32(right - left)) as i16;
        let y1 = (top + rand.next_lim_u32(bottom - top)) as i16;
        let x2 = (left + rand.next_lim_u32(right - left)) as i16;
        let y2 = (top + rand.next_lim_u32(bottom - top)) as i16;
        let color = Palette::cube_index(
            rand.next_lim_u32(256) as u8,
            rand.next_lim_u32(256) as u8,
            rand.next_lim_u32(256) as u8,
        );

        screen.draw_line(x1, y1, x2, y2, color)?;
    }

    Ok(())
}

fn build_window(font: Option<Rc<Font>>) -> Result<Bitmap> {
    let mut window = Bitmap::new(200, 120, font, MemoryKind::NotInVram)?;

    window.fill_memory(COLOR_WHITE)?;
    window.fill_box(0, 0, 200, 14, COLOR_DARK_BLUE)?;
    window.draw_box(0, 0, 200, 120, COLOR_BLACK, FillMode::Outline)?;

    if window.font().is_some() {
        window.set_color(COLOR_WHITE);
        window.set_xy(4, 3)?;
        window.draw_string("Window", None)?;
    }

    Ok(window)
}

fn load_font(path: &str) -> Result<Font> {
    let data = fs::read(path).with_context(|| format!("Failed to read font {}", path))?;

    match data.len() {
        a2560_core::graphics::drawing_2d::font::FONT_8X8_DATA_SIZE => Font::from_8x8(path, &data),
        _ => Font::from_stream(path, &mut data.as_slice()),
    }
}

fn show(screen: &Bitmap) -> Result<()> {
    let (width, height) = (screen.width() as usize, screen.height() as usize);

    let mut window = Window::new(
        "A2560 Playbox (Press ESC to close)",
        width,
        height,
        WindowOptions::default(),
    )?;

    window.set_target_fps(60);

    let buffer = convert_8_to_32(&screen.pixels()?, &PALETTE);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window.update_with_buffer(&buffer, width, height)?;
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("a2560 core {}", a2560_core::get_version());

    let config = VideoConfig::default();
    let vram = VideoMemory::new_shared(config.vram_size);

    let mut screen = Bitmap::new_with_config(SCREEN_WIDTH, SCREEN_HEIGHT, None, MemoryKind::InVram, config)?;
    screen.assign_vram(vram.clone(), 0)?;
    screen.debug_print();

    let pattern = build_desktop_pattern()?;
    Bitmap::tile(&pattern, 0, 0, &mut screen, PATTERN_SIZE, PATTERN_SIZE)?;

    draw_shapes(&mut screen)?;

    let mut rand = StdRand::seed(ClockSeed::default().next_u64());
    draw_random_lines(&mut screen, &mut rand, 40)?;

    let font = match env::args().nth(1) {
        Some(path) => Some(Rc::new(load_font(&path)?)),
        None => {
            warn!("no font file given, skipping text");
            None
        }
    };

    if let Some(font) = &font {
        screen.set_font(font.clone());
        screen.set_color(COLOR_WHITE);
        screen.set_xy(20, 440)?;

        let text = "Hello from the A2560 playbox";
        let (fit, width) = font.measure_string_width(text, None, 280)?;
        info!("{} of {} chars fit in {} pixels", fit, text.len(), width);

        screen.draw_string(text, Some(fit))?;
    }

    let window = build_window(font)?;
    Bitmap::blit(&window, 0, 0, &mut screen, 400, 240, window.width(), window.height())?;

    // partly off screen, clipped by blit
    if let Some(rect) = Bitmap::blit(&window, 0, 0, &mut screen, 560, 420, window.width(), window.height())? {
        info!("clipped window drawn at {}", rect);
    }

    show(&screen)
}
