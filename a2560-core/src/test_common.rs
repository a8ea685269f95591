use std::{path::{Component, Path, PathBuf}, sync::Once};

use env_logger::Env;

use crate::graphics::{bitmap::Bitmap, color_conversion::convert_8_to_32, palette::Palette};

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(Env::default().default_filter_or("trace"))
            .is_test(true)
            .init();
    });
}

pub fn display_bitmap_argb32(title: &str, buffer: &[u32], width: usize, height: usize) {
    use minifb::{Key, Window, WindowOptions};

    let mut window = Window::new(
        &format!("bitmap argb32: {} (Press ESC to close)", title),
        width,
        height,
        WindowOptions {
            scale: minifb::Scale::X4,
            ..WindowOptions::default()
        },
    )
    .unwrap_or_else(|e| {
        panic!("{}", e);
    });

    window.set_target_fps(60);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(buffer, width, height)
            .unwrap();
    }
}

/// Show an 8-bit bitmap through the default colour table
pub fn display_bitmap_8bpp(title: &str, bitmap: &Bitmap) {
    let pixels = bitmap.pixels().unwrap();
    let argb = convert_8_to_32(&pixels, &Palette::default());

    display_bitmap_argb32(title, &argb, bitmap.width() as usize, bitmap.height() as usize);
}

#[macro_export]
macro_rules! display_argb32 {
    ($title:expr, $buff:expr, $w:expr, $h:expr) => {
        #[cfg(feature = "bitmap_testview")]
        crate::test_common::display_bitmap_argb32($title, $buff, $w, $h);
    };
}

#[macro_export]
macro_rules! display_8bpp {
    ($title:expr, $bitmap:expr) => {
        #[cfg(feature = "bitmap_testview")]
        crate::test_common::display_bitmap_8bpp($title, $bitmap);
    };
}

/// Resolve `testdata/<filename>` next to the source file `base_path`.
/// `file!()` may be relative to the workspace root rather than the crate, so only the
/// part from `src` onward is kept and joined to the crate manifest dir.
pub fn get_testdata_filepath(base_path: &str, filename: &str) -> PathBuf {
    let source = Path::new(base_path);

    let from_src: PathBuf = source
        .components()
        .skip_while(|c| *c != Component::Normal("src".as_ref()))
        .collect();

    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push(from_src.parent().unwrap_or(Path::new("src")));
    path.push("testdata");
    path.push(filename);

    path
}

#[macro_export]
macro_rules! testdata {
    ($filepath:expr) => {{
        crate::test_common::get_testdata_filepath(file!(), $filepath)
    }};
}

#[macro_export]
macro_rules! assert_md5 {
    ($data:expr, $hashstr: expr) => {
        let digest = md5::compute($data);
        let checksum = format!("{:x}", digest);
        assert_eq!(checksum, $hashstr);
    };
}
