use std::io;

use life::{Display, Key};
use minifb::{Key as WindowKey, KeyRepeat, Scale, ScaleMode, Window, WindowOptions};
use tracing::debug;

/// Screen pixels per cell, per side
pub const SCALE: usize = 8;

pub const AOC_BLUE: u32 = 0x0f_0f_23;
pub const AOC_GOLD: u32 = 0xff_ff_66;

/// The 16 standard ANSI colors, indexed the same way terminal color codes are
pub const ANSI_PALETTE: [u32; 16] = [
    0x00_00_00, 0xcd_00_00, 0x00_cd_00, 0xcd_cd_00, //
    0x00_00_ee, 0xcd_00_cd, 0x00_cd_cd, 0xe5_e5_e5, //
    0x7f_7f_7f, 0xff_00_00, 0x00_ff_00, 0xff_ff_00, //
    0x5c_5c_ff, 0xff_00_ff, 0x00_ff_ff, 0xff_ff_ff, //
];

fn pixel_for(color: Option<u8>) -> u32 {
    match color {
        Some(index) => ANSI_PALETTE[index as usize % ANSI_PALETTE.len()],
        None => AOC_GOLD,
    }
}

/// A [`Display`] backed by a pixel window, one scaled pixel per cell.
///
/// There's no font, so text and prompts are skipped.
pub struct WindowDisplay {
    window: Window,
    pixels: Vec<u32>,
    rows: usize,
    cols: usize,
}

impl WindowDisplay {
    /// Opens a window `cols` cells wide and `rows` cells tall
    pub fn new(cols: usize, rows: usize) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "👾 Conway Screensaver~!",
            cols,
            rows,
            WindowOptions {
                title: true,
                resize: true,
                scale: Scale::X8,
                scale_mode: ScaleMode::Stretch,

                ..WindowOptions::default()
            },
        )?;

        // Frames are paced by the update interval, this only caps how often minifb repaints
        window.set_target_fps(60);

        Ok(Self {
            window,
            pixels: vec![AOC_BLUE; rows * cols],
            rows,
            cols,
        })
    }

    fn set(&mut self, row: usize, col: usize, pixel: u32) {
        if row < self.rows && col < self.cols {
            self.pixels[col + row * self.cols] = pixel;
        }
    }
}

impl Display for WindowDisplay {
    fn size(&mut self) -> io::Result<(usize, usize)> {
        let (width, height) = self.window.get_size();
        let rows = (height / SCALE).max(1);
        let cols = (width / SCALE).max(1);

        if (rows, cols) != (self.rows, self.cols) {
            debug!(rows, cols, "window resized");
            self.rows = rows;
            self.cols = cols;
            self.pixels = vec![AOC_BLUE; rows * cols];
        }

        Ok((rows, cols))
    }

    fn draw_cell(&mut self, row: usize, col: usize, _glyph: &str, color: Option<u8>) {
        self.set(row, col, pixel_for(color));
    }

    fn clear_cell(&mut self, row: usize, col: usize) {
        self.set(row, col, AOC_BLUE);
    }

    fn draw_text(&mut self, _row: usize, _col: usize, _text: &str) {}

    fn present(&mut self) -> io::Result<()> {
        self.window
            .update_with_buffer(&self.pixels, self.cols, self.rows)
            .map_err(io::Error::other)
    }

    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        if !self.window.is_open() {
            return Ok(Some(Key::Escape));
        }

        let key = self
            .window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .map(convert_key)
            .find(|key| *key != Key::Other);
        Ok(key)
    }
}

fn convert_key(key: WindowKey) -> Key {
    match key {
        WindowKey::Escape => Key::Escape,
        WindowKey::Q => Key::Char('q'),
        WindowKey::R => Key::Char('r'),
        WindowKey::Equal | WindowKey::NumPadPlus => Key::Char('+'),
        WindowKey::Minus | WindowKey::NumPadMinus => Key::Char('-'),
        WindowKey::Enter => Key::Enter,
        WindowKey::Backspace => Key::Backspace,
        _ => Key::Other,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(WindowKey::Q, Key::Char('q'))]
    #[case(WindowKey::Escape, Key::Escape)]
    #[case(WindowKey::Equal, Key::Char('+'))]
    #[case(WindowKey::NumPadMinus, Key::Char('-'))]
    #[case(WindowKey::A, Key::Other)]
    fn check_convert_key(#[case] key: WindowKey, #[case] expected: Key) {
        assert_eq!(convert_key(key), expected);
    }

    #[test]
    fn check_palette() {
        assert_eq!(pixel_for(None), AOC_GOLD);
        assert_eq!(pixel_for(Some(1)), 0xcd_00_00);
        assert_eq!(pixel_for(Some(17)), 0xcd_00_00);
    }
}
