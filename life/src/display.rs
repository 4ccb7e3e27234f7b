use std::io;

/// A key press, as far as the screensaver cares
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Escape,

    /// Ctrl-C. Raw terminals deliver it as a key instead of a signal.
    Interrupt,

    /// Anything else: arrows, function keys, ...
    Other,
}

/// A character-cell screen the frame loop draws to and reads keys from.
///
/// Rows and columns are counted from the top-left. Drawing calls only stage content;
/// nothing needs to be visible until [`Display::present()`].
pub trait Display {
    /// The viewport as `(rows, cols)`. Polled once per frame.
    fn size(&mut self) -> io::Result<(usize, usize)>;

    /// Draws a live cell. `color` is an index into the backend's palette, `None` for the default.
    fn draw_cell(&mut self, row: usize, col: usize, glyph: &str, color: Option<u8>);

    /// Draws a dead cell
    fn clear_cell(&mut self, row: usize, col: usize);

    /// Draws text starting at `(row, col)`. Anything past the right edge is cut off.
    fn draw_text(&mut self, row: usize, col: usize, text: &str);

    /// Makes everything drawn since the last call visible
    fn present(&mut self) -> io::Result<()>;

    /// Returns the next pending key press without waiting for one
    fn poll_key(&mut self) -> io::Result<Option<Key>>;

    /// Shows `prompt` at `(row, col)` and blocks until the user enters a line, returning at most
    /// `max_len` characters of it.
    ///
    /// Backends that can't take text input return an empty line.
    fn read_line(
        &mut self,
        row: usize,
        col: usize,
        prompt: &str,
        max_len: usize,
    ) -> io::Result<String> {
        let _ = (row, col, prompt, max_len);
        Ok(String::new())
    }
}

impl<D: Display + ?Sized> Display for &mut D {
    fn size(&mut self) -> io::Result<(usize, usize)> {
        (**self).size()
    }

    fn draw_cell(&mut self, row: usize, col: usize, glyph: &str, color: Option<u8>) {
        (**self).draw_cell(row, col, glyph, color)
    }

    fn clear_cell(&mut self, row: usize, col: usize) {
        (**self).clear_cell(row, col)
    }

    fn draw_text(&mut self, row: usize, col: usize, text: &str) {
        (**self).draw_text(row, col, text)
    }

    fn present(&mut self) -> io::Result<()> {
        (**self).present()
    }

    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        (**self).poll_key()
    }

    fn read_line(
        &mut self,
        row: usize,
        col: usize,
        prompt: &str,
        max_len: usize,
    ) -> io::Result<String> {
        (**self).read_line(row, col, prompt, max_len)
    }
}
