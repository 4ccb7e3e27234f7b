//! Full-screen terminal backend.
//!
//! Drawing calls fill an in-memory frame; [`Display::present()`] compares it with what is already
//! on screen and only writes the character cells that changed.
//!
//! A board cell takes as many terminal columns as the glyph is wide, so the board is narrower than
//! the terminal when the glyph is a double-width one.

use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use life::{CellGlyph, Display, Key};
use tracing::debug;

/// What one character cell of the terminal shows
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum Slot {
    #[default]
    Blank,

    /// A live cell, drawn with the current glyph in a palette color
    Cell(Option<u8>),

    /// One character of status text
    Char(char),

    /// Covered by the wide glyph to its left. Never printed.
    Continuation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Frame {
    rows: usize,
    cols: usize,
    slots: Vec<Slot>,
}

impl Frame {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            slots: vec![Slot::Blank; rows * cols],
        }
    }

    /// Out of bounds writes are dropped.
    ///
    /// Overwriting either half of a wide glyph blanks the other half, so a terminal never gets
    /// half a glyph to draw.
    fn set(&mut self, row: usize, col: usize, slot: Slot) {
        if row >= self.rows || col >= self.cols {
            return;
        }

        let idx = col + row * self.cols;
        if self.slots[idx] == Slot::Continuation && col > 0 {
            self.slots[idx - 1] = Slot::Blank;
        }
        if col + 1 < self.cols && self.slots[idx + 1] == Slot::Continuation {
            self.slots[idx + 1] = Slot::Blank;
        }
        self.slots[idx] = slot;
    }

    /// Writes a slot `width` columns wide. Dropped unless all of it fits.
    fn set_wide(&mut self, row: usize, col: usize, width: usize, slot: Slot) {
        if width == 0 || col + width > self.cols {
            return;
        }

        // Clear under the tail first, then mark it once the lead is in place
        for c in col + 1..col + width {
            self.set(row, c, Slot::Blank);
        }
        self.set(row, col, slot);
        let start = col + row * self.cols;
        for s in &mut self.slots[start + 1..start + width] {
            *s = Slot::Continuation;
        }
    }

    /// Draws board cell `col` as a live glyph spanning `width` terminal columns
    fn put_cell(&mut self, row: usize, col: usize, width: usize, color: Option<u8>) {
        self.set_wide(row, col * width, width, Slot::Cell(color));
    }

    fn clear_cell(&mut self, row: usize, col: usize, width: usize) {
        for c in col * width..(col + 1) * width {
            self.set(row, c, Slot::Blank);
        }
    }

    /// `(row, col, slot)` for every slot that differs from `shown`, or every slot when `everything`
    fn changes<'a>(
        &'a self,
        shown: &'a Frame,
        everything: bool,
    ) -> impl Iterator<Item = (usize, usize, Slot)> + 'a {
        let cols = self.cols.max(1);
        self.slots
            .iter()
            .zip(&shown.slots)
            .enumerate()
            .filter(move |(_, (new, old))| everything || new != old)
            .map(move |(idx, (new, _))| (idx / cols, idx % cols, *new))
    }
}

/// A [`Display`] that takes over the terminal: raw mode, alternate screen, hidden cursor.
///
/// Everything is put back when it's dropped.
pub struct TerminalDisplay {
    out: BufWriter<Stdout>,

    /// Every live cell is drawn with the same glyph, so we keep one copy instead of one per slot
    glyph: String,

    /// Terminal columns per board cell
    cell_width: usize,

    shown: Frame,
    pending: Frame,
    redraw_all: bool,
}

impl TerminalDisplay {
    /// Takes over the terminal, with board cells as wide as `glyph`
    pub fn new(glyph: &CellGlyph) -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let mut out = BufWriter::new(io::stdout());
        if let Err(err) = execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))
        {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }

        Ok(Self {
            out,
            glyph: glyph.as_str().to_string(),
            cell_width: glyph.width().max(1),
            shown: Frame::new(0, 0),
            pending: Frame::new(0, 0),
            redraw_all: true,
        })
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = execute!(self.out, ResetColor, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Display for TerminalDisplay {
    fn size(&mut self) -> io::Result<(usize, usize)> {
        let (cols, rows) = terminal::size()?;
        let (rows, cols) = (rows as usize, cols as usize);

        if (rows, cols) != (self.pending.rows, self.pending.cols) {
            debug!(rows, cols, "terminal resized");
            self.shown = Frame::new(rows, cols);
            self.pending = Frame::new(rows, cols);
            self.redraw_all = true;
            queue!(self.out, Clear(ClearType::All))?;
        }

        Ok((rows, cols / self.cell_width))
    }

    fn draw_cell(&mut self, row: usize, col: usize, glyph: &str, color: Option<u8>) {
        if glyph != self.glyph {
            self.glyph = glyph.to_string();
            self.redraw_all = true;
        }
        self.pending.put_cell(row, col, self.cell_width, color);
    }

    fn clear_cell(&mut self, row: usize, col: usize) {
        self.pending.clear_cell(row, col, self.cell_width);
    }

    fn draw_text(&mut self, row: usize, col: usize, text: &str) {
        let start = col * self.cell_width;
        for (i, ch) in text.chars().enumerate() {
            self.pending.set(row, start + i, Slot::Char(ch));
        }
    }

    fn present(&mut self) -> io::Result<()> {
        // `None` is the terminal's default color, so start from "unknown"
        let mut pen: Option<Option<u8>> = None;

        for (row, col, slot) in self.pending.changes(&self.shown, self.redraw_all) {
            if slot == Slot::Continuation {
                continue;
            }

            queue!(self.out, cursor::MoveTo(col as u16, row as u16))?;
            match slot {
                Slot::Blank | Slot::Continuation => queue!(self.out, Print(' '))?,
                Slot::Cell(color) => {
                    set_pen(&mut self.out, &mut pen, color)?;
                    queue!(self.out, Print(&self.glyph))?;
                }
                Slot::Char(ch) => {
                    set_pen(&mut self.out, &mut pen, None)?;
                    queue!(self.out, Print(ch))?;
                }
            }
        }

        queue!(self.out, ResetColor)?;
        self.out.flush()?;

        self.shown.slots.copy_from_slice(&self.pending.slots);
        self.redraw_all = false;
        Ok(())
    }

    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        // Drain resizes, mouse movement, etc. so they can't hide a key press
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    return Ok(Some(convert_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn read_line(
        &mut self,
        row: usize,
        col: usize,
        prompt: &str,
        max_len: usize,
    ) -> io::Result<String> {
        let mut line = String::new();

        queue!(
            self.out,
            cursor::MoveTo((col * self.cell_width) as u16, row as u16),
            Clear(ClearType::CurrentLine),
            Print(prompt),
            cursor::Show
        )?;
        self.out.flush()?;

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match convert_key(key) {
                Key::Enter => break,
                Key::Escape => {
                    line.clear();
                    break;
                }
                Key::Interrupt => {
                    return Err(io::Error::new(
                        io::ErrorKind::Interrupted,
                        "interrupted at the pattern prompt",
                    ));
                }
                Key::Backspace => {
                    if line.pop().is_some() {
                        queue!(
                            self.out,
                            cursor::MoveLeft(1),
                            Print(' '),
                            cursor::MoveLeft(1)
                        )?;
                    }
                }
                Key::Char(c) if !c.is_control() && line.chars().count() < max_len => {
                    line.push(c);
                    queue!(self.out, Print(c))?;
                }
                _ => {}
            }
            self.out.flush()?;
        }

        // The prompt is gone, and so is anything the next present() thought was on screen
        queue!(self.out, cursor::Hide, Clear(ClearType::All))?;
        self.out.flush()?;
        self.redraw_all = true;

        Ok(line)
    }
}

fn set_pen(out: &mut impl Write, pen: &mut Option<Option<u8>>, color: Option<u8>) -> io::Result<()> {
    if *pen == Some(color) {
        return Ok(());
    }

    match color {
        Some(index) => queue!(out, SetForegroundColor(Color::AnsiValue(index)))?,
        None => queue!(out, ResetColor)?,
    }
    *pen = Some(color);
    Ok(())
}

fn convert_key(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        _ => Key::Other,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn check_frame_changes() {
        let shown = Frame::new(2, 3);
        let mut pending = Frame::new(2, 3);
        pending.set(0, 2, Slot::Cell(Some(3)));
        pending.set(1, 0, Slot::Char('G'));

        let changes: Vec<_> = pending.changes(&shown, false).collect();
        assert_eq!(
            changes,
            vec![(0, 2, Slot::Cell(Some(3))), (1, 0, Slot::Char('G'))]
        );

        assert_eq!(pending.changes(&shown, true).count(), 6);
        assert_eq!(pending.changes(&pending, false).count(), 0);
    }

    #[test]
    fn check_frame_ignores_out_of_bounds() {
        let mut frame = Frame::new(2, 2);
        frame.set(2, 0, Slot::Char('x'));
        frame.set(0, 2, Slot::Char('x'));
        assert_eq!(frame, Frame::new(2, 2));
    }

    #[test]
    fn check_wide_glyph_survives_dying_neighbor() {
        let mut shown = Frame::new(1, 4);
        shown.put_cell(0, 0, 2, Some(1));
        shown.put_cell(0, 1, 2, Some(1));
        assert_eq!(
            shown.slots,
            vec![
                Slot::Cell(Some(1)),
                Slot::Continuation,
                Slot::Cell(Some(1)),
                Slot::Continuation
            ]
        );

        let mut pending = shown.clone();
        pending.put_cell(0, 0, 2, Some(1));
        pending.clear_cell(0, 1, 2);

        // Only the dead cell's own columns are rewritten, nothing lands inside the live glyph
        let changes: Vec<_> = pending.changes(&shown, false).collect();
        assert_eq!(changes, vec![(0, 2, Slot::Blank), (0, 3, Slot::Blank)]);
        assert_eq!(pending.slots[..2], [Slot::Cell(Some(1)), Slot::Continuation]);
    }

    #[test]
    fn check_wide_glyph_recolor_redraws_lead() {
        let mut shown = Frame::new(1, 2);
        shown.put_cell(0, 0, 2, Some(1));

        let mut pending = shown.clone();
        pending.put_cell(0, 0, 2, Some(2));

        let changes: Vec<_> = pending.changes(&shown, false).collect();
        assert_eq!(changes, vec![(0, 0, Slot::Cell(Some(2)))]);
    }

    #[test]
    fn check_wide_glyph_never_overflows() {
        let mut frame = Frame::new(1, 3);
        frame.put_cell(0, 1, 2, None);
        assert_eq!(frame, Frame::new(1, 3));
    }

    #[test]
    fn check_text_over_half_a_wide_glyph() {
        let mut frame = Frame::new(1, 4);
        frame.put_cell(0, 0, 2, None);
        frame.put_cell(0, 1, 2, None);

        frame.set(0, 1, Slot::Char('G'));
        frame.set(0, 2, Slot::Char('e'));
        assert_eq!(
            frame.slots,
            vec![Slot::Blank, Slot::Char('G'), Slot::Char('e'), Slot::Blank]
        );
    }

    #[rstest]
    #[case(KeyCode::Char('q'), KeyModifiers::NONE, Key::Char('q'))]
    #[case(KeyCode::Char('+'), KeyModifiers::SHIFT, Key::Char('+'))]
    #[case(KeyCode::Char('c'), KeyModifiers::CONTROL, Key::Interrupt)]
    #[case(KeyCode::Char('c'), KeyModifiers::NONE, Key::Char('c'))]
    #[case(KeyCode::Esc, KeyModifiers::NONE, Key::Escape)]
    #[case(KeyCode::Enter, KeyModifiers::NONE, Key::Enter)]
    #[case(KeyCode::Backspace, KeyModifiers::NONE, Key::Backspace)]
    #[case(KeyCode::Up, KeyModifiers::NONE, Key::Other)]
    fn check_convert_key(#[case] code: KeyCode, #[case] modifiers: KeyModifiers, #[case] expected: Key) {
        assert_eq!(convert_key(KeyEvent::new(code, modifiers)), expected);
    }

    #[test]
    fn check_pen_only_changes_when_needed() {
        let mut out = Vec::new();
        let mut pen = None;

        set_pen(&mut out, &mut pen, Some(2)).unwrap();
        let after_first = out.len();
        assert!(after_first > 0);

        set_pen(&mut out, &mut pen, Some(2)).unwrap();
        assert_eq!(out.len(), after_first);

        set_pen(&mut out, &mut pen, None).unwrap();
        assert!(out.len() > after_first);
        assert_eq!(pen, Some(None));
    }
}
