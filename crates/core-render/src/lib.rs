//! Double-buffered terminal cell compositor.
//!
//! `Compositor` holds four row-major grids sized `rows x cols`:
//! `chars_pending`/`styles_pending` (what the next frame should show) and
//! `chars_written`/`styles_written` (what the terminal currently shows).
//! `set` only ever touches the pending grids; `update` walks touched rows,
//! diffs pending against written cell by cell, and appends the minimal
//! cursor-move / style-change / byte edit script to an output buffer;
//! `flush` writes that buffer out in one shot. No cell is inspected or
//! emitted outside a call to `update`, so the cost of an edit is
//! proportional to how much actually changed, not to screen size.

pub mod style;

use core_text::StyleClass;
use crossterm::terminal;
use std::io::{self, Write};
use style::{Attrs, ColorScheme};

/// A cell's style payload: its class plus whether the star (search-match)
/// bit is set. `None` in the written grid means "unknown" -- never
/// written since the last `invalidate()` -- and always counts as a
/// mismatch against pending.
pub type CellStyle = (StyleClass, bool);

/// Terminal-facing cell compositor. Construct with the current terminal
/// size; call `get_window_size` periodically (or on a resize signal) to
/// pick up changes.
pub struct Compositor {
    rows: u16,
    cols: u16,
    chars_pending: Vec<u8>,
    styles_pending: Vec<CellStyle>,
    chars_written: Vec<u8>,
    styles_written: Vec<Option<CellStyle>>,
    row_touched: Vec<bool>,
    out: Vec<u8>,
    cur_style: Option<CellStyle>,
    cur_pos: Option<(u16, u16)>,
    scheme: ColorScheme,
}

impl Compositor {
    pub fn new(rows: u16, cols: u16) -> Self {
        let n = rows as usize * cols as usize;
        let mut c = Compositor {
            rows,
            cols,
            chars_pending: vec![b' '; n],
            styles_pending: vec![(StyleClass::Normal, false); n],
            chars_written: vec![0u8; n],
            styles_written: vec![None; n],
            row_touched: vec![false; rows as usize],
            out: Vec::new(),
            cur_style: None,
            cur_pos: None,
            scheme: ColorScheme::DEFAULT,
        };
        c.invalidate();
        c
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        self.scheme = scheme;
    }

    fn index(&self, row: u16, col: u16) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row as usize * self.cols as usize + col as usize)
        } else {
            None
        }
    }

    /// `index` still returns `Some` for the bottom-right cell (so `set`
    /// can legitimately store a value there), but `update` skips emitting
    /// it -- writing to that cell triggers unwanted auto-scroll on some
    /// terminals.
    fn is_scroll_unsafe(&self, row: u16, col: u16) -> bool {
        self.rows > 0 && self.cols > 0 && row == self.rows - 1 && col == self.cols - 1
    }

    /// Writes `byte` with `style` at `(row, col)` into the pending grid.
    /// Out-of-range coordinates are silently ignored (callers compute
    /// coordinates from already-clamped view geometry).
    pub fn set(&mut self, row: u16, col: u16, byte: u8, style: CellStyle) {
        let Some(idx) = self.index(row, col) else {
            return;
        };
        self.chars_pending[idx] = byte;
        self.styles_pending[idx] = style;
        self.row_touched[row as usize] = true;
    }

    /// Diffs pending against written for every touched row, appending a
    /// minimal edit script to the output buffer. Returns whether any byte
    /// was enqueued. Does not touch the terminal.
    pub fn update(&mut self) -> bool {
        let mut any = false;
        for row in 0..self.rows {
            if !self.row_touched[row as usize] {
                continue;
            }
            for col in 0..self.cols {
                if self.is_scroll_unsafe(row, col) {
                    continue;
                }
                let idx = self.index(row, col).unwrap();
                let pending = (self.chars_pending[idx], self.styles_pending[idx]);
                let written = (self.chars_written[idx], self.styles_written[idx]);
                if written.1 == Some(pending.1) && written.0 == pending.0 {
                    continue;
                }
                self.emit_move(row, col);
                self.emit_style(pending.1);
                self.out.push(pending.0);
                self.chars_written[idx] = pending.0;
                self.styles_written[idx] = Some(pending.1);
                self.cur_pos = Some((row, col + 1));
                any = true;
            }
            self.row_touched[row as usize] = false;
        }
        any
    }

    fn emit_move(&mut self, row: u16, col: u16) {
        if self.cur_pos == Some((row, col)) {
            return;
        }
        use crossterm::cursor::MoveTo;
        use crossterm::QueueableCommand;
        let mut buf = io::Cursor::new(Vec::new());
        let _ = buf.queue(MoveTo(col, row));
        self.out.extend_from_slice(buf.get_ref());
    }

    fn emit_style(&mut self, style: CellStyle) {
        if self.cur_style == Some(style) {
            return;
        }
        self.cur_style = Some(style);
        let attrs = self.attrs_for(style);
        use crossterm::style::Attribute;
        use crossterm::style::{SetAttribute, SetBackgroundColor, SetForegroundColor};
        use crossterm::QueueableCommand;
        let mut buf = io::Cursor::new(Vec::new());
        let _ = buf.queue(SetAttribute(Attribute::Reset));
        let _ = buf.queue(SetForegroundColor(attrs.fg));
        let _ = buf.queue(SetBackgroundColor(attrs.bg));
        if attrs.bold {
            let _ = buf.queue(SetAttribute(Attribute::Bold));
        }
        self.out.extend_from_slice(buf.get_ref());
    }

    fn attrs_for(&self, (class, star): CellStyle) -> Attrs {
        self.scheme.attrs(class, star)
    }

    /// Writes the output buffer to the terminal in a single I/O call and
    /// clears it.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }
        let mut stdout = io::stdout();
        stdout.write_all(&self.out)?;
        stdout.flush()?;
        self.out.clear();
        Ok(())
    }

    /// Forces a full repaint on the next `update()`: marks every written
    /// cell's style `Unknown` and every row touched.
    pub fn invalidate(&mut self) {
        for s in self.styles_written.iter_mut() {
            *s = None;
        }
        for t in self.row_touched.iter_mut() {
            *t = true;
        }
        self.cur_style = None;
        self.cur_pos = None;
    }

    /// Queries the real terminal size; if it differs from the current
    /// grid dimensions, reallocates all grids (losing pending/written
    /// state) and invalidates. Returns the (possibly unchanged) size.
    pub fn get_window_size(&mut self) -> io::Result<(u16, u16)> {
        let (cols, rows) = terminal::size()?;
        if rows != self.rows || cols != self.cols {
            *self = Compositor::new(rows, cols);
        }
        Ok((self.rows, self.cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_update_enqueues_bytes() {
        let mut c = Compositor::new(3, 10);
        c.set(1, 2, b'x', (StyleClass::Normal, false));
        assert!(c.update());
        assert!(!c.out.is_empty());
    }

    #[test]
    fn update_with_no_changes_is_a_noop() {
        let mut c = Compositor::new(3, 10);
        assert!(!c.update());
        assert!(c.out.is_empty());
    }

    #[test]
    fn repeating_set_same_value_does_not_reemit() {
        let mut c = Compositor::new(3, 10);
        c.set(0, 0, b'a', (StyleClass::Normal, false));
        assert!(c.update());
        c.out.clear();
        c.set(0, 0, b'a', (StyleClass::Normal, false));
        assert!(!c.update());
        assert!(c.out.is_empty());
    }

    #[test]
    fn bottom_right_cell_is_never_emitted() {
        let mut c = Compositor::new(2, 2);
        c.set(1, 1, b'z', (StyleClass::Normal, false));
        assert!(!c.update());
    }

    #[test]
    fn invalidate_forces_reemission_of_unchanged_cells() {
        let mut c = Compositor::new(2, 5);
        c.set(0, 0, b'a', (StyleClass::Normal, false));
        c.update();
        c.out.clear();
        c.invalidate();
        c.set(0, 0, b'a', (StyleClass::Normal, false));
        assert!(c.update());
        assert!(!c.out.is_empty());
    }
}
