//! `View`: a window-over-`FileBuf` projection. Owns scroll position,
//! cursor, tile geometry, and visual-mode selection state; drives a
//! `Compositor` to render itself.

use crate::tile::Tile;
use core_render::Compositor;
use core_state::FileBuf;
use core_text::StyleClass;

/// Whether a visual selection is character-ranged (line-wrap-sensitive
/// start/end) or a strict column-aligned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Character,
    Block,
}

#[derive(Debug, Clone, Copy)]
pub struct VisualState {
    pub kind: VisualKind,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl VisualState {
    pub fn new(kind: VisualKind, line: usize, col: usize) -> Self {
        Self { kind, start_line: line, start_col: col, end_line: line, end_col: col }
    }

    /// Moves the tracked end to the cursor's new position.
    pub fn update_end(&mut self, line: usize, col: usize) {
        self.end_line = line;
        self.end_col = col;
    }

    /// Canonicalises so the range reads `start <= end` in file order.
    pub fn canonical(&self) -> (usize, usize, usize, usize) {
        if (self.start_line, self.start_col) <= (self.end_line, self.end_col) {
            (self.start_line, self.start_col, self.end_line, self.end_col)
        } else {
            (self.end_line, self.end_col, self.start_line, self.start_col)
        }
    }
}

pub struct View {
    pub tile: Tile,
    pub top_line: usize,
    pub left_col: usize,
    pub cursor_row: u16,
    pub cursor_col: u16,
    pub visual: Option<VisualState>,
}

impl View {
    pub fn new(tile: Tile) -> Self {
        Self { tile, top_line: 0, left_col: 0, cursor_row: 0, cursor_col: 0, visual: None }
    }

    pub fn file_line(&self) -> usize {
        self.top_line + self.cursor_row as usize
    }

    pub fn file_col(&self) -> usize {
        self.left_col + self.cursor_col as usize
    }

    fn working_size(&self, screen_rows: u16, screen_cols: u16) -> (u16, u16) {
        self.tile.working_size(screen_rows, screen_cols)
    }

    /// Moves the cursor to `(line, col)` (already clamped to file bounds
    /// by the caller), scrolling the window if the target falls outside
    /// it. Returns `true` if a scroll occurred (the caller should then do
    /// a full redraw rather than a cursor-only one).
    pub fn place_cursor(&mut self, line: usize, col: usize, screen_rows: u16, screen_cols: u16) -> bool {
        let (working_rows, working_cols) = self.working_size(screen_rows, screen_cols);
        let mut scrolled = false;

        if line < self.top_line {
            self.top_line = line;
            scrolled = true;
        } else if line >= self.top_line + working_rows as usize {
            self.top_line = line + 1 - working_rows as usize;
            scrolled = true;
        }
        if col < self.left_col {
            self.left_col = col;
            scrolled = true;
        } else if col >= self.left_col + working_cols as usize {
            self.left_col = col + 1 - working_cols as usize;
            scrolled = true;
        }

        self.cursor_row = (line - self.top_line) as u16;
        self.cursor_col = (col - self.left_col) as u16;

        if let Some(v) = &mut self.visual {
            v.update_end(line, col);
        }
        scrolled
    }

    pub fn go_left(&mut self, screen_rows: u16, screen_cols: u16) {
        let col = self.file_col().saturating_sub(1);
        self.place_cursor(self.file_line(), col, screen_rows, screen_cols);
    }

    pub fn go_right(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = self.file_line();
        let max_col = fb.line(line).len().saturating_sub(1);
        let col = (self.file_col() + 1).min(max_col);
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    pub fn go_up(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = self.file_line().saturating_sub(1);
        let col = self.file_col().min(fb.line(line).len().saturating_sub(1));
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    pub fn go_down(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = (self.file_line() + 1).min(fb.num_lines().saturating_sub(1));
        let col = self.file_col().min(fb.line(line).len().saturating_sub(1));
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    pub fn go_line_start(&mut self, screen_rows: u16, screen_cols: u16) {
        self.place_cursor(self.file_line(), 0, screen_rows, screen_cols);
    }

    pub fn go_line_end(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = self.file_line();
        let col = fb.line(line).len().saturating_sub(1);
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    pub fn go_top(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let col = self.file_col().min(fb.line(0).len().saturating_sub(1));
        self.place_cursor(0, col, screen_rows, screen_cols);
    }

    pub fn go_bottom(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = fb.num_lines().saturating_sub(1);
        let col = self.file_col().min(fb.line(line).len().saturating_sub(1));
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    pub fn go_page_down(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let (working_rows, _) = self.working_size(screen_rows, screen_cols);
        let line = (self.file_line() + working_rows as usize).min(fb.num_lines().saturating_sub(1));
        let col = self.file_col().min(fb.line(line).len().saturating_sub(1));
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    pub fn go_page_up(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let (working_rows, _) = self.working_size(screen_rows, screen_cols);
        let line = self.file_line().saturating_sub(working_rows as usize);
        let col = self.file_col().min(fb.line(line).len().saturating_sub(1));
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    /// Forward word-boundary motion: skip the current run of
    /// alphanumeric/underscore bytes (if any), then skip whitespace,
    /// landing on the first byte of the next word. Stays within the
    /// current line.
    pub fn go_word_forward(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = self.file_line();
        let bytes = fb.line(line).as_bytes();
        let mut c = self.file_col();
        if c < bytes.len() && is_word_byte(bytes[c]) {
            while c < bytes.len() && is_word_byte(bytes[c]) {
                c += 1;
            }
        }
        while c < bytes.len() && bytes[c] == b' ' {
            c += 1;
        }
        let col = c.min(bytes.len().saturating_sub(1));
        self.place_cursor(line, col, screen_rows, screen_cols);
    }

    /// Mirror image of `go_word_forward`, searching backward.
    pub fn go_word_backward(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = self.file_line();
        let bytes = fb.line(line).as_bytes();
        let mut c = self.file_col();
        while c > 0 && bytes[c - 1] == b' ' {
            c -= 1;
        }
        while c > 0 && is_word_byte(bytes[c - 1]) {
            c -= 1;
        }
        self.place_cursor(line, c, screen_rows, screen_cols);
    }

    /// Finds the matching bracket for the byte under the cursor, scanning
    /// forward or backward with a nesting depth counter. No-op if the
    /// cursor isn't on a bracket.
    pub fn go_bracket_match(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) {
        let line = self.file_line();
        let col = self.file_col();
        let byte = fb.line(line).get(col);
        let (open, close, forward) = match byte {
            b'(' => (b'(', b')', true),
            b'[' => (b'[', b']', true),
            b'{' => (b'{', b'}', true),
            b')' => (b'(', b')', false),
            b']' => (b'[', b']', false),
            b'}' => (b'{', b'}', false),
            _ => return,
        };
        let mut depth = 0i32;
        let mut l = line;
        let mut c = col as isize;
        loop {
            let bytes = fb.line(l).as_bytes();
            if forward {
                while (c as usize) < bytes.len() {
                    let b = bytes[c as usize];
                    if b == open {
                        depth += 1;
                    } else if b == close {
                        depth -= 1;
                        if depth == 0 {
                            self.place_cursor(l, c as usize, screen_rows, screen_cols);
                            return;
                        }
                    }
                    c += 1;
                }
                if l + 1 >= fb.num_lines() {
                    return;
                }
                l += 1;
                c = 0;
            } else {
                while c >= 0 {
                    let b = bytes[c as usize];
                    if b == close {
                        depth += 1;
                    } else if b == open {
                        depth -= 1;
                        if depth == 0 {
                            self.place_cursor(l, c as usize, screen_rows, screen_cols);
                            return;
                        }
                    }
                    c -= 1;
                }
                if l == 0 {
                    return;
                }
                l -= 1;
                c = fb.line(l).len() as isize - 1;
            }
        }
    }

    /// Jumps to the next star-marked byte after the cursor, wrapping once.
    pub fn go_search_next(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) -> bool {
        self.seek_star(fb, screen_rows, screen_cols, true)
    }

    /// Mirror image of `go_search_next`, searching backward.
    pub fn go_search_prev(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16) -> bool {
        self.seek_star(fb, screen_rows, screen_cols, false)
    }

    fn seek_star(&mut self, fb: &FileBuf, screen_rows: u16, screen_cols: u16, forward: bool) -> bool {
        let n = fb.num_lines();
        if n == 0 {
            return false;
        }
        let start = (self.file_line(), self.file_col());
        let mut l = start.0;
        let mut c = start.1 as isize + if forward { 1 } else { -1 };
        loop {
            let len = fb.line(l).len() as isize;
            if c < 0 {
                if l == 0 {
                    return false;
                }
                l -= 1;
                c = fb.line(l).len() as isize - 1;
                continue;
            }
            if c >= len {
                if l + 1 >= n {
                    return false;
                }
                l += 1;
                c = 0;
                continue;
            }
            if fb.style(l).get(c as usize).star {
                self.place_cursor(l, c as usize, screen_rows, screen_cols);
                return true;
            }
            if (l, c as usize) == start {
                return false;
            }
            c += if forward { 1 } else { -1 };
        }
    }

    /// Begins (or, if already active with the same kind, clears) a visual
    /// selection anchored at the current cursor position.
    pub fn toggle_visual(&mut self, kind: VisualKind) {
        match &self.visual {
            Some(v) if v.kind == kind => self.visual = None,
            _ => {
                self.visual = Some(VisualState::new(kind, self.file_line(), self.file_col()));
            }
        }
    }

    pub fn clear_visual(&mut self) {
        self.visual = None;
    }

    /// Whether `(line, col)` falls inside the current (canonicalised)
    /// visual selection.
    pub fn in_visual_selection(&self, line: usize, col: usize) -> bool {
        let Some(v) = &self.visual else { return false };
        let (sl, sc, el, ec) = v.canonical();
        match v.kind {
            VisualKind::Block => {
                let (lo_c, hi_c) = if sc <= ec { (sc, ec) } else { (ec, sc) };
                line >= sl && line <= el && col >= lo_c && col <= hi_c
            }
            VisualKind::Character => {
                if sl == el {
                    line == sl && col >= sc && col <= ec
                } else {
                    (line == sl && col >= sc) || (line == el && col <= ec) || (line > sl && line < el)
                }
            }
        }
    }

    /// Full redraw: borders, working area, status line, filename line,
    /// command line, in that order, matching the mandated draw sequence.
    pub fn redraw(&mut self, fb: &FileBuf, comp: &mut Compositor) {
        let (x, y, rows, cols) = self.tile.geometry(comp.rows(), comp.cols());
        self.draw_border(comp, x, y, rows, cols);
        self.draw_filename_line(fb, comp, x, y, cols);
        self.draw_working_area(fb, comp, x, y, rows, cols);
        self.draw_status_line(fb, comp, x, y, rows, cols);
    }

    fn draw_border(&self, comp: &mut Compositor, x: u16, y: u16, rows: u16, cols: u16) {
        for c in 0..cols {
            comp.set(y, x + c, b'-', (StyleClass::Normal, false));
            if rows > 0 {
                comp.set(y + rows - 1, x + c, b'-', (StyleClass::Normal, false));
            }
        }
        for r in 0..rows {
            comp.set(y + r, x, b'|', (StyleClass::Normal, false));
            if cols > 0 {
                comp.set(y + r, x + cols - 1, b'|', (StyleClass::Normal, false));
            }
        }
    }

    fn draw_filename_line(&self, fb: &FileBuf, comp: &mut Compositor, x: u16, y: u16, cols: u16) {
        let name = fb
            .file_path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "[No Name]".to_string());
        self.draw_text_row(comp, x + 1, y + 1, cols.saturating_sub(2), name.as_bytes(), StyleClass::Normal);
    }

    fn draw_working_area(&self, fb: &FileBuf, comp: &mut Compositor, x: u16, y: u16, rows: u16, cols: u16) {
        let (working_rows, working_cols) = Tile::working_size_from_rect(rows, cols);
        let (ox, oy) = (x + 1, y + 2);
        for row in 0..working_rows {
            let file_line = self.top_line + row as usize;
            if file_line >= fb.num_lines() {
                comp.set(oy + row, ox, b'~', (StyleClass::Empty, false));
                continue;
            }
            let line = fb.line(file_line);
            let style = fb.style(file_line);
            for col in 0..working_cols {
                let file_col = self.left_col + col as usize;
                let byte = if file_col < line.len() { line.get(file_col) } else { b' ' };
                let sb = if file_col < style.len() { style.get(file_col) } else { Default::default() };
                let class = if self.in_visual_selection(file_line, file_col) { StyleClass::Visual } else { sb.class };
                comp.set(oy + row, ox + col, byte, (class, sb.star));
            }
        }
    }

    fn draw_status_line(&self, fb: &FileBuf, comp: &mut Compositor, x: u16, y: u16, rows: u16, cols: u16) {
        let line = self.file_line();
        let col = self.file_col();
        let (total_lines, total_bytes) = fb.get_size();
        let byte_offset = fb.get_cursor_byte(line, col);
        let percent = if total_bytes == 0 { 100 } else { (byte_offset * 100 / total_bytes).min(100) };
        let under_cursor = fb.line(line).get(col.min(fb.line(line).len().saturating_sub(1)));
        let status = format!(
            "{}:{}  byte {}/{}  {}%  0x{:02x}",
            line + 1,
            col + 1,
            byte_offset,
            total_bytes,
            percent,
            under_cursor
        );
        let _ = total_lines;
        let status_y = y + rows.saturating_sub(2);
        self.draw_text_row(comp, x + 1, status_y, cols.saturating_sub(2), status.as_bytes(), StyleClass::Control);
    }

    fn draw_text_row(&self, comp: &mut Compositor, x: u16, y: u16, width: u16, text: &[u8], class: StyleClass) {
        for col in 0..width {
            let byte = text.get(col as usize).copied().unwrap_or(b' ');
            comp.set(y, x + col, byte, (class, false));
        }
    }

    /// Positions the real terminal cursor at this view's file cursor.
    pub fn print_cursor(&self, comp: &Compositor) -> std::io::Result<()> {
        use crossterm::cursor::MoveTo;
        use crossterm::execute;
        let (x, y) = self.tile.working_origin(comp.rows(), comp.cols());
        execute!(std::io::stdout(), MoveTo(x + self.cursor_col, y + self.cursor_row))
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Line;
    use std::path::PathBuf;

    fn fb(lines: &[&str]) -> FileBuf {
        let lines: Vec<Line> = lines.iter().map(|s| Line::from_slice(s.as_bytes())).collect();
        FileBuf::from_lines(PathBuf::from("t.txt"), lines, true)
    }

    #[test]
    fn go_down_clamps_column_to_shorter_line() {
        let buf = fb(&["hello", "hi"]);
        let mut v = View::new(Tile::Full);
        v.place_cursor(0, 4, 24, 80);
        v.go_down(&buf, 24, 80);
        assert_eq!(v.file_line(), 1);
        assert_eq!(v.file_col(), 1);
    }

    #[test]
    fn place_cursor_scrolls_when_out_of_window() {
        let mut v = View::new(Tile::Full);
        let scrolled = v.place_cursor(0, 0, 10, 40);
        assert!(!scrolled);
        let scrolled = v.place_cursor(100, 0, 10, 40);
        assert!(scrolled);
        assert!(v.top_line > 0);
    }

    #[test]
    fn word_forward_skips_current_word_then_whitespace() {
        let buf = fb(&["foo bar baz"]);
        let mut v = View::new(Tile::Full);
        v.go_word_forward(&buf, 24, 80);
        assert_eq!(v.file_col(), 4);
    }

    #[test]
    fn bracket_match_finds_closing_paren() {
        let buf = fb(&["f(a, b)"]);
        let mut v = View::new(Tile::Full);
        v.place_cursor(0, 1, 24, 80);
        v.go_bracket_match(&buf, 24, 80);
        assert_eq!(v.file_col(), 6);
    }

    #[test]
    fn character_visual_selection_spans_multiple_lines() {
        let mut v = View::new(Tile::Full);
        v.place_cursor(0, 3, 24, 80);
        v.toggle_visual(VisualKind::Character);
        v.place_cursor(2, 1, 24, 80);
        assert!(v.in_visual_selection(1, 0));
        assert!(!v.in_visual_selection(0, 2));
        assert!(v.in_visual_selection(0, 3));
        assert!(v.in_visual_selection(2, 0));
        assert!(!v.in_visual_selection(2, 2));
    }

    #[test]
    fn block_visual_selection_is_column_aligned() {
        let mut v = View::new(Tile::Full);
        v.place_cursor(0, 4, 24, 80);
        v.toggle_visual(VisualKind::Block);
        v.place_cursor(2, 1, 24, 80);
        assert!(v.in_visual_selection(1, 2));
        assert!(!v.in_visual_selection(1, 5));
    }
}
