//! Modal key dispatcher: the thin layer that turns a stream of
//! `core_events::KeyEvent`s into calls against `FileBuf`, `View`,
//! `DiffEngine`, and `Compositor`. Chord accumulation (counts,
//! operators, register prefixes) is delegated to `core-keymap`; this
//! crate owns the editor's mode state and decides what each composed
//! action actually does to the buffer and view.

mod registers;

use core_diff::DiffEngine;
use core_events::{KeyEvent, KeyToken, NamedKey};
use core_keymap::{
    baseline_normal_specs, compose_with_context, ComposedAction, MappingTrie, PendingContext,
    Resolution,
};
use core_model::{View, VisualKind};
use core_state::FileBuf;
use core_text::Position;

pub use registers::{Register, RegisterFile};

/// Top-level editing mode. Visual selection is tracked on `View` itself
/// (it needs to survive redraws); this only distinguishes the three
/// modes that change how a keystroke is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Colon,
}

/// A parsed `:` command. Executing `Write`/`Quit`/... against the
/// filesystem is the caller's job (opening/saving files is out of
/// scope here); this crate only parses the line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColonCommand {
    Write,
    WriteQuit,
    Quit,
    ForceQuit,
    Unknown(String),
}

/// What the caller should do after feeding in a key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    None,
    /// The view scrolled or content changed enough to warrant a full
    /// redraw rather than just `print_cursor`.
    Redraw,
    Colon(ColonCommand),
}

/// Holds mode state, the pending chord buffer, and the yank register
/// for one editing session. One `Dispatcher` drives one `(FileBuf,
/// View)` pair; diff navigation additionally takes a `DiffEngine` and
/// the opposite side's `FileBuf`.
pub struct Dispatcher {
    mode: Mode,
    trie: MappingTrie,
    ctx: PendingContext,
    pending_chars: Vec<char>,
    colon_buffer: String,
    registers: RegisterFile,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            trie: MappingTrie::build(baseline_normal_specs()),
            ctx: PendingContext::default(),
            pending_chars: Vec::new(),
            colon_buffer: String::new(),
            registers: RegisterFile::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Feeds one key event through the dispatcher, mutating `fb` and
    /// `view` as needed. `screen_rows`/`screen_cols` are the working
    /// terminal size, needed by `View`'s scrolling motions.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        fb: &mut FileBuf,
        view: &mut View,
        screen_rows: u16,
        screen_cols: u16,
    ) -> Outcome {
        match self.mode {
            Mode::Normal => self.handle_normal(key, fb, view, screen_rows, screen_cols),
            Mode::Insert => self.handle_insert(key, fb, view, screen_rows, screen_cols),
            Mode::Colon => self.handle_colon(key),
        }
    }

    /// Advances the diff cursor and re-centres both views on it. Diff
    /// navigation bypasses the chord buffer: it isn't a vi motion, it's
    /// a property of diff mode itself.
    pub fn diff_next(
        &mut self,
        engine: &mut DiffEngine,
        a: &FileBuf,
        b: &FileBuf,
        view_a: &mut View,
        view_b: &mut View,
        screen_rows: u16,
        screen_cols: u16,
    ) -> bool {
        if !engine.next_diff(a, b) {
            return false;
        }
        let row = engine.cursor();
        view_a.place_cursor(row.min(a.num_lines().saturating_sub(1)), 0, screen_rows, screen_cols);
        view_b.place_cursor(row.min(b.num_lines().saturating_sub(1)), 0, screen_rows, screen_cols);
        true
    }

    pub fn diff_prev(
        &mut self,
        engine: &mut DiffEngine,
        a: &FileBuf,
        b: &FileBuf,
        view_a: &mut View,
        view_b: &mut View,
        screen_rows: u16,
        screen_cols: u16,
    ) -> bool {
        if !engine.prev_diff(a, b) {
            return false;
        }
        let row = engine.cursor();
        view_a.place_cursor(row.min(a.num_lines().saturating_sub(1)), 0, screen_rows, screen_cols);
        view_b.place_cursor(row.min(b.num_lines().saturating_sub(1)), 0, screen_rows, screen_cols);
        true
    }

    fn handle_normal(
        &mut self,
        key: KeyEvent,
        fb: &mut FileBuf,
        view: &mut View,
        screen_rows: u16,
        screen_cols: u16,
    ) -> Outcome {
        let KeyToken::Char(byte) = key.token else {
            return self.handle_normal_named(key, fb, view, screen_rows, screen_cols);
        };
        self.pending_chars.push(byte as char);
        let actions = self.drain_chars();
        let mut outcome = Outcome::None;
        for action in actions {
            let this = self.apply_composed(action, fb, view, screen_rows, screen_cols);
            if this != Outcome::None {
                outcome = this;
            }
        }
        outcome
    }

    fn handle_normal_named(
        &mut self,
        key: KeyEvent,
        fb: &mut FileBuf,
        view: &mut View,
        screen_rows: u16,
        screen_cols: u16,
    ) -> Outcome {
        match key.token {
            KeyToken::Named(NamedKey::Left) => view.go_left(screen_rows, screen_cols),
            KeyToken::Named(NamedKey::Right) => view.go_right(fb, screen_rows, screen_cols),
            KeyToken::Named(NamedKey::Up) => view.go_up(fb, screen_rows, screen_cols),
            KeyToken::Named(NamedKey::Down) => view.go_down(fb, screen_rows, screen_cols),
            KeyToken::Named(NamedKey::Home) => view.go_line_start(screen_rows, screen_cols),
            KeyToken::Named(NamedKey::End) => view.go_line_end(fb, screen_rows, screen_cols),
            KeyToken::Named(NamedKey::PageUp) => view.go_page_up(fb, screen_rows, screen_cols),
            KeyToken::Named(NamedKey::PageDown) => view.go_page_down(fb, screen_rows, screen_cols),
            KeyToken::Named(NamedKey::Esc) => {
                view.clear_visual();
                self.ctx.reset_transient();
            }
            _ => {}
        }
        Outcome::Redraw
    }

    /// Runs the accumulated pending chars through the chord trie until
    /// it stalls on `NeedMore`, returning every fully composed action
    /// in order and trimming the consumed prefix from the buffer.
    fn drain_chars(&mut self) -> Vec<ComposedAction> {
        let mut out = Vec::new();
        let mut consumed_total = 0;
        loop {
            let slice = &self.pending_chars[consumed_total..];
            match self.trie.resolve(slice) {
                Resolution::Matched { consumed, output, .. } => {
                    let token = if self.ctx.awaiting_register
                        && let core_keymap::MappingOutput::Literal(c) = output
                        && c.is_ascii_alphanumeric()
                    {
                        core_keymap::MappingOutput::RegisterName(c)
                    } else {
                        output
                    };
                    let action = compose_with_context(&mut self.ctx, &token);
                    if action != ComposedAction::None {
                        out.push(action);
                    }
                    consumed_total += consumed;
                }
                Resolution::FallbackLiteral(c) => {
                    let token = if self.ctx.awaiting_register && c.is_ascii_alphanumeric() {
                        core_keymap::MappingOutput::RegisterName(c)
                    } else {
                        core_keymap::MappingOutput::Literal(c)
                    };
                    let action = compose_with_context(&mut self.ctx, &token);
                    if action != ComposedAction::None {
                        out.push(action);
                    }
                    consumed_total += 1;
                }
                Resolution::NeedMore => break,
            }
            if consumed_total >= self.pending_chars.len() {
                break;
            }
        }
        self.pending_chars.drain(..consumed_total);
        out
    }

    fn apply_composed(
        &mut self,
        action: ComposedAction,
        fb: &mut FileBuf,
        view: &mut View,
        screen_rows: u16,
        screen_cols: u16,
    ) -> Outcome {
        match action {
            ComposedAction::Motion { motion, count } => {
                for _ in 0..count {
                    self.apply_motion(motion, fb, view, screen_rows, screen_cols);
                }
                Outcome::Redraw
            }
            ComposedAction::ApplyOperator { op, motion, count, register } => {
                self.apply_operator_motion(op, motion, count, register, fb, view, screen_rows, screen_cols);
                fb.close_checkpoint();
                Outcome::Redraw
            }
            ComposedAction::LinewiseOperator { op, count, register } => {
                self.apply_linewise_operator(op, count, register, fb, view, screen_rows, screen_cols);
                fb.close_checkpoint();
                Outcome::Redraw
            }
            ComposedAction::PasteAfter { register } => {
                self.paste(register, true, fb, view, screen_rows, screen_cols);
                fb.close_checkpoint();
                Outcome::Redraw
            }
            ComposedAction::PasteBefore { register } => {
                self.paste(register, false, fb, view, screen_rows, screen_cols);
                fb.close_checkpoint();
                Outcome::Redraw
            }
            ComposedAction::EnterInsert => {
                self.mode = Mode::Insert;
                Outcome::Redraw
            }
            ComposedAction::Undo => {
                if let Some(pos) = fb.undo() {
                    view.place_cursor(pos.line, pos.col, screen_rows, screen_cols);
                }
                Outcome::Redraw
            }
            ComposedAction::ModeToggleVisualChar => {
                view.toggle_visual(VisualKind::Character);
                Outcome::Redraw
            }
            ComposedAction::DeleteUnder => {
                self.delete_under(fb, view);
                fb.close_checkpoint();
                Outcome::Redraw
            }
            ComposedAction::DeleteLeft => {
                self.delete_left(fb, view, screen_rows, screen_cols);
                fb.close_checkpoint();
                Outcome::Redraw
            }
            ComposedAction::JoinLines { count } => {
                for _ in 0..count.max(1) {
                    self.join_lines(fb, view, screen_rows, screen_cols);
                }
                fb.close_checkpoint();
                Outcome::Redraw
            }
            ComposedAction::Literal(':') => {
                self.mode = Mode::Colon;
                self.colon_buffer.clear();
                Outcome::Redraw
            }
            ComposedAction::Literal(_) | ComposedAction::None => Outcome::None,
        }
    }

    fn apply_motion(&mut self, motion: char, fb: &FileBuf, view: &mut View, rows: u16, cols: u16) {
        match motion {
            'h' => view.go_left(rows, cols),
            'l' => view.go_right(fb, rows, cols),
            'k' => view.go_up(fb, rows, cols),
            'j' => view.go_down(fb, rows, cols),
            '0' => view.go_line_start(rows, cols),
            '$' => view.go_line_end(fb, rows, cols),
            'w' => view.go_word_forward(fb, rows, cols),
            'b' => view.go_word_backward(fb, rows, cols),
            _ => {}
        }
    }

    /// Deletes from the cursor to wherever `motion` lands, on the
    /// current line only (every baseline motion is single-line). `c`
    /// leaves the dispatcher in insert mode afterward.
    fn apply_operator_motion(
        &mut self,
        op: char,
        motion: char,
        count: u32,
        register: Option<char>,
        fb: &mut FileBuf,
        view: &mut View,
        rows: u16,
        cols: u16,
    ) {
        let line = view.file_line();
        let start = view.file_col();
        let mut probe = View::new(view.tile);
        probe.top_line = view.top_line;
        probe.left_col = view.left_col;
        probe.cursor_row = view.cursor_row;
        probe.cursor_col = view.cursor_col;
        for _ in 0..count {
            self.apply_motion(motion, fb, &mut probe, rows, cols);
        }
        let end = probe.file_col();
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let len = fb.line(line).len();
        if len == 0 {
            if op == 'c' {
                self.mode = Mode::Insert;
            }
            return;
        }
        let last = len - 1;
        let inclusive_end = (if motion == '$' { hi } else { hi.saturating_sub(1).max(lo) }).min(last);
        let bytes: Vec<u8> = (lo..=inclusive_end).map(|c| fb.line(line).get(c)).collect();
        if let Some(reg) = register.or(Some('"')) {
            self.registers.set(reg, Register::Charwise(bytes));
        }
        let cursor = Position::new(line, lo);
        let remove_count = inclusive_end - lo + 1;
        for _ in 0..remove_count {
            fb.remove_char(line, lo, cursor);
        }
        view.place_cursor(line, lo.min(fb.line(line).len().saturating_sub(1)), rows, cols);
        if op == 'c' {
            self.mode = Mode::Insert;
        }
    }

    fn apply_linewise_operator(
        &mut self,
        op: char,
        count: u32,
        register: Option<char>,
        fb: &mut FileBuf,
        view: &mut View,
        rows: u16,
        cols: u16,
    ) {
        let line = view.file_line();
        let n = (count as usize).min(fb.num_lines() - line);
        let cursor = Position::new(line, 0);
        let mut yanked = Vec::with_capacity(n);
        for _ in 0..n {
            if op == 'y' {
                let mut copy = core_text::borrow_line();
                for &b in fb.line(line).as_bytes() {
                    copy.push(b);
                }
                yanked.push(copy);
                continue;
            }
            yanked.push(fb.remove_line(line, cursor));
        }
        if fb.num_lines() == 0 {
            fb.push_line(None, cursor);
        }
        if let Some(reg) = register.or(Some('"')) {
            self.registers.set(reg, Register::Linewise(yanked));
        }
        if op != 'y' {
            let target = line.min(fb.num_lines().saturating_sub(1));
            view.place_cursor(target, 0, rows, cols);
        }
        if op == 'c' {
            fb.insert_line(line, None, cursor);
            view.place_cursor(line, 0, rows, cols);
            self.mode = Mode::Insert;
        }
    }

    fn paste(
        &mut self,
        register: Option<char>,
        after: bool,
        fb: &mut FileBuf,
        view: &mut View,
        rows: u16,
        cols: u16,
    ) {
        let reg = register.unwrap_or('"');
        let Some(content) = self.registers.get(reg).cloned() else { return };
        let line = view.file_line();
        let cursor = Position::new(line, view.file_col());
        match content {
            Register::Linewise(lines) => {
                let mut at = if after { line + 1 } else { line };
                for l in lines {
                    fb.insert_line(at, Some(l), cursor);
                    at += 1;
                }
                view.place_cursor(if after { line + 1 } else { line }, 0, rows, cols);
            }
            Register::Charwise(bytes) => {
                let mut col = view.file_col() + if after { 1 } else { 0 };
                for b in bytes {
                    fb.insert_char(line, col, b, cursor);
                    col += 1;
                }
                view.place_cursor(line, col.saturating_sub(1), rows, cols);
            }
        }
    }

    fn delete_under(&mut self, fb: &mut FileBuf, view: &mut View) {
        let line = view.file_line();
        let col = view.file_col();
        if col < fb.line(line).len() {
            let cursor = Position::new(line, col);
            fb.remove_char(line, col, cursor);
        }
    }

    fn delete_left(&mut self, fb: &mut FileBuf, view: &mut View, rows: u16, cols: u16) {
        let line = view.file_line();
        let col = view.file_col();
        if col > 0 {
            let cursor = Position::new(line, col - 1);
            fb.remove_char(line, col - 1, cursor);
            view.place_cursor(line, col - 1, rows, cols);
        }
    }

    /// Joins the line below the cursor onto the current one, inserting a
    /// single space at the join point unless the current line is empty or
    /// the next line is. Cursor lands on the join point.
    fn join_lines(&mut self, fb: &mut FileBuf, view: &mut View, rows: u16, cols: u16) {
        let line = view.file_line();
        if line + 1 >= fb.num_lines() {
            return;
        }
        let join_col = fb.line(line).len();
        let cursor = Position::new(line, join_col);
        let next = fb.remove_line(line + 1, cursor);
        let needs_space =
            join_col > 0 && !next.is_empty() && fb.line(line).get(join_col - 1) != b' ';
        if needs_space {
            fb.insert_char(line, join_col, b' ', cursor);
        }
        fb.append_line_to_line(line, next, cursor);
        view.place_cursor(line, join_col, rows, cols);
    }

    fn handle_insert(
        &mut self,
        key: KeyEvent,
        fb: &mut FileBuf,
        view: &mut View,
        rows: u16,
        cols: u16,
    ) -> Outcome {
        let line = view.file_line();
        let col = view.file_col();
        let cursor = Position::new(line, col);
        match key.token {
            KeyToken::Named(NamedKey::Esc) => {
                fb.close_checkpoint();
                self.mode = Mode::Normal;
                let new_col = view.file_col().saturating_sub(1);
                view.place_cursor(line, new_col, rows, cols);
            }
            KeyToken::Named(NamedKey::Enter) => {
                let rest = split_line_at(fb, line, col);
                fb.insert_line(line + 1, Some(rest), cursor);
                view.place_cursor(line + 1, 0, rows, cols);
            }
            KeyToken::Named(NamedKey::Backspace) => {
                if col > 0 {
                    fb.remove_char(line, col - 1, cursor);
                    view.place_cursor(line, col - 1, rows, cols);
                } else if line > 0 {
                    let prev_len = fb.line(line - 1).len();
                    let this_line = fb.remove_line(line, cursor);
                    fb.append_line_to_line(line - 1, this_line, cursor);
                    view.place_cursor(line - 1, prev_len, rows, cols);
                }
            }
            KeyToken::Named(NamedKey::Tab) => {
                fb.insert_char(line, col, b'\t', cursor);
                view.place_cursor(line, col + 1, rows, cols);
            }
            KeyToken::Char(byte) => {
                fb.insert_char(line, col, byte, cursor);
                view.place_cursor(line, col + 1, rows, cols);
            }
            _ => {}
        }
        Outcome::Redraw
    }

    fn handle_colon(&mut self, key: KeyEvent) -> Outcome {
        match key.token {
            KeyToken::Named(NamedKey::Esc) => {
                self.mode = Mode::Normal;
                self.colon_buffer.clear();
                Outcome::Redraw
            }
            KeyToken::Named(NamedKey::Enter) => {
                self.mode = Mode::Normal;
                let cmd = parse_colon(&self.colon_buffer);
                self.colon_buffer.clear();
                Outcome::Colon(cmd)
            }
            KeyToken::Named(NamedKey::Backspace) => {
                self.colon_buffer.pop();
                Outcome::Redraw
            }
            KeyToken::Char(byte) => {
                self.colon_buffer.push(byte as char);
                Outcome::Redraw
            }
            _ => Outcome::None,
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn split_line_at(fb: &mut FileBuf, line: usize, col: usize) -> core_text::Line {
    let bytes = fb.line(line).as_bytes().to_vec();
    let (_, tail) = bytes.split_at(col.min(bytes.len()));
    let tail = tail.to_vec();
    for i in (col..bytes.len()).rev() {
        fb.remove_char(line, i, Position::new(line, col));
    }
    core_text::Line::from_bytes(tail)
}

fn parse_colon(input: &str) -> ColonCommand {
    match input.trim() {
        "w" => ColonCommand::Write,
        "q" => ColonCommand::Quit,
        "q!" => ColonCommand::ForceQuit,
        "wq" | "x" => ColonCommand::WriteQuit,
        other => ColonCommand::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::tile::Tile;
    use core_text::Line;

    fn buf(lines: &[&str]) -> FileBuf {
        FileBuf::from_lines(
            std::path::PathBuf::from("test.txt"),
            lines.iter().map(|s| Line::from_slice(s.as_bytes())).collect(),
            true,
        )
    }

    fn key(byte: u8) -> KeyEvent {
        KeyEvent { token: KeyToken::Char(byte), mods: core_events::ModMask::empty() }
    }

    fn named(n: NamedKey) -> KeyEvent {
        KeyEvent { token: KeyToken::Named(n), mods: core_events::ModMask::empty() }
    }

    #[test]
    fn hjkl_moves_cursor() {
        let mut fb = buf(&["hello", "world"]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b'l'), &mut fb, &mut view, 24, 80);
        assert_eq!(view.file_col(), 1);
        d.handle_key(key(b'j'), &mut fb, &mut view, 24, 80);
        assert_eq!(view.file_line(), 1);
    }

    #[test]
    fn j_joins_lines_with_a_space_and_places_cursor_at_join_point() {
        let mut fb = buf(&["foo", "bar"]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b'J'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.num_lines(), 1);
        assert_eq!(fb.line(0).as_bytes(), b"foo bar");
        assert_eq!(view.file_line(), 0);
        assert_eq!(view.file_col(), 3);
    }

    #[test]
    fn x_deletes_char_under_cursor_as_its_own_checkpoint() {
        let mut fb = buf(&["abc"]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b'x'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.line(0).as_bytes(), b"bc");
        d.handle_key(key(b'x'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.line(0).as_bytes(), b"c");
        // two separate checkpoints: undo only reverses the second x.
        fb.undo();
        assert_eq!(fb.line(0).as_bytes(), b"bc");
    }

    #[test]
    fn dw_deletes_word_under_cursor() {
        let mut fb = buf(&["hello world"]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b'd'), &mut fb, &mut view, 24, 80);
        d.handle_key(key(b'w'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.line(0).as_bytes(), b"world");
    }

    #[test]
    fn dd_then_p_roundtrips_the_line() {
        let mut fb = buf(&["one", "two", "three"]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b'd'), &mut fb, &mut view, 24, 80);
        d.handle_key(key(b'd'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.num_lines(), 2);
        assert_eq!(fb.line(0).as_bytes(), b"two");
        d.handle_key(key(b'p'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.num_lines(), 3);
        assert_eq!(fb.line(1).as_bytes(), b"one");
    }

    #[test]
    fn insert_mode_types_then_esc_closes_checkpoint() {
        let mut fb = buf(&[""]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b'i'), &mut fb, &mut view, 24, 80);
        assert_eq!(d.mode(), Mode::Insert);
        d.handle_key(key(b'h'), &mut fb, &mut view, 24, 80);
        d.handle_key(key(b'i'), &mut fb, &mut view, 24, 80);
        d.handle_key(named(NamedKey::Esc), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.line(0).as_bytes(), b"hi");
        assert_eq!(d.mode(), Mode::Normal);
    }

    #[test]
    fn colon_wq_parses_to_write_quit() {
        let mut fb = buf(&["x"]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b':'), &mut fb, &mut view, 24, 80);
        assert_eq!(d.mode(), Mode::Colon);
        d.handle_key(key(b'w'), &mut fb, &mut view, 24, 80);
        d.handle_key(key(b'q'), &mut fb, &mut view, 24, 80);
        let outcome = d.handle_key(named(NamedKey::Enter), &mut fb, &mut view, 24, 80);
        assert_eq!(outcome, Outcome::Colon(ColonCommand::WriteQuit));
    }

    #[test]
    fn undo_restores_deleted_char() {
        let mut fb = buf(&["abc"]);
        let mut view = View::new(Tile::Full);
        let mut d = Dispatcher::new();
        d.handle_key(key(b'x'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.line(0).as_bytes(), b"bc");
        d.handle_key(key(b'u'), &mut fb, &mut view, 24, 80);
        assert_eq!(fb.line(0).as_bytes(), b"abc");
    }
}
