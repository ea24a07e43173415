//! `FileBuf`: the buffer engine. Owns line/style storage, the undo journal,
//! and per-file metadata; runs the syntax highlighter and the star-search
//! scanner on `update()`.
//!
//! Views never hold a pointer into a `FileBuf`; they register a `ViewId`
//! and the owning session (outside this crate) polls `FileBuf::views()`
//! after `update()` to know which views need a redraw. This keeps
//! `core-state` free of any dependency on `core-model`.

pub mod highlight;
pub mod undo;

use core_text::{Line, Position, StyleClass, StyleLine};
use highlight::{CodeHighlighter, Highlighter, LanguageProfile, PlainHighlighter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use undo::{ChangeHist, EditSink, Entry};

#[derive(Debug, Error)]
pub enum FileBufError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad pattern: {0}")]
    BadPattern(String),
}

/// Identifies a registered view without `core-state` knowing anything about
/// views themselves.
pub type ViewId = usize;

/// File-type tag driving highlighter selection. Only the dispatch
/// mechanism is covered here, not exhaustive per-language keyword tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    C,
    Cpp,
    Go,
    Java,
    Unknown,
}

impl FileType {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("c") | Some("h") => FileType::C,
            Some("cc") | Some("cpp") | Some("cxx") | Some("hh") | Some("hpp") => FileType::Cpp,
            Some("go") => FileType::Go,
            Some("java") => FileType::Java,
            _ => FileType::Unknown,
        }
    }

    fn make_highlighter(self) -> Box<dyn Highlighter> {
        match self {
            FileType::C | FileType::Cpp | FileType::Java => {
                Box::new(CodeHighlighter::new(LanguageProfile::c_family()))
            }
            FileType::Go => Box::new(CodeHighlighter::new(LanguageProfile::go())),
            FileType::Unknown => Box::new(PlainHighlighter),
        }
    }
}

/// One entry in a directory buffer listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub size: u64,
}

pub struct FileBuf {
    lines: Vec<Line>,
    styles: Vec<StyleLine>,
    hist: ChangeHist,
    file_path: Option<PathBuf>,
    is_directory: bool,
    dir_entries: Vec<DirEntry>,
    file_type: FileType,
    trailing_newline: bool,
    mtime: Option<SystemTime>,
    highlighter: Box<dyn Highlighter>,
    hi_touched_line: usize,
    views: Vec<ViewId>,
    save_history: bool,
    changed: bool,
    need_to_find_stars: bool,
    star_pattern: Vec<u8>,
    star_case_insensitive: bool,
}

impl FileBuf {
    /// Build an empty, untitled buffer (one empty line, no trailing
    /// newline, `Unknown` file type).
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new()],
            styles: vec![StyleLine::new()],
            hist: ChangeHist::new(),
            file_path: None,
            is_directory: false,
            dir_entries: Vec::new(),
            file_type: FileType::Unknown,
            trailing_newline: false,
            mtime: None,
            highlighter: FileType::Unknown.make_highlighter(),
            hi_touched_line: 0,
            views: Vec::new(),
            save_history: true,
            changed: false,
            need_to_find_stars: false,
            star_pattern: Vec::new(),
            star_case_insensitive: false,
        }
    }

    /// Build a buffer from already-read file content. Reading the file
    /// itself is the caller's concern; this crate never touches the filesystem.
    pub fn from_lines(path: PathBuf, lines: Vec<Line>, trailing_newline: bool) -> Self {
        let file_type = FileType::from_path(&path);
        let lines = if lines.is_empty() { vec![Line::new()] } else { lines };
        let styles = lines.iter().map(|l| StyleLine::blank(l.len())).collect();
        Self {
            lines,
            styles,
            hist: ChangeHist::new(),
            file_path: Some(path),
            is_directory: false,
            dir_entries: Vec::new(),
            file_type,
            trailing_newline,
            mtime: None,
            highlighter: file_type.make_highlighter(),
            hi_touched_line: 0,
            views: Vec::new(),
            save_history: true,
            changed: false,
            need_to_find_stars: false,
            star_pattern: Vec::new(),
            star_case_insensitive: false,
        }
    }

    /// Build a directory buffer from a caller-supplied listing.
    /// `core-state` never calls `read_dir` itself.
    pub fn from_dir_listing(path: PathBuf, mut entries: Vec<DirEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let lines: Vec<Line> = entries
            .iter()
            .map(|e| Line::from_slice(e.name.as_bytes()))
            .collect();
        let lines = if lines.is_empty() { vec![Line::new()] } else { lines };
        let styles = lines.iter().map(|l| StyleLine::blank(l.len())).collect();
        Self {
            lines,
            styles,
            hist: ChangeHist::new(),
            file_path: Some(path),
            is_directory: true,
            dir_entries: entries,
            file_type: FileType::Unknown,
            trailing_newline: false,
            mtime: None,
            highlighter: Box::new(PlainHighlighter),
            hi_touched_line: 0,
            views: Vec::new(),
            save_history: true,
            changed: false,
            need_to_find_stars: false,
            star_pattern: Vec::new(),
            star_case_insensitive: false,
        }
    }

    pub fn set_mtime(&mut self, mtime: SystemTime) {
        self.mtime = Some(mtime);
    }
    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
    pub fn dir_entries(&self) -> &[DirEntry] {
        &self.dir_entries
    }
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }
    pub fn line(&self, l: usize) -> &Line {
        &self.lines[l]
    }
    pub fn style(&self, l: usize) -> &StyleLine {
        &self.styles[l]
    }

    pub fn register_view(&mut self, id: ViewId) {
        if !self.views.contains(&id) {
            self.views.push(id);
        }
    }
    pub fn unregister_view(&mut self, id: ViewId) {
        self.views.retain(|v| *v != id);
    }
    pub fn views(&self) -> &[ViewId] {
        &self.views
    }

    fn touch_highlight(&mut self, line: usize) {
        self.hi_touched_line = self.hi_touched_line.min(line);
        self.styles[line].clear_stars();
        self.need_to_find_stars = true;
    }

    // ---------------- journaled public operations ----------------

    pub fn insert_char(&mut self, l: usize, c: usize, byte: u8, cursor: Position) {
        self.raw_insert_char(l, c, byte);
        if self.save_history {
            self.hist.append(Entry::InsertChar { line: l, col: c }, cursor);
        }
    }

    pub fn remove_char(&mut self, l: usize, c: usize, cursor: Position) -> u8 {
        let byte = self.raw_remove_char(l, c);
        if self.save_history {
            self.hist
                .append(Entry::RemoveChar { line: l, col: c, byte }, cursor);
        }
        byte
    }

    /// `continue_last_update=true` coalesces into the currently open
    /// checkpoint; otherwise a new checkpoint is started.
    pub fn set(
        &mut self,
        l: usize,
        c: usize,
        byte: u8,
        continue_last_update: bool,
        cursor: Position,
    ) -> u8 {
        let old = self.raw_set_char(l, c, byte);
        if self.save_history {
            if !continue_last_update {
                self.hist.close();
            }
            self.hist
                .append(Entry::SetChar { line: l, col: c, old, new: byte }, cursor);
        }
        old
    }

    pub fn insert_line(&mut self, l: usize, line: Option<Line>, cursor: Position) {
        let line = line.unwrap_or_default();
        self.raw_insert_line(l, line);
        if self.save_history {
            self.hist.append(Entry::InsertLine { line: l }, cursor);
        }
    }

    pub fn remove_line(&mut self, l: usize, cursor: Position) -> Line {
        let removed = self.raw_remove_line(l);
        if self.save_history {
            self.hist.append(
                Entry::RemoveLine { line: l, contents: removed.clone() },
                cursor,
            );
        }
        removed
    }

    pub fn append_line_to_line(&mut self, l: usize, other: Line, cursor: Position) {
        let start_col = self.lines[l].len();
        for (i, &byte) in other.as_bytes().iter().enumerate() {
            self.raw_insert_char(l, start_col + i, byte);
            if self.save_history {
                self.hist
                    .append(Entry::InsertChar { line: l, col: start_col + i }, cursor);
            }
        }
    }

    pub fn push_line(&mut self, line: Option<Line>, cursor: Position) {
        let at = self.lines.len();
        self.insert_line(at, line, cursor);
    }

    pub fn push_char(&mut self, byte: u8, cursor: Position) {
        let l = self.lines.len() - 1;
        let c = self.lines[l].len();
        self.insert_char(l, c, byte, cursor);
    }

    pub fn pop_line(&mut self, cursor: Position) -> Option<Line> {
        if self.lines.len() <= 1 {
            return None;
        }
        Some(self.remove_line(self.lines.len() - 1, cursor))
    }

    pub fn pop_char(&mut self, cursor: Position) -> Option<u8> {
        let l = self.lines.len() - 1;
        if self.lines[l].is_empty() {
            return None;
        }
        let c = self.lines[l].len() - 1;
        Some(self.remove_char(l, c, cursor))
    }

    /// Runs the highlighter over the stale region and the star scanner if
    /// due. Does not itself redraw views; the caller polls `views()` after
    /// calling this.
    pub fn update(&mut self) {
        self.highlighter.run(&self.lines, &mut self.styles, self.hi_touched_line);
        self.hi_touched_line = self.lines.len();

        if self.need_to_find_stars {
            self.scan_stars();
            self.need_to_find_stars = false;
        }
    }

    /// Sets the star-search pattern used by `scan_stars` on the next
    /// `update()`. Rejects an empty pattern (nothing to match against)
    /// and leaves any previously marked stars cleared rather than stale.
    pub fn set_search_pattern(&mut self, pattern: Vec<u8>, case_insensitive: bool) -> Result<(), FileBufError> {
        if pattern.is_empty() {
            self.star_pattern.clear();
            self.need_to_find_stars = false;
            for style in self.styles.iter_mut() {
                style.clear_stars();
            }
            return Err(FileBufError::BadPattern("empty pattern".to_string()));
        }
        self.star_pattern = pattern;
        self.star_case_insensitive = case_insensitive;
        self.need_to_find_stars = true;
        Ok(())
    }

    fn scan_stars(&mut self) {
        if self.star_pattern.is_empty() {
            return;
        }
        for (line, style) in self.lines.iter().zip(self.styles.iter_mut()) {
            mark_stars(line, style, &self.star_pattern, self.star_case_insensitive);
        }
    }

    /// Closes the currently open undo checkpoint, if any, so the next
    /// mutation starts a fresh one. Normal-mode operations that call
    /// `insert_char`/`remove_char`/`insert_line`/`remove_line` directly
    /// (as opposed to `set`, which takes a `continue_last_update` flag)
    /// coalesce into one checkpoint until this is called; callers should
    /// invoke it after each atomic keystroke and when leaving insert mode.
    pub fn close_checkpoint(&mut self) {
        self.hist.close();
    }

    /// Reverses the most recent checkpoint. Returns the cursor position to
    /// restore, or `None` if history is empty.
    pub fn undo(&mut self) -> Option<Position> {
        let mut hist = std::mem::take(&mut self.hist);
        let result = hist.undo(self);
        self.hist = hist;
        result
    }

    pub fn undo_all(&mut self) -> Option<Position> {
        let mut hist = std::mem::take(&mut self.hist);
        let result = hist.undo_all(self);
        self.hist = hist;
        result
    }

    pub fn has_lf_at_eof(&self) -> bool {
        self.trailing_newline
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// `(line_count, total_bytes_including_newlines)`.
    pub fn get_size(&self) -> (usize, usize) {
        let total: usize = self.lines.iter().map(|l| l.len() + 1).sum();
        (self.lines.len(), total)
    }

    pub fn get_cursor_byte(&self, l: usize, c: usize) -> usize {
        let mut total = 0;
        for line in &self.lines[..l] {
            total += line.len() + 1;
        }
        total + c
    }
}

impl Default for FileBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSink for FileBuf {
    fn raw_insert_char(&mut self, line: usize, col: usize, byte: u8) {
        self.lines[line].insert(col, byte);
        self.styles[line].insert(col, Default::default());
        self.touch_highlight(line);
        self.changed = true;
    }

    fn raw_remove_char(&mut self, line: usize, col: usize) -> u8 {
        self.styles[line].remove(col);
        self.touch_highlight(line);
        self.changed = true;
        self.lines[line].remove(col)
    }

    fn raw_insert_line(&mut self, line: usize, contents: Line) {
        let len = contents.len();
        self.lines.insert(line, contents);
        self.styles.insert(line, StyleLine::blank(len));
        self.touch_highlight(line);
        self.changed = true;
    }

    fn raw_remove_line(&mut self, line: usize) -> Line {
        self.styles.remove(line);
        self.changed = true;
        let removed = self.lines.remove(line);
        let touch_at = line.min(self.lines.len().saturating_sub(1));
        self.touch_highlight(touch_at);
        removed
    }

    fn raw_set_char(&mut self, line: usize, col: usize, new: u8) -> u8 {
        let old = self.lines[line].get(col);
        self.lines[line].set(col, new);
        self.touch_highlight(line);
        self.changed = true;
        old
    }
}

fn mark_stars(line: &Line, style: &mut StyleLine, pattern: &[u8], case_insensitive: bool) {
    let bytes = line.as_bytes();
    if pattern.is_empty() || bytes.len() < pattern.len() {
        return;
    }
    let eq = |a: u8, b: u8| {
        if case_insensitive {
            a.to_ascii_lowercase() == b.to_ascii_lowercase()
        } else {
            a == b
        }
    };
    for start in 0..=(bytes.len() - pattern.len()) {
        if bytes[start..start + pattern.len()]
            .iter()
            .zip(pattern.iter())
            .all(|(&a, &b)| eq(a, b))
        {
            for i in start..start + pattern.len() {
                style.set_star(i, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fb_with(lines: &[&str]) -> FileBuf {
        let lines: Vec<Line> = lines.iter().map(|s| Line::from_slice(s.as_bytes())).collect();
        FileBuf::from_lines(PathBuf::from("test.c"), lines, true)
    }

    #[test]
    fn insert_then_remove_char_journals_and_reverses() {
        let mut fb = fb_with(&["ac"]);
        fb.insert_char(0, 1, b'b', Position::new(0, 1));
        fb.hist.close();
        assert_eq!(fb.line(0).as_bytes(), b"abc");
        let cursor = fb.undo().unwrap();
        assert_eq!(fb.line(0).as_bytes(), b"ac");
        assert_eq!(cursor, Position::new(0, 1));
    }

    #[test]
    fn set_continue_last_update_coalesces() {
        let mut fb = fb_with(&["abc"]);
        fb.set(0, 0, b'x', false, Position::origin());
        fb.set(0, 1, b'y', true, Position::origin());
        fb.hist.close();
        assert_eq!(fb.line(0).as_bytes(), b"xyc");
        // one checkpoint reverses both SetChar entries
        fb.undo();
        assert_eq!(fb.line(0).as_bytes(), b"abc");
    }

    #[test]
    fn remove_line_then_undo_restores_p1_length_parity() {
        let mut fb = fb_with(&["one", "two", "three"]);
        fb.remove_line(1, Position::origin());
        fb.hist.close();
        assert_eq!(fb.num_lines(), 2);
        fb.undo();
        assert_eq!(fb.num_lines(), 3);
        assert_eq!(fb.line(1).as_bytes(), b"two");
        assert_eq!(fb.styles.len(), fb.lines.len());
    }

    #[test]
    fn undo_all_returns_to_origin() {
        let mut fb = fb_with(&["a"]);
        for i in 0..3u8 {
            fb.push_char(b'x' + i, Position::origin());
            fb.hist.close();
        }
        assert_eq!(fb.line(0).len(), 4);
        fb.undo_all();
        assert_eq!(fb.line(0).as_bytes(), b"a");
    }

    #[test]
    fn update_runs_highlighter_and_advances_touched_line() {
        let mut fb = fb_with(&["int x;"]);
        fb.update();
        assert_eq!(fb.style(0).get(0).class, StyleClass::VarType);
        assert_eq!(fb.hi_touched_line, 1);
    }

    #[test]
    fn edit_clamps_hi_touched_line_back() {
        let mut fb = fb_with(&["int x;", "int y;"]);
        fb.update();
        assert_eq!(fb.hi_touched_line, 2);
        fb.set(0, 0, b'I', false, Position::origin());
        assert_eq!(fb.hi_touched_line, 0);
    }

    #[test]
    fn star_scan_marks_matches_and_editing_clears_them() {
        let mut fb = fb_with(&["foo bar foo"]);
        fb.set_search_pattern(b"foo".to_vec(), false).unwrap();
        fb.update();
        assert!(fb.style(0).get(0).star);
        assert!(fb.style(0).get(8).star);
        assert!(!fb.style(0).get(4).star);

        fb.set(0, 0, b'F', false, Position::origin());
        assert!(!fb.style(0).get(0).star);
    }

    #[test]
    fn empty_search_pattern_is_rejected_and_clears_stars() {
        let mut fb = fb_with(&["foo bar foo"]);
        fb.set_search_pattern(b"foo".to_vec(), false).unwrap();
        fb.update();
        assert!(fb.style(0).get(0).star);

        let err = fb.set_search_pattern(Vec::new(), false).unwrap_err();
        assert!(matches!(err, FileBufError::BadPattern(_)));
        assert!(!fb.style(0).get(0).star);
    }

    #[test]
    fn directory_listing_sorted_by_name() {
        let entries = vec![
            DirEntry { name: "zeta".into(), size: 1 },
            DirEntry { name: "alpha".into(), size: 2 },
        ];
        let fb = FileBuf::from_dir_listing(PathBuf::from("/tmp"), entries);
        assert!(fb.is_directory());
        assert_eq!(fb.line(0).as_bytes(), b"alpha");
        assert_eq!(fb.line(1).as_bytes(), b"zeta");
    }

    #[test]
    fn file_type_dispatch_from_extension() {
        assert_eq!(FileType::from_path(Path::new("a.c")), FileType::C);
        assert_eq!(FileType::from_path(Path::new("a.cpp")), FileType::Cpp);
        assert_eq!(FileType::from_path(Path::new("a.go")), FileType::Go);
        assert_eq!(FileType::from_path(Path::new("a.xyz")), FileType::Unknown);
    }
}
