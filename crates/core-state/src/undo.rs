//! `ChangeHist`: the reversible edit journal backing `FileBuf::undo`/`undo_all`
//!
//! A `ChangeHist` is a stack of checkpoints, each an ordered list of
//! low-level `Entry` records. A checkpoint is the unit undo reverses
//! atomically; consecutive edits belonging to one user keystroke coalesce
//! into the same checkpoint via `open`/`append`/`close`.
//!
//! Applying an inverse requires mutating the owning `FileBuf` without
//! re-recording the inverse itself into the journal. Rather than give
//! `ChangeHist` a dependency on `FileBuf` (and vice versa), the journal talks
//! to its owner through the `EditSink` trait; `FileBuf` implements it with
//! raw (non-journaled) mutations.

use core_text::{Line, Position};

/// One reversible low-level edit.
#[derive(Debug, Clone)]
pub enum Entry {
    InsertChar { line: usize, col: usize },
    RemoveChar { line: usize, col: usize, byte: u8 },
    InsertLine { line: usize },
    RemoveLine { line: usize, contents: Line },
    SetChar { line: usize, col: usize, old: u8, new: u8 },
}

/// A group of `Entry` records treated atomically by undo.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    entries: Vec<Entry>,
    /// Cursor position recorded when the checkpoint was opened; undo
    /// restores the cursor here.
    open_cursor: Position,
    open: bool,
}

impl Checkpoint {
    fn new(cursor: Position) -> Self {
        Self {
            entries: Vec::new(),
            open_cursor: cursor,
            open: true,
        }
    }
}

/// Callback surface a `ChangeHist` applies inverses through. Implemented by
/// `FileBuf` using mutations that do not themselves append to the journal.
pub trait EditSink {
    fn raw_insert_char(&mut self, line: usize, col: usize, byte: u8);
    /// Remove and return the byte at `(line, col)`.
    fn raw_remove_char(&mut self, line: usize, col: usize) -> u8;
    fn raw_insert_line(&mut self, line: usize, contents: Line);
    fn raw_remove_line(&mut self, line: usize) -> Line;
    /// Overwrite the byte at `(line, col)` with `new`, returning the byte
    /// that was there.
    fn raw_set_char(&mut self, line: usize, col: usize, new: u8) -> u8;
}

#[derive(Debug, Default)]
pub struct ChangeHist {
    checkpoints: Vec<Checkpoint>,
}

impl ChangeHist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.checkpoints.last().is_some_and(|c| c.open)
    }

    /// Start a new checkpoint. Idempotent while one is already open.
    pub fn open(&mut self, cursor: Position) {
        if self.is_open() {
            return;
        }
        self.checkpoints.push(Checkpoint::new(cursor));
    }

    /// Append an entry to the current checkpoint, implicitly opening one at
    /// `cursor` if none is open.
    pub fn append(&mut self, entry: Entry, cursor: Position) {
        if !self.is_open() {
            self.open(cursor);
        }
        self.checkpoints
            .last_mut()
            .expect("open() guarantees a checkpoint exists")
            .entries
            .push(entry);
    }

    /// Mark the current checkpoint complete. No-op if none is open.
    pub fn close(&mut self) {
        if let Some(c) = self.checkpoints.last_mut() {
            c.open = false;
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.checkpoints.len()
    }

    /// Reverse the most recent closed (or still-open) checkpoint, applying
    /// each entry's inverse to `sink` in reverse order. Returns the cursor
    /// position to restore, or `None` if history is empty.
    pub fn undo(&mut self, sink: &mut impl EditSink) -> Option<Position> {
        self.close();
        let checkpoint = self.checkpoints.pop()?;
        for entry in checkpoint.entries.into_iter().rev() {
            apply_inverse(entry, sink);
        }
        Some(checkpoint.open_cursor)
    }

    /// Reverse every checkpoint, returning the cursor position of the very
    /// first one, or `None` if history was already empty.
    pub fn undo_all(&mut self, sink: &mut impl EditSink) -> Option<Position> {
        let mut last = None;
        while let Some(pos) = self.undo(sink) {
            last = Some(pos);
        }
        last
    }
}

fn apply_inverse(entry: Entry, sink: &mut impl EditSink) {
    match entry {
        Entry::InsertChar { line, col } => {
            sink.raw_remove_char(line, col);
        }
        Entry::RemoveChar { line, col, byte } => {
            sink.raw_insert_char(line, col, byte);
        }
        Entry::InsertLine { line } => {
            sink.raw_remove_line(line);
        }
        Entry::RemoveLine { line, contents } => {
            sink.raw_insert_line(line, contents);
        }
        Entry::SetChar { line, col, old, .. } => {
            sink.raw_set_char(line, col, old);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBuf {
        lines: Vec<Vec<u8>>,
    }
    impl EditSink for FakeBuf {
        fn raw_insert_char(&mut self, line: usize, col: usize, byte: u8) {
            self.lines[line].insert(col, byte);
        }
        fn raw_remove_char(&mut self, line: usize, col: usize) -> u8 {
            self.lines[line].remove(col)
        }
        fn raw_insert_line(&mut self, line: usize, contents: Line) {
            self.lines.insert(line, contents.as_bytes().to_vec());
        }
        fn raw_remove_line(&mut self, line: usize) -> Line {
            Line::from_bytes(self.lines.remove(line))
        }
        fn raw_set_char(&mut self, line: usize, col: usize, new: u8) -> u8 {
            let old = self.lines[line][col];
            self.lines[line][col] = new;
            old
        }
    }

    #[test]
    fn undo_reverses_insert_char() {
        let mut buf = FakeBuf {
            lines: vec![b"ac".to_vec()],
        };
        let mut hist = ChangeHist::new();
        hist.open(Position::new(0, 1));
        buf.raw_insert_char(0, 1, b'b');
        hist.append(Entry::InsertChar { line: 0, col: 1 }, Position::new(0, 1));
        hist.close();
        assert_eq!(buf.lines[0], b"abc");
        let cursor = hist.undo(&mut buf).unwrap();
        assert_eq!(buf.lines[0], b"ac");
        assert_eq!(cursor, Position::new(0, 1));
    }

    #[test]
    fn undo_all_empties_stack() {
        let mut buf = FakeBuf {
            lines: vec![b"".to_vec()],
        };
        let mut hist = ChangeHist::new();
        for i in 0..3 {
            hist.open(Position::origin());
            buf.raw_insert_char(0, i, b'x');
            hist.append(Entry::InsertChar { line: 0, col: i }, Position::origin());
            hist.close();
        }
        assert_eq!(buf.lines[0], b"xxx");
        assert!(hist.undo_all(&mut buf).is_some());
        assert_eq!(buf.lines[0], b"");
        assert_eq!(hist.undo_depth(), 0);
        assert!(hist.undo(&mut buf).is_none());
    }

    #[test]
    fn undo_reverses_remove_line() {
        let mut buf = FakeBuf {
            lines: vec![b"a".to_vec(), b"b".to_vec()],
        };
        let mut hist = ChangeHist::new();
        hist.open(Position::origin());
        let removed = buf.raw_remove_line(1);
        hist.append(
            Entry::RemoveLine {
                line: 1,
                contents: removed,
            },
            Position::origin(),
        );
        hist.close();
        assert_eq!(buf.lines.len(), 1);
        hist.undo(&mut buf).unwrap();
        assert_eq!(buf.lines.len(), 2);
        assert_eq!(buf.lines[1], b"b");
    }
}
