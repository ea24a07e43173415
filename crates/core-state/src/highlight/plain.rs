use super::Highlighter;
use core_text::{Line, StyleLine};

/// No-op highlighter for `FileType::Unknown` and directory buffers. Styles
/// stay whatever a `StyleLine::blank` leaves them: all `Normal`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn run(&mut self, _lines: &[Line], _styles: &mut [StyleLine], _from_line: usize) {}
}
