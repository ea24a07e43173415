//! Shared C-family scanner: one state machine parameterized by a
//! `LanguageProfile`, grounded on the shared structure of
//! `Highlight_Code.cc`/`Highlight_CPP.cc` (the real implementation factors
//! comment/string/define/number handling once and varies only the keyword
//! table and a couple of lexical flags per language).

use super::{HiState, Highlighter, NumberState};
use core_text::{Line, StyleByte, StyleClass, StyleLine};

/// Per-language knobs for the shared scanner.
pub struct LanguageProfile {
    /// e.g. `"//"`. Empty string disables line comments.
    pub line_comment: &'static str,
    /// e.g. `("/*", "*/")`.
    pub block_comment: Option<(&'static str, &'static str)>,
    /// Whether a line beginning with `#` enters `InDefine` (preprocessor).
    pub has_define: bool,
    /// Whether back-quoted strings are recognized (e.g. shell-style).
    pub back_quote_strings: bool,
    /// identifier -> style class, e.g. `("if", StyleClass::Control)`.
    pub keywords: &'static [(&'static str, StyleClass)],
}

impl LanguageProfile {
    pub fn c_family() -> Self {
        LanguageProfile {
            line_comment: "//",
            block_comment: Some(("/*", "*/")),
            has_define: true,
            back_quote_strings: false,
            keywords: C_FAMILY_KEYWORDS,
        }
    }

    pub fn go() -> Self {
        LanguageProfile {
            line_comment: "//",
            block_comment: Some(("/*", "*/")),
            has_define: false,
            back_quote_strings: true,
            keywords: GO_KEYWORDS,
        }
    }
}

const C_FAMILY_KEYWORDS: &[(&str, StyleClass)] = &[
    ("if", StyleClass::Control),
    ("else", StyleClass::Control),
    ("for", StyleClass::Control),
    ("while", StyleClass::Control),
    ("do", StyleClass::Control),
    ("switch", StyleClass::Control),
    ("case", StyleClass::Control),
    ("break", StyleClass::Control),
    ("continue", StyleClass::Control),
    ("return", StyleClass::Control),
    ("goto", StyleClass::Control),
    ("int", StyleClass::VarType),
    ("char", StyleClass::VarType),
    ("long", StyleClass::VarType),
    ("short", StyleClass::VarType),
    ("unsigned", StyleClass::VarType),
    ("signed", StyleClass::VarType),
    ("float", StyleClass::VarType),
    ("double", StyleClass::VarType),
    ("void", StyleClass::VarType),
    ("struct", StyleClass::VarType),
    ("union", StyleClass::VarType),
    ("enum", StyleClass::VarType),
    ("class", StyleClass::VarType),
    ("bool", StyleClass::VarType),
    ("static", StyleClass::VarType),
    ("const", StyleClass::VarType),
    ("NULL", StyleClass::Const),
    ("true", StyleClass::Const),
    ("false", StyleClass::Const),
];

const GO_KEYWORDS: &[(&str, StyleClass)] = &[
    ("if", StyleClass::Control),
    ("else", StyleClass::Control),
    ("for", StyleClass::Control),
    ("switch", StyleClass::Control),
    ("case", StyleClass::Control),
    ("break", StyleClass::Control),
    ("continue", StyleClass::Control),
    ("return", StyleClass::Control),
    ("go", StyleClass::Control),
    ("defer", StyleClass::Control),
    ("int", StyleClass::VarType),
    ("string", StyleClass::VarType),
    ("bool", StyleClass::VarType),
    ("func", StyleClass::VarType),
    ("struct", StyleClass::VarType),
    ("interface", StyleClass::VarType),
    ("var", StyleClass::VarType),
    ("const", StyleClass::VarType),
    ("true", StyleClass::Const),
    ("false", StyleClass::Const),
    ("nil", StyleClass::Const),
];

pub struct CodeHighlighter {
    profile: LanguageProfile,
    /// State each line began in, as of the last `run`. Index `i` holds the
    /// state line `i` started in; a `None` entry is a safe re-entry anchor.
    line_start_states: Vec<HiState>,
}

impl CodeHighlighter {
    pub fn new(profile: LanguageProfile) -> Self {
        Self {
            profile,
            line_start_states: Vec::new(),
        }
    }

    fn anchor_line(&self, from_line: usize) -> usize {
        let mut l = from_line.min(self.line_start_states.len().saturating_sub(1).max(0));
        while l > 0 {
            if matches!(self.line_start_states.get(l), Some(HiState::None) | None) {
                break;
            }
            l -= 1;
        }
        l
    }
}

impl Highlighter for CodeHighlighter {
    fn run(&mut self, lines: &[Line], styles: &mut [StyleLine], from_line: usize) {
        if lines.is_empty() {
            self.line_start_states.clear();
            return;
        }
        self.line_start_states.resize(lines.len(), HiState::None);

        let anchor = if from_line >= lines.len() {
            lines.len().saturating_sub(1)
        } else {
            self.anchor_line(from_line)
        };

        let mut state = self.line_start_states[anchor];
        for (i, line) in lines.iter().enumerate().skip(anchor) {
            self.line_start_states[i] = state;
            styles[i].resize(line.len());
            state = highlight_line(&self.profile, state, line, &mut styles[i]);
            classify_keywords(&self.profile, line, &mut styles[i]);
        }
    }
}

fn highlight_line(
    profile: &LanguageProfile,
    mut state: HiState,
    line: &Line,
    style: &mut StyleLine,
) -> HiState {
    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut p = 0usize;

    while p < len {
        match state {
            HiState::None => {
                if !profile.line_comment.is_empty() && starts_with(bytes, p, profile.line_comment)
                {
                    state = HiState::InLineComment;
                    continue;
                }
                if let Some((open, _)) = profile.block_comment
                    && starts_with(bytes, p, open)
                {
                    state = HiState::InBlockComment;
                    continue;
                }
                if profile.has_define && p == 0 && bytes[p] == b'#' {
                    state = HiState::InDefine;
                    continue;
                }
                match bytes[p] {
                    b'\'' => {
                        state = HiState::InSingleQuote { escaped: false };
                        style.set(p, StyleByte::new(StyleClass::Const));
                        p += 1;
                    }
                    b'"' => {
                        state = HiState::InDoubleQuote { escaped: false };
                        style.set(p, StyleByte::new(StyleClass::Const));
                        p += 1;
                    }
                    b'`' if profile.back_quote_strings => {
                        state = HiState::InBackQuote { escaped: false };
                        style.set(p, StyleByte::new(StyleClass::Const));
                        p += 1;
                    }
                    b @ b'0'..=b'9' if p == 0 || !is_ident_byte(bytes[p - 1]) => {
                        let ns = if b == b'0'
                            && p + 1 < len
                            && (bytes[p + 1] == b'x' || bytes[p + 1] == b'X')
                        {
                            NumberState::Hex
                        } else {
                            NumberState::Int
                        };
                        state = HiState::InNumber(ns);
                        style.set(p, StyleByte::new(StyleClass::Const));
                        p += 1;
                    }
                    b'~' | b'=' | b'^' | b':' | b'%' | b'+' | b'-' | b'<' | b'>' | b'!'
                    | b'?' | b'(' | b')' | b'{' | b'}' | b',' | b';' | b'/' | b'|' | b'&'
                    | b'.' | b'*' | b'[' | b']' => {
                        style.set(p, StyleByte::new(StyleClass::Control));
                        p += 1;
                    }
                    b if b < 32 || b > 126 => {
                        style.set(p, StyleByte::new(StyleClass::NonAscii));
                        p += 1;
                    }
                    _ => {
                        style.set(p, StyleByte::new(StyleClass::Normal));
                        p += 1;
                    }
                }
            }
            HiState::InLineComment => {
                style.set(p, StyleByte::new(StyleClass::Comment));
                p += 1;
            }
            HiState::InBlockComment => {
                style.set(p, StyleByte::new(StyleClass::Comment));
                if let Some((_, close)) = profile.block_comment
                    && starts_with(bytes, p, close)
                {
                    for i in 0..close.len().min(len - p) {
                        style.set(p + i, StyleByte::new(StyleClass::Comment));
                    }
                    p += close.len();
                    state = HiState::None;
                    continue;
                }
                p += 1;
            }
            HiState::InSingleQuote { escaped } => {
                style.set(p, StyleByte::new(StyleClass::Const));
                let b = bytes[p];
                if escaped {
                    state = HiState::InSingleQuote { escaped: false };
                } else if b == b'\\' {
                    state = HiState::InSingleQuote { escaped: true };
                } else if b == b'\'' {
                    state = HiState::None;
                }
                p += 1;
            }
            HiState::InDoubleQuote { escaped } => {
                style.set(p, StyleByte::new(StyleClass::Const));
                let b = bytes[p];
                if escaped {
                    state = HiState::InDoubleQuote { escaped: false };
                } else if b == b'\\' {
                    state = HiState::InDoubleQuote { escaped: true };
                } else if b == b'"' {
                    state = HiState::None;
                }
                p += 1;
            }
            HiState::InBackQuote { escaped } => {
                style.set(p, StyleByte::new(StyleClass::Const));
                let b = bytes[p];
                if escaped {
                    state = HiState::InBackQuote { escaped: false };
                } else if b == b'\\' {
                    state = HiState::InBackQuote { escaped: true };
                } else if b == b'`' {
                    state = HiState::None;
                }
                p += 1;
            }
            HiState::InDefine => {
                style.set(p, StyleByte::new(StyleClass::Define));
                p += 1;
            }
            HiState::InNumber(ns) => {
                let b = bytes[p];
                match ns {
                    NumberState::Hex if b.is_ascii_hexdigit() || b == b'x' || b == b'X' => {
                        style.set(p, StyleByte::new(StyleClass::Const));
                        p += 1;
                    }
                    NumberState::Int | NumberState::Hex if b == b'.' => {
                        style.set(p, StyleByte::new(StyleClass::Const));
                        state = HiState::InNumber(NumberState::Fraction);
                        p += 1;
                    }
                    NumberState::Int | NumberState::Fraction if b == b'e' || b == b'E' => {
                        style.set(p, StyleByte::new(StyleClass::Const));
                        state = HiState::InNumber(NumberState::Exponent);
                        p += 1;
                    }
                    _ if b.is_ascii_digit() => {
                        style.set(p, StyleByte::new(StyleClass::Const));
                        p += 1;
                    }
                    _ if b.is_ascii_alphabetic() => {
                        style.set(p, StyleByte::new(StyleClass::Const));
                        state = HiState::InNumber(NumberState::TypeSuffix);
                        p += 1;
                    }
                    _ => {
                        state = HiState::None;
                    }
                }
            }
        }
    }

    match state {
        HiState::InLineComment | HiState::InNumber(_) => HiState::None,
        HiState::InDefine if !ends_with_continuation(bytes) => HiState::None,
        HiState::InSingleQuote { .. } | HiState::InDoubleQuote { .. } | HiState::InBackQuote { .. }
            if !ends_with_continuation(bytes) =>
        {
            HiState::None
        }
        other => other,
    }
}

fn classify_keywords(profile: &LanguageProfile, line: &Line, style: &mut StyleLine) {
    let bytes = line.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if is_ident_start(bytes[i]) && style.get(i).class == StyleClass::Normal {
            let start = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            if let Ok(word) = std::str::from_utf8(&bytes[start..i])
                && let Some((_, class)) = profile.keywords.iter().find(|(k, _)| *k == word)
            {
                for j in start..i {
                    style.set_class(j, *class);
                }
            }
        } else {
            i += 1;
        }
    }
}

fn starts_with(bytes: &[u8], at: usize, prefix: &str) -> bool {
    bytes[at..].starts_with(prefix.as_bytes())
}

fn ends_with_continuation(bytes: &[u8]) -> bool {
    bytes.last() == Some(&b'\\')
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_once(profile: LanguageProfile, src: &[&str]) -> Vec<StyleLine> {
        let lines: Vec<Line> = src.iter().map(|s| Line::from_slice(s.as_bytes())).collect();
        let mut styles: Vec<StyleLine> = lines.iter().map(|l| StyleLine::blank(l.len())).collect();
        let mut hi = CodeHighlighter::new(profile);
        hi.run(&lines, &mut styles, 0);
        styles
    }

    #[test]
    fn line_comment_styles_rest_of_line() {
        let styles = run_once(LanguageProfile::c_family(), &["int x; // trailing"]);
        let s = &styles[0];
        assert_eq!(s.get(0).class, StyleClass::VarType); // "int"
        let comment_start = "int x; ".len();
        assert_eq!(s.get(comment_start).class, StyleClass::Comment);
    }

    #[test]
    fn block_comment_spans_lines() {
        let styles = run_once(LanguageProfile::c_family(), &["/* start", "middle */ int y;"]);
        assert_eq!(styles[0].get(0).class, StyleClass::Comment);
        assert_eq!(styles[1].get(0).class, StyleClass::Comment);
        let after = "middle */ ".len();
        assert_eq!(styles[1].get(after).class, StyleClass::VarType);
    }

    #[test]
    fn keyword_reclassified_only_when_normal() {
        let styles = run_once(LanguageProfile::c_family(), &["return 0;"]);
        assert_eq!(styles[0].get(0).class, StyleClass::Control);
    }

    #[test]
    fn double_quoted_string_is_const() {
        let styles = run_once(LanguageProfile::c_family(), &["char *s = \"hi\";"]);
        let quote_at = "char *s = ".len();
        assert_eq!(styles[0].get(quote_at).class, StyleClass::Const);
    }
}
