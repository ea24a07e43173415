//! Colour-scheme mapping: `core_text::StyleClass` → a concrete
//! `(foreground, background, bold)` terminal attribute triple.
//!
//! Two schemes are kept so a diff's longer-background side can be tinted
//! without the compositor itself knowing anything about diffing: the active
//! scheme and a swappable "b-side" scheme differing only in background.

use core_text::StyleClass;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attrs {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Attrs {
    const fn new(fg: Color, bg: Color, bold: bool) -> Self {
        Self { fg, bg, bold }
    }
}

/// A full table, one entry per `StyleClass` variant, plus a distinct
/// `star` overlay applied on top when a byte's star bit is set.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    bg_base: Color,
    star_fg: Color,
}

impl ColorScheme {
    pub const DEFAULT: ColorScheme = ColorScheme {
        bg_base: Color::Black,
        star_fg: Color::Yellow,
    };

    /// The b-side (longer file in a diff pair) gets a slightly lighter
    /// background so the two panes are visually distinguishable even when
    /// both are entirely `Same`.
    pub const DIFF_B_SIDE: ColorScheme = ColorScheme {
        bg_base: Color::DarkGrey,
        star_fg: Color::Yellow,
    };

    pub fn attrs(&self, class: StyleClass, star: bool) -> Attrs {
        if star {
            return Attrs::new(self.star_fg, self.bg_base, true);
        }
        match class {
            StyleClass::Normal => Attrs::new(Color::White, self.bg_base, false),
            StyleClass::Comment => Attrs::new(Color::DarkGrey, self.bg_base, false),
            StyleClass::Define => Attrs::new(Color::Magenta, self.bg_base, false),
            StyleClass::Const => Attrs::new(Color::Cyan, self.bg_base, false),
            StyleClass::Control => Attrs::new(Color::Blue, self.bg_base, true),
            StyleClass::VarType => Attrs::new(Color::Green, self.bg_base, false),
            StyleClass::NonAscii => Attrs::new(Color::Red, self.bg_base, false),
            StyleClass::Visual => Attrs::new(Color::Black, Color::White, false),
            StyleClass::DiffSame => Attrs::new(Color::White, self.bg_base, false),
            StyleClass::DiffChanged => Attrs::new(Color::Yellow, self.bg_base, true),
            StyleClass::DiffInserted => Attrs::new(Color::Green, self.bg_base, true),
            StyleClass::DiffDeleted => Attrs::new(Color::Red, self.bg_base, true),
            StyleClass::Empty => Attrs::new(Color::DarkBlue, self.bg_base, false),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_overrides_class_colour() {
        let scheme = ColorScheme::DEFAULT;
        let a = scheme.attrs(StyleClass::Comment, true);
        assert_eq!(a.fg, Color::Yellow);
        assert!(a.bold);
    }

    #[test]
    fn diff_b_side_has_distinct_background() {
        let a = ColorScheme::DEFAULT.attrs(StyleClass::Normal, false);
        let b = ColorScheme::DIFF_B_SIDE.attrs(StyleClass::Normal, false);
        assert_ne!(a.bg, b.bg);
    }
}
