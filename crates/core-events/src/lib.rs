//! Shared input/resize event types for the single-threaded event loop.
//!
//! No mouse events, no paste-bracketing, no async channel plumbing: the
//! loop polls a single source (`core-input`) and matches directly on
//! `Event`.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModMask: u8 {
        const CTRL  = 0b0001;
        const ALT   = 0b0010;
        const SHIFT = 0b0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
}

/// One logical keypress: either a printable byte or a named control key.
/// Bytes, not chars -- this editor is ASCII/byte-oriented throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyToken {
    Char(u8),
    Named(NamedKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub token: KeyToken,
    pub mods: ModMask,
}

/// What the blocking poll loop can produce on one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Poll timed out with nothing to report; lets the loop run periodic
    /// housekeeping (e.g. mtime polling) without blocking forever.
    Idle,
}
