//! Blocking keystroke + resize polling.
//!
//! Single-threaded loop model: `poll_event` blocks for at most
//! `timeout` waiting on the terminal's input file descriptor, returning
//! `Event::Idle` on timeout so the caller can run periodic housekeeping
//! (mtime polling, deferred highlighting) without a second thread.

mod key_token;

pub use core_events::{Event, KeyEvent, KeyToken, ModMask, NamedKey};

use anyhow::Result;
use std::time::Duration;

/// Blocks for up to `timeout`, returning the next input event. Resize
/// events from the terminal are reported directly; anything this editor
/// doesn't model (mouse, unsupported keys) is swallowed and polling
/// continues until `timeout` elapses.
pub fn poll_event(timeout: Duration) -> Result<Event> {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(std::time::Instant::now());
        if remaining.is_zero() {
            return Ok(Event::Idle);
        }
        if !crossterm::event::poll(remaining)? {
            return Ok(Event::Idle);
        }
        match crossterm::event::read()? {
            crossterm::event::Event::Key(k) => {
                if let Some(ev) = key_token::map_key_event(&k) {
                    return Ok(ev);
                }
            }
            crossterm::event::Event::Resize(cols, rows) => return Ok(Event::Resize(cols, rows)),
            _ => {}
        }
    }
}
