//! Translates crossterm key/resize events into `core_events::Event`.

use core_events::{Event, KeyEvent, KeyToken, ModMask, NamedKey};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Converts a crossterm key event into an `Event::Key`, or `None` for key
/// codes this editor doesn't model (media keys, caps lock, ...).
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<Event> {
    if event.kind == CKeyEventKind::Release {
        return None;
    }
    let token = map_key_token(&event.code)?;
    let mods = map_mod_mask(event.modifiers);
    Some(Event::Key(KeyEvent { token, mods }))
}

fn map_key_token(code: &CKeyCode) -> Option<KeyToken> {
    let token = match code {
        CKeyCode::Char(c) if c.is_ascii() => KeyToken::Char(*c as u8),
        CKeyCode::Enter => KeyToken::Named(NamedKey::Enter),
        CKeyCode::Esc => KeyToken::Named(NamedKey::Esc),
        CKeyCode::Backspace => KeyToken::Named(NamedKey::Backspace),
        CKeyCode::Tab | CKeyCode::BackTab => KeyToken::Named(NamedKey::Tab),
        CKeyCode::Up => KeyToken::Named(NamedKey::Up),
        CKeyCode::Down => KeyToken::Named(NamedKey::Down),
        CKeyCode::Left => KeyToken::Named(NamedKey::Left),
        CKeyCode::Right => KeyToken::Named(NamedKey::Right),
        CKeyCode::Home => KeyToken::Named(NamedKey::Home),
        CKeyCode::End => KeyToken::Named(NamedKey::End),
        CKeyCode::PageUp => KeyToken::Named(NamedKey::PageUp),
        CKeyCode::PageDown => KeyToken::Named(NamedKey::PageDown),
        CKeyCode::Delete => KeyToken::Named(NamedKey::Delete),
        _ => return None,
    };
    Some(token)
}

fn map_mod_mask(mods: CKeyModifiers) -> ModMask {
    let mut out = ModMask::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= ModMask::CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= ModMask::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= ModMask::SHIFT;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Event;
    use crossterm::event::{KeyEventState as CKeyEventState, KeyEventKind};

    fn key_event(code: CKeyCode, modifiers: CKeyModifiers) -> CKeyEvent {
        CKeyEvent { code, modifiers, kind: KeyEventKind::Press, state: CKeyEventState::empty() }
    }

    #[test]
    fn maps_basic_char() {
        let ev = key_event(CKeyCode::Char('a'), CKeyModifiers::NONE);
        let Some(Event::Key(k)) = map_key_event(&ev) else { panic!("expected key") };
        assert_eq!(k.token, KeyToken::Char(b'a'));
        assert!(k.mods.is_empty());
    }

    #[test]
    fn maps_named_key() {
        let ev = key_event(CKeyCode::Enter, CKeyModifiers::NONE);
        let Some(Event::Key(k)) = map_key_event(&ev) else { panic!("expected key") };
        assert_eq!(k.token, KeyToken::Named(NamedKey::Enter));
    }

    #[test]
    fn maps_modifiers_into_mask() {
        let ev = key_event(CKeyCode::Char('d'), CKeyModifiers::CONTROL | CKeyModifiers::SHIFT);
        let Some(Event::Key(k)) = map_key_event(&ev) else { panic!("expected key") };
        assert!(k.mods.contains(ModMask::CTRL));
        assert!(k.mods.contains(ModMask::SHIFT));
    }

    #[test]
    fn unsupported_keys_return_none() {
        let ev = key_event(CKeyCode::CapsLock, CKeyModifiers::NONE);
        assert!(map_key_event(&ev).is_none());
    }
}
