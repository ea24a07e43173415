//! Yank/paste registers. Kept in the dispatcher rather than `FileBuf`:
//! they're editor session state, not buffer content, and outlive any
//! single `FileBuf` (e.g. yanking in one file, pasting in another).
//!
//! Linewise content is held as real `Line`s rather than raw bytes, and a
//! register overwrite returns the displaced `Line`s to `core_text`'s pool
//! instead of just dropping them.

use core_text::Line;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Register {
    /// Bytes from a characterwise yank/delete (`x`, `dw`, ...).
    Charwise(Vec<u8>),
    /// Whole lines from a linewise yank/delete (`dd`, `yy`, ...).
    Linewise(Vec<Line>),
}

#[derive(Debug, Default)]
pub struct RegisterFile {
    named: HashMap<char, Register>,
}

impl RegisterFile {
    pub fn set(&mut self, name: char, value: Register) {
        if let Some(old) = self.named.insert(name, value.clone()) {
            recycle(old);
        }
        if name != '"' {
            if let Some(old) = self.named.insert('"', value) {
                recycle(old);
            }
        }
    }

    pub fn get(&self, name: char) -> Option<&Register> {
        self.named.get(&name)
    }
}

fn recycle(reg: Register) {
    if let Register::Linewise(lines) = reg {
        for line in lines {
            core_text::return_line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_register_mirrors_named_set() {
        let mut regs = RegisterFile::default();
        regs.set('a', Register::Charwise(b"hi".to_vec()));
        assert_eq!(regs.get('a'), regs.get('"'));
    }

    #[test]
    fn overwriting_a_register_does_not_panic_or_lose_the_new_value() {
        let mut regs = RegisterFile::default();
        regs.set('a', Register::Linewise(vec![Line::from_slice(b"one")]));
        regs.set('a', Register::Linewise(vec![Line::from_slice(b"two")]));
        assert_eq!(regs.get('a'), Some(&Register::Linewise(vec![Line::from_slice(b"two")])));
    }
}
