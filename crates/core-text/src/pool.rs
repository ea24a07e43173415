//! Process-wide `Line` free list. `borrow_line` hands out a cleared `Line`
//! instead of allocating a fresh one when the pool has spares; `return_line`
//! pushes a no-longer-needed `Line` back. Ownership transfers both ways:
//! a caller must not keep using a `Line` after `return_line`.
//!
//! The editor is single-threaded (no background input/render task), so the
//! free list lives in a `thread_local`, not behind a `Mutex`.

use crate::Line;
use std::cell::RefCell;

/// Cap on retained spares. Past this, `return_line` just drops the `Line`
/// rather than growing the pool without bound.
const MAX_POOLED: usize = 256;

thread_local! {
    static POOL: RefCell<Vec<Line>> = RefCell::new(Vec::new());
}

/// Returns a cleared `Line`, reused from the pool when one is available.
pub fn borrow_line() -> Line {
    POOL.with(|pool| pool.borrow_mut().pop()).unwrap_or_else(Line::new)
}

/// Gives a `Line` back to the pool for later reuse by `borrow_line`.
pub fn return_line(mut line: Line) {
    line.clear();
    POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        if pool.len() < MAX_POOLED {
            pool.push(line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_line_is_reused_and_cleared() {
        let mut l = borrow_line();
        l.push(b'x');
        return_line(l);

        let reused = borrow_line();
        assert!(reused.is_empty());
    }

    #[test]
    fn pool_exhausted_falls_back_to_a_fresh_line() {
        let a = borrow_line();
        let b = borrow_line();
        assert!(a.is_empty() && b.is_empty());
    }
}
