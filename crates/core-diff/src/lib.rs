//! Side-by-side diff engine: line-granularity comparison of two `FileBuf`s
//! with intra-line byte tagging, directory comparison, diff-to-diff
//! navigation, and incremental re-diff after an edit.
//!
//! The engine never holds a `View`; it takes `&FileBuf` references for
//! whichever pair the caller is currently displaying and returns/maintains
//! two equal-length `DiffInfo` arrays, one per side, indexed by display row
//! rather than file line. The caller (an owning `View` pair) translates
//! `top_line`/cursor positions in diff-line space into these rows.

pub mod area;
pub mod compare;
mod engine;

pub use area::{DiffArea, SameArea};
pub use compare::ByteTag;
pub use engine::{DiffEngine, DiffInfo, DiffType};
