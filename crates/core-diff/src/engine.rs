use crate::area::{find_lines_most_same, populate_diff, populate_same, sort_same, DiffArea, MatchedRow, SameArea};
use crate::compare::{compare_lines, ByteTag};
use core_state::FileBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    Unknown,
    Same,
    Changed,
    Inserted,
    Deleted,
    DiffFiles,
}

/// One row of one side's diff display. `line_num` is the file-line this row
/// shows, or `None` when this side has nothing to show at this row. `Deleted`
/// rows always carry `None` (a blank/gap row); `Inserted` rows always carry
/// `Some` (unique content not present on the other side). A `Deleted` row on
/// one side always lines up with an `Inserted` row on the other at the same
/// index, never `Deleted` with `Deleted`. `line_info` carries the per-byte
/// tags from `compare_lines`, present only when `diff_type == Changed`.
#[derive(Debug, Clone)]
pub struct DiffInfo {
    pub diff_type: DiffType,
    pub line_num: Option<usize>,
    pub line_info: Option<Vec<ByteTag>>,
}

impl DiffInfo {
    fn same(line_num: usize) -> Self {
        Self { diff_type: DiffType::Same, line_num: Some(line_num), line_info: None }
    }
    fn changed(line_num: usize, tags: Vec<ByteTag>) -> Self {
        Self { diff_type: DiffType::Changed, line_num: Some(line_num), line_info: Some(tags) }
    }
    fn deleted(line_num: Option<usize>) -> Self {
        Self { diff_type: DiffType::Deleted, line_num, line_info: None }
    }
    fn inserted(line_num: Option<usize>) -> Self {
        Self { diff_type: DiffType::Inserted, line_num, line_info: None }
    }
}

/// Rows-around-cursor kept untouched by `rediff`, expanded outward to the
/// nearest enclosing `Same` row on each side.
const REDIFF_WINDOW: usize = 50;

/// Caps how many directory child files this engine will byte-compare (via
/// the caller-supplied comparator) in one `compare_directories` call.
pub const DIR_COMPARE_RATE_LIMIT: usize = 200;

/// Line-granularity diff between two `FileBuf`s. Holds no reference to
/// either buffer between calls; every method that needs line content takes
/// the buffers as arguments.
#[derive(Debug, Default)]
pub struct DiffEngine {
    di_a: Vec<DiffInfo>,
    di_b: Vec<DiffInfo>,
    /// Current diff-line cursor, shared by both sides (lockstep navigation).
    cursor: usize,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn di_a(&self) -> &[DiffInfo] {
        &self.di_a
    }
    pub fn di_b(&self) -> &[DiffInfo] {
        &self.di_b
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn set_cursor(&mut self, row: usize) {
        self.cursor = row.min(self.di_a.len().saturating_sub(1));
    }

    pub fn clear_diff(&mut self) {
        self.di_a.clear();
        self.di_b.clear();
        self.cursor = 0;
    }

    /// Runs the full line-granularity diff between `a` and `b`. Designates
    /// the fewer-line buffer as "short" internally; ties are broken by
    /// treating `a` as short, matching argument order.
    pub fn run(&mut self, a: &FileBuf, b: &FileBuf) {
        self.clear_diff();

        if a.is_directory() && b.is_directory() {
            self.run_directory_names(a, b);
            return;
        }

        let (short, long, a_is_short) = if a.num_lines() <= b.num_lines() {
            (a, b, true)
        } else {
            (b, a, false)
        };

        let whole = DiffArea { ln_s: 0, ln_l: 0, nlines_s: short.num_lines(), nlines_l: long.num_lines() };
        let (di_s, di_l) = diff_area_rows(short, long, whole);

        if a_is_short {
            self.di_a = di_s;
            self.di_b = di_l;
        } else {
            self.di_a = di_l;
            self.di_b = di_s;
        }
    }

    /// Directory comparison, first pass: diff the sorted entry-name lines
    /// exactly like a text diff (each directory's `FileBuf` lines are
    /// already just the entry names).
    fn run_directory_names(&mut self, a: &FileBuf, b: &FileBuf) {
        let (short, long, a_is_short) = if a.num_lines() <= b.num_lines() {
            (a, b, true)
        } else {
            (b, a, false)
        };
        let whole = DiffArea { ln_s: 0, ln_l: 0, nlines_s: short.num_lines(), nlines_l: long.num_lines() };
        let (di_s, di_l) = diff_area_rows(short, long, whole);
        if a_is_short {
            self.di_a = di_s;
            self.di_b = di_l;
        } else {
            self.di_a = di_l;
            self.di_b = di_s;
        }
    }

    /// Second pass for directory diffs: for every row both sides agree is
    /// `Same` (same filename present in both directories), ask
    /// `content_cmp` whether the files' contents also match; if not,
    /// reclassify both sides' row as `DiffFiles`. `content_cmp` returns
    /// `None` when it can't determine equality (caller's filesystem
    /// concern), in which case the row is left `Same`. Stops after
    /// consulting `content_cmp` for `rate_limit` rows.
    pub fn compare_directory_contents(
        &mut self,
        a_names: &FileBuf,
        content_cmp: impl Fn(&str) -> Option<bool>,
        rate_limit: usize,
    ) {
        let mut consulted = 0;
        for (row_a, row_b) in self.di_a.iter_mut().zip(self.di_b.iter_mut()) {
            if consulted >= rate_limit {
                break;
            }
            if row_a.diff_type != DiffType::Same || row_b.diff_type != DiffType::Same {
                continue;
            }
            let Some(line_num) = row_a.line_num else { continue };
            if line_num >= a_names.num_lines() {
                continue;
            }
            let name = String::from_utf8_lossy(a_names.line(line_num).as_bytes()).into_owned();
            consulted += 1;
            if content_cmp(&name) == Some(false) {
                row_a.diff_type = DiffType::DiffFiles;
                row_b.diff_type = DiffType::DiffFiles;
            }
        }
    }

    fn row_is_diff(&self, row: usize) -> bool {
        self.di_a[row].diff_type != DiffType::Same
    }

    /// Equal content but unequal length on a `Changed` row: a
    /// trailing-whitespace-only difference.
    fn row_is_trailing_ws_diff(&self, row: usize, a: &FileBuf, b: &FileBuf) -> bool {
        if self.di_a[row].diff_type != DiffType::Changed || self.di_b[row].diff_type != DiffType::Changed {
            return false;
        }
        let (Some(la), Some(lb)) = (self.di_a[row].line_num, self.di_b[row].line_num) else {
            return false;
        };
        if la >= a.num_lines() || lb >= b.num_lines() {
            return false;
        }
        let ba = a.line(la).as_bytes();
        let bb = b.line(lb).as_bytes();
        trim_trailing_ws(ba) == trim_trailing_ws(bb) && ba.len() != bb.len()
    }

    /// Searches forward from the cursor for the next diff row — first
    /// skipping the rest of a same-run if already sitting on a diff,
    /// matching a trailing-whitespace-only row too. Wraps once. Returns
    /// `false` if no diff exists anywhere.
    pub fn next_diff(&mut self, a: &FileBuf, b: &FileBuf) -> bool {
        let n = self.di_a.len();
        if n == 0 {
            return false;
        }
        let mut i = self.cursor;
        if self.row_is_diff(i) {
            let start = i;
            loop {
                i = (i + 1) % n;
                if !self.row_is_diff(i) || i == start {
                    break;
                }
            }
        }
        let begin = i;
        loop {
            i = (i + 1) % n;
            if self.row_is_diff(i) || self.row_is_trailing_ws_diff(i, a, b) {
                self.cursor = i;
                return true;
            }
            if i == begin {
                return false;
            }
        }
    }

    /// Mirror image of `next_diff`, searching backward.
    pub fn prev_diff(&mut self, a: &FileBuf, b: &FileBuf) -> bool {
        let n = self.di_a.len();
        if n == 0 {
            return false;
        }
        let mut i = self.cursor;
        if self.row_is_diff(i) {
            let start = i;
            loop {
                i = (i + n - 1) % n;
                if !self.row_is_diff(i) || i == start {
                    break;
                }
            }
        }
        let begin = i;
        loop {
            i = (i + n - 1) % n;
            if self.row_is_diff(i) || self.row_is_trailing_ws_diff(i, a, b) {
                self.cursor = i;
                return true;
            }
            if i == begin {
                return false;
            }
        }
    }

    /// Re-diffs only the window of rows around the cursor (expanded outward
    /// to the nearest enclosing `Same` row on each side), replacing just
    /// that slice of `di_a`/`di_b` in place. Falls back to a full `run` if
    /// there's no existing diff to patch incrementally.
    pub fn rediff(&mut self, a: &FileBuf, b: &FileBuf) {
        if self.di_a.is_empty() {
            self.run(a, b);
            return;
        }
        let n = self.di_a.len();
        let center = self.cursor.min(n - 1);
        let mut lo = center.saturating_sub(REDIFF_WINDOW);
        let mut hi = (center + REDIFF_WINDOW).min(n - 1);
        while lo > 0 && self.di_a[lo].diff_type != DiffType::Same {
            lo -= 1;
        }
        while hi < n - 1 && self.di_a[hi].diff_type != DiffType::Same {
            hi += 1;
        }

        let (short, long, a_is_short) = if a.num_lines() <= b.num_lines() { (a, b, true) } else { (b, a, false) };

        let ln_s = nearest_line_num(self.side_for(a_is_short, true), lo, hi, true);
        let ln_l = nearest_line_num(self.side_for(a_is_short, false), lo, hi, true);
        let fnl_s = nearest_line_num(self.side_for(a_is_short, true), lo, hi, false).min(short.num_lines());
        let fnl_l = nearest_line_num(self.side_for(a_is_short, false), lo, hi, false).min(long.num_lines());

        let area = DiffArea {
            ln_s,
            ln_l,
            nlines_s: fnl_s.saturating_sub(ln_s),
            nlines_l: fnl_l.saturating_sub(ln_l),
        };
        let (new_s, new_l) = diff_area_rows(short, long, area);
        let (new_a, new_b) = if a_is_short { (new_s, new_l) } else { (new_l, new_s) };

        self.di_a.splice(lo..=hi, new_a);
        self.di_b.splice(lo..=hi, new_b);
        self.cursor = lo.min(self.di_a.len().saturating_sub(1));
    }

    fn side_for(&self, a_is_short: bool, want_short: bool) -> &[DiffInfo] {
        if a_is_short == want_short {
            &self.di_a
        } else {
            &self.di_b
        }
    }

    fn sides_mut(&mut self, side: Side) -> (&mut Vec<DiffInfo>, &mut Vec<DiffInfo>) {
        match side {
            Side::A => (&mut self.di_a, &mut self.di_b),
            Side::B => (&mut self.di_b, &mut self.di_a),
        }
    }

    /// Patches the diff arrays point-wise after a line has already been
    /// inserted into `side`'s FileBuf at file-line index `at`, landing at
    /// diff-row `row`. Cheaper than `rediff` for the common single-line-edit
    /// case; falls back to nothing special if `row` is out of range (caller
    /// should `rediff` instead when there's no existing diff to patch).
    pub fn patch_insert(&mut self, side: Side, row: usize, at: usize, a: &FileBuf, b: &FileBuf) {
        let (my_fb, other_fb) = match side {
            Side::A => (a, b),
            Side::B => (b, a),
        };
        let reused_gap = {
            let (mine, _) = self.sides_mut(side);
            row < mine.len() && mine[row].diff_type == DiffType::Deleted
        };

        if reused_gap {
            let other_line_num = {
                let (_, other) = self.sides_mut(side);
                other[row].line_num
            };
            let recompared = other_line_num.map(|other_at| {
                let (bytes_same, tags_mine, tags_other) = compare_lines(my_fb.line(at), other_fb.line(other_at));
                let equal = bytes_same == my_fb.line(at).len() && bytes_same == other_fb.line(other_at).len();
                (equal, tags_mine, tags_other)
            });
            let (mine, other) = self.sides_mut(side);
            mine[row] = DiffInfo { diff_type: DiffType::Same, line_num: Some(at), line_info: None };
            match recompared {
                Some((true, _, _)) | None => {
                    mine[row].diff_type = DiffType::Same;
                    other[row].diff_type = DiffType::Same;
                    other[row].line_info = None;
                }
                Some((false, tags_mine, tags_other)) => {
                    mine[row].diff_type = DiffType::Changed;
                    mine[row].line_info = Some(tags_mine);
                    other[row].diff_type = DiffType::Changed;
                    other[row].line_info = Some(tags_other);
                }
            }
            for d in mine[row + 1..].iter_mut() {
                if let Some(n) = d.line_num.as_mut() {
                    *n += 1;
                }
            }
        } else {
            let (mine, other) = self.sides_mut(side);
            let insert_at = row.min(mine.len());
            mine.insert(insert_at, DiffInfo::inserted(Some(at)));
            other.insert(insert_at, DiffInfo::deleted(None));
            for d in mine[insert_at + 1..].iter_mut() {
                if let Some(n) = d.line_num.as_mut() {
                    *n += 1;
                }
            }
        }
        self.cursor = row.min(self.di_a.len().saturating_sub(1));
    }

    /// Patches the diff arrays after a line has already been removed from
    /// `side`'s FileBuf, where `row` is the diff-row that held it.
    pub fn patch_delete(&mut self, side: Side, row: usize) {
        let (mine, other) = self.sides_mut(side);
        if row >= mine.len() {
            return;
        }
        match mine[row].diff_type {
            DiffType::Same | DiffType::Changed => {
                mine[row].diff_type = DiffType::Deleted;
                mine[row].line_num = None;
                mine[row].line_info = None;
                other[row].diff_type = DiffType::Inserted;
                other[row].line_info = None;
                for d in mine[row + 1..].iter_mut() {
                    if let Some(n) = d.line_num.as_mut() {
                        *n = n.saturating_sub(1);
                    }
                }
            }
            DiffType::Inserted => {
                mine.remove(row);
                other.remove(row);
                for d in mine[row.min(mine.len())..].iter_mut() {
                    if let Some(n) = d.line_num.as_mut() {
                        *n = n.saturating_sub(1);
                    }
                }
            }
            DiffType::Deleted | DiffType::DiffFiles | DiffType::Unknown => {
                for d in mine[row + 1..].iter_mut() {
                    if let Some(n) = d.line_num.as_mut() {
                        *n = n.saturating_sub(1);
                    }
                }
            }
        }
        self.cursor = self.cursor.min(self.di_a.len().saturating_sub(1));
    }

    /// Patches the diff arrays after a line's bytes have changed in place
    /// (no line inserted or removed) on `side`'s FileBuf, at diff-row `row`.
    pub fn patch_change(&mut self, side: Side, row: usize, a: &FileBuf, b: &FileBuf) {
        let (my_fb, other_fb) = match side {
            Side::A => (a, b),
            Side::B => (b, a),
        };
        let (mine, other) = self.sides_mut(side);
        if row >= mine.len() {
            return;
        }
        if !matches!(mine[row].diff_type, DiffType::Same | DiffType::Changed) {
            return;
        }
        let (Some(my_at), Some(other_at)) = (mine[row].line_num, other[row].line_num) else {
            return;
        };
        let (bytes_same, tags_mine, tags_other) = compare_lines(my_fb.line(my_at), other_fb.line(other_at));
        let equal = bytes_same == my_fb.line(my_at).len() && bytes_same == other_fb.line(other_at).len();
        if equal {
            mine[row].diff_type = DiffType::Same;
            mine[row].line_info = None;
            other[row].diff_type = DiffType::Same;
            other[row].line_info = None;
        } else {
            mine[row].diff_type = DiffType::Changed;
            mine[row].line_info = Some(tags_mine);
            other[row].diff_type = DiffType::Changed;
            other[row].line_info = Some(tags_other);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

fn nearest_line_num(side: &[DiffInfo], lo: usize, hi: usize, from_start: bool) -> usize {
    if from_start {
        side[lo..=hi].iter().find_map(|di| di.line_num).unwrap_or(0)
    } else {
        side[lo..=hi].iter().rev().find_map(|di| di.line_num).map(|n| n + 1).unwrap_or(0)
    }
}

fn trim_trailing_ws(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && (bytes[end - 1] == b' ' || bytes[end - 1] == b'\t') {
        end -= 1;
    }
    &bytes[..end]
}

/// Builds the `(di_s, di_l)` rows for one compare area: partitions it into
/// same-runs and diff-gaps, then expands each into rows.
fn diff_area_rows(short: &FileBuf, long: &FileBuf, area: DiffArea) -> (Vec<DiffInfo>, Vec<DiffInfo>) {
    let mut sames = populate_same(short, long, area);
    sort_same(&mut sames);
    let gaps = populate_diff(area, &sames);

    let mut di_s = Vec::new();
    let mut di_l = Vec::new();

    for (i, gap) in gaps.iter().enumerate() {
        push_diff_area(short, long, *gap, &mut di_s, &mut di_l);
        if let Some(same) = sames.get(i) {
            push_same_area(*same, &mut di_s, &mut di_l);
        }
    }

    (di_s, di_l)
}

fn push_same_area(same: SameArea, di_s: &mut Vec<DiffInfo>, di_l: &mut Vec<DiffInfo>) {
    for i in 0..same.nlines {
        di_s.push(DiffInfo::same(same.ln_s + i));
        di_l.push(DiffInfo::same(same.ln_l + i));
    }
}

fn push_diff_area(short: &FileBuf, long: &FileBuf, area: DiffArea, di_s: &mut Vec<DiffInfo>, di_l: &mut Vec<DiffInfo>) {
    if area.nlines_s == 0 && area.nlines_l == 0 {
        return;
    }
    if area.nlines_s == area.nlines_l {
        for k in 0..area.nlines_s {
            let (bytes_same, tags_s, tags_l) = compare_lines(short.line(area.ln_s + k), long.line(area.ln_l + k));
            let _ = bytes_same;
            di_s.push(DiffInfo::changed(area.ln_s + k, tags_s));
            di_l.push(DiffInfo::changed(area.ln_l + k, tags_l));
        }
        return;
    }

    for row in find_lines_most_same(short, long, area) {
        match row {
            MatchedRow::Paired { ls, ll } => {
                let (_, tags_s, tags_l) = compare_lines(short.line(ls), long.line(ll));
                di_s.push(DiffInfo::changed(ls, tags_s));
                di_l.push(DiffInfo::changed(ll, tags_l));
            }
            MatchedRow::Deleted { ls } => {
                di_s.push(DiffInfo::inserted(Some(ls)));
                di_l.push(DiffInfo::deleted(None));
            }
            MatchedRow::Inserted { ll } => {
                di_s.push(DiffInfo::deleted(None));
                di_l.push(DiffInfo::inserted(Some(ll)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Line;
    use std::path::PathBuf;

    fn fb(lines: &[&str]) -> FileBuf {
        let lines: Vec<Line> = lines.iter().map(|s| Line::from_slice(s.as_bytes())).collect();
        FileBuf::from_lines(PathBuf::from("t.txt"), lines, true)
    }

    #[test]
    fn identical_files_are_all_same() {
        let a = fb(&["one", "two", "three"]);
        let b = fb(&["one", "two", "three"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        assert!(engine.di_a().iter().all(|d| d.diff_type == DiffType::Same));
        assert_eq!(engine.di_a().len(), engine.di_b().len());
        assert_eq!(engine.di_a().len(), 3);
    }

    #[test]
    fn single_inserted_line_is_detected() {
        let a = fb(&["one", "two"]);
        let b = fb(&["one", "middle", "two"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        assert_eq!(engine.di_a().len(), engine.di_b().len());
        let inserted_count = engine.di_b().iter().filter(|d| d.diff_type == DiffType::Inserted).count();
        assert_eq!(inserted_count, 1);
        let same_count = engine.di_a().iter().filter(|d| d.diff_type == DiffType::Same).count();
        assert_eq!(same_count, 2);
    }

    #[test]
    fn changed_line_carries_byte_tags() {
        let a = fb(&["hello"]);
        let b = fb(&["hellp"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        assert_eq!(engine.di_a()[0].diff_type, DiffType::Changed);
        assert!(engine.di_a()[0].line_info.is_some());
    }

    #[test]
    fn next_diff_skips_same_runs_and_wraps() {
        let a = fb(&["same", "diffA", "same2"]);
        let b = fb(&["same", "diffB", "same2"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        assert!(engine.next_diff(&a, &b));
        assert_eq!(engine.cursor(), 1);
        assert!(!engine.next_diff(&a, &b) || engine.cursor() == 1);
    }

    #[test]
    fn directory_same_name_can_be_reclassified_as_diff_files() {
        use core_state::DirEntry;
        let dir_a = FileBuf::from_dir_listing(
            PathBuf::from("/a"),
            vec![DirEntry { name: "x.txt".into(), size: 1 }, DirEntry { name: "y.txt".into(), size: 2 }],
        );
        let dir_b = FileBuf::from_dir_listing(
            PathBuf::from("/b"),
            vec![DirEntry { name: "x.txt".into(), size: 1 }, DirEntry { name: "y.txt".into(), size: 3 }],
        );
        let mut engine = DiffEngine::new();
        engine.run(&dir_a, &dir_b);
        assert!(engine.di_a().iter().all(|d| d.diff_type == DiffType::Same));

        engine.compare_directory_contents(&dir_a, |name| Some(name != "y.txt"), DIR_COMPARE_RATE_LIMIT);
        let types: Vec<DiffType> = engine.di_a().iter().map(|d| d.diff_type).collect();
        assert_eq!(types, vec![DiffType::Same, DiffType::DiffFiles]);
    }

    #[test]
    fn deleted_and_inserted_rows_always_pair_complementarily() {
        let a = fb(&["one", "two", "three"]);
        let b = fb(&["one", "three"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        for (da, db) in engine.di_a().iter().zip(engine.di_b().iter()) {
            if da.diff_type == DiffType::Deleted {
                assert_eq!(db.diff_type, DiffType::Inserted);
                assert!(da.line_num.is_none());
                assert!(db.line_num.is_some());
            }
            if db.diff_type == DiffType::Deleted {
                assert_eq!(da.diff_type, DiffType::Inserted);
                assert!(db.line_num.is_none());
                assert!(da.line_num.is_some());
            }
        }
    }

    #[test]
    fn rediff_after_run_reproduces_same_result() {
        let a = fb(&["a", "b", "c", "d", "e"]);
        let b = fb(&["a", "b", "X", "d", "e"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        let before: Vec<DiffType> = engine.di_a().iter().map(|d| d.diff_type).collect();
        engine.set_cursor(2);
        engine.rediff(&a, &b);
        let after: Vec<DiffType> = engine.di_a().iter().map(|d| d.diff_type).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn patch_insert_into_existing_gap_recompares_as_same() {
        let a = fb(&["one", "two"]);
        let b = fb(&["one", "middle", "two"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        assert_eq!(engine.di_a()[1].diff_type, DiffType::Deleted);
        assert_eq!(engine.di_b()[1].diff_type, DiffType::Inserted);

        let a2 = fb(&["one", "middle", "two"]);
        engine.patch_insert(Side::A, 1, 1, &a2, &b);
        assert_eq!(engine.di_a()[1].diff_type, DiffType::Same);
        assert_eq!(engine.di_b()[1].diff_type, DiffType::Same);
        assert_eq!(engine.di_a()[1].line_num, Some(1));
        assert_eq!(engine.di_a()[2].line_num, Some(2));
    }

    #[test]
    fn patch_insert_elsewhere_prepends_pair_and_shifts_following_rows() {
        let a = fb(&["one", "two"]);
        let b = fb(&["one", "two"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);

        let a2 = fb(&["one", "new", "two"]);
        engine.patch_insert(Side::A, 1, 1, &a2, &b);
        assert_eq!(engine.di_a().len(), 3);
        assert_eq!(engine.di_b().len(), 3);
        assert_eq!(engine.di_a()[1].diff_type, DiffType::Inserted);
        assert_eq!(engine.di_a()[1].line_num, Some(1));
        assert_eq!(engine.di_b()[1].diff_type, DiffType::Deleted);
        assert_eq!(engine.di_a()[2].line_num, Some(2));
    }

    #[test]
    fn patch_delete_on_same_row_marks_complementary_and_shifts() {
        let a = fb(&["one", "two", "three"]);
        let b = fb(&["one", "two", "three"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);

        engine.patch_delete(Side::A, 1);
        assert_eq!(engine.di_a()[1].diff_type, DiffType::Deleted);
        assert!(engine.di_a()[1].line_num.is_none());
        assert_eq!(engine.di_b()[1].diff_type, DiffType::Inserted);
        assert_eq!(engine.di_a()[2].line_num, Some(1));
    }

    #[test]
    fn patch_delete_on_inserted_row_removes_pair_entirely() {
        let a = fb(&["one", "two"]);
        let b = fb(&["one", "new", "two"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        assert_eq!(engine.di_b().len(), 3);

        engine.patch_delete(Side::B, 1);
        assert_eq!(engine.di_a().len(), 2);
        assert_eq!(engine.di_b().len(), 2);
        assert_eq!(engine.di_a()[1].line_num, Some(1));
        assert_eq!(engine.di_b()[1].line_num, Some(1));
    }

    #[test]
    fn patch_change_reclassifies_same_and_changed() {
        let a = fb(&["one", "two"]);
        let b = fb(&["one", "two"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        assert_eq!(engine.di_a()[1].diff_type, DiffType::Same);

        let a2 = fb(&["one", "twX"]);
        engine.patch_change(Side::A, 1, &a2, &b);
        assert_eq!(engine.di_a()[1].diff_type, DiffType::Changed);
        assert_eq!(engine.di_b()[1].diff_type, DiffType::Changed);

        let a3 = fb(&["one", "two"]);
        engine.patch_change(Side::A, 1, &a3, &b);
        assert_eq!(engine.di_a()[1].diff_type, DiffType::Same);
        assert_eq!(engine.di_b()[1].diff_type, DiffType::Same);
    }
}
