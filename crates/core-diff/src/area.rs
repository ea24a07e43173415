//! Line-granularity partitioning: `DiffArea`/`SameArea` plus the
//! find-largest-common-run and intra-area best-pairing passes that turn a
//! compare area into `Same`/`Changed`/`Inserted`/`Deleted` rows.

use crate::compare::shared_bytes;
use core_state::FileBuf;

/// A region still to be compared: `nlines_s` consecutive lines starting at
/// `ln_s` in the short file against `nlines_l` lines starting at `ln_l` in
/// the long file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffArea {
    pub ln_s: usize,
    pub ln_l: usize,
    pub nlines_s: usize,
    pub nlines_l: usize,
}

impl DiffArea {
    pub fn fnl_s(&self) -> usize {
        self.ln_s + self.nlines_s
    }
    pub fn fnl_l(&self) -> usize {
        self.ln_l + self.nlines_l
    }
    pub fn is_empty(&self) -> bool {
        self.nlines_s == 0 && self.nlines_l == 0
    }
}

/// A run of consecutive matching lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SameArea {
    pub ln_s: usize,
    pub ln_l: usize,
    pub nlines: usize,
    pub nbytes: usize,
}

/// Finds the largest run of consecutive matching lines anchored anywhere in
/// `area`, scored by total byte count (ties broken by line count). Returns
/// `None` if no single matching line exists in the area.
pub fn find_max_same(short: &FileBuf, long: &FileBuf, area: DiffArea) -> Option<SameArea> {
    let mut best: Option<SameArea> = None;

    let mut ls = area.ln_s;
    while ls < area.fnl_s() {
        let mut ll = area.ln_l;
        while ll < area.fnl_l() {
            let sl = short.line(ls);
            let ll_line = long.line(ll);
            if sl.as_bytes() == ll_line.as_bytes() {
                let mut run = 0usize;
                let mut nbytes = 0usize;
                while ls + run < area.fnl_s()
                    && ll + run < area.fnl_l()
                    && short.line(ls + run).as_bytes() == long.line(ll + run).as_bytes()
                {
                    nbytes += shared_bytes(short.line(ls + run), long.line(ll + run));
                    run += 1;
                }
                let candidate = SameArea { ln_s: ls, ln_l: ll, nlines: run, nbytes };
                let better = match &best {
                    None => true,
                    Some(b) => {
                        candidate.nbytes > b.nbytes
                            || (candidate.nbytes == b.nbytes && candidate.nlines > b.nlines)
                    }
                };
                if better {
                    best = Some(candidate);
                }
                // early-exit shortcut: a run can't be re-discovered starting
                // partway through itself, so skip past it.
                ll += run.max(1);
                continue;
            }
            ll += 1;
        }
        ls += 1;
    }
    best
}

/// Recursively partitions `area` around its largest same-run, stack-based
/// (matching the original's explicit work-stack rather than recursion).
/// Returns the discovered same-runs, unsorted.
pub fn populate_same(short: &FileBuf, long: &FileBuf, area: DiffArea) -> Vec<SameArea> {
    let mut stack = vec![area];
    let mut sames = Vec::new();

    while let Some(current) = stack.pop() {
        if current.nlines_s == 0 || current.nlines_l == 0 {
            continue;
        }
        match find_max_same(short, long, current) {
            None => continue,
            Some(same) => {
                let before = DiffArea {
                    ln_s: current.ln_s,
                    ln_l: current.ln_l,
                    nlines_s: same.ln_s - current.ln_s,
                    nlines_l: same.ln_l - current.ln_l,
                };
                let after = DiffArea {
                    ln_s: same.ln_s + same.nlines,
                    ln_l: same.ln_l + same.nlines,
                    nlines_s: current.fnl_s() - (same.ln_s + same.nlines),
                    nlines_l: current.fnl_l() - (same.ln_l + same.nlines),
                };
                sames.push(same);
                if !before.is_empty() {
                    stack.push(before);
                }
                if !after.is_empty() {
                    stack.push(after);
                }
            }
        }
    }
    sames
}

/// Insertion sort by `ln_l` ascending; the list from `populate_same` is
/// already near-sorted by construction.
pub fn sort_same(sames: &mut [SameArea]) {
    for i in 1..sames.len() {
        let mut j = i;
        while j > 0 && sames[j - 1].ln_l > sames[j].ln_l {
            sames.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Fills the gaps between (sorted) same-runs, and before the first/after the
/// last, with `DiffArea`s (possibly empty on one or both sides).
pub fn populate_diff(area: DiffArea, sames: &[SameArea]) -> Vec<DiffArea> {
    let mut out = Vec::with_capacity(sames.len() + 1);
    let mut cursor_s = area.ln_s;
    let mut cursor_l = area.ln_l;

    for same in sames {
        out.push(DiffArea {
            ln_s: cursor_s,
            ln_l: cursor_l,
            nlines_s: same.ln_s - cursor_s,
            nlines_l: same.ln_l - cursor_l,
        });
        cursor_s = same.ln_s + same.nlines;
        cursor_l = same.ln_l + same.nlines;
    }
    out.push(DiffArea {
        ln_s: cursor_s,
        ln_l: cursor_l,
        nlines_s: area.fnl_s() - cursor_s,
        nlines_l: area.fnl_l() - cursor_l,
    });
    out
}

/// One row produced while reconciling a `DiffArea` with unequal side
/// lengths: either a matched (possibly fully-equal) pair, or a one-sided
/// insertion/deletion. Row order follows the side with more lines, as the
/// fewer side can't offer one row per line.
#[derive(Debug, Clone, Copy)]
pub enum MatchedRow {
    Paired { ls: usize, ll: usize },
    Deleted { ls: usize },
    Inserted { ll: usize },
}

/// Greedily pairs the fewer side's lines against candidates in the side
/// with more lines, within a `length_diff` window, scored by shared bytes
/// via `compare_lines`. Row count equals the larger side's line count;
/// unmatched larger-side lines are `Inserted`, unmatched fewer-side lines
/// are `Deleted` (see module docs on the greedy, non-LCS intra-area
/// choice).
pub fn find_lines_most_same(short: &FileBuf, long: &FileBuf, area: DiffArea) -> Vec<MatchedRow> {
    if area.nlines_s <= area.nlines_l {
        find_lines_most_same_oriented(short, long, area.ln_s, area.nlines_s, area.ln_l, area.nlines_l, false)
    } else {
        find_lines_most_same_oriented(long, short, area.ln_l, area.nlines_l, area.ln_s, area.nlines_s, true)
            .into_iter()
            .map(|row| match row {
                MatchedRow::Paired { ls, ll } => MatchedRow::Paired { ls: ll, ll: ls },
                MatchedRow::Deleted { ls } => MatchedRow::Inserted { ll: ls },
                MatchedRow::Inserted { ll } => MatchedRow::Deleted { ls: ll },
            })
            .collect()
    }
}

/// `fewer`/`more` name which side has fewer/more lines in this area; the
/// caller remaps the result back to short/long afterwards.
fn find_lines_most_same_oriented(
    fewer_buf: &FileBuf,
    more_buf: &FileBuf,
    fewer_ln: usize,
    fewer_n: usize,
    more_ln: usize,
    more_n: usize,
    _swapped: bool,
) -> Vec<MatchedRow> {
    let length_diff = more_n - fewer_n;
    let mut matched_more_for_fewer: Vec<Option<usize>> = vec![None; fewer_n];
    let mut taken = vec![false; more_n];

    for f in 0..fewer_n {
        let mut best: Option<(usize, usize)> = None; // (more_idx, bytes_same)
        for mo in 0..more_n {
            if taken[mo] {
                continue;
            }
            if mo.abs_diff(f) > length_diff {
                continue;
            }
            let bytes_same = shared_bytes(fewer_buf.line(fewer_ln + f), more_buf.line(more_ln + mo));
            let better = match best {
                None => true,
                Some((_, b)) => bytes_same > b,
            };
            if better {
                best = Some((mo, bytes_same));
            }
        }
        if let Some((mo, _)) = best {
            taken[mo] = true;
            matched_more_for_fewer[f] = Some(mo);
        }
    }

    let mut unmatched_more: Vec<usize> = (0..more_n).filter(|&mo| !taken[mo]).collect();
    unmatched_more.sort_unstable();

    let mut rows = Vec::with_capacity(fewer_n + more_n);
    let mut j = 0usize;
    for f in 0..fewer_n {
        match matched_more_for_fewer[f] {
            Some(mo) => {
                while j < unmatched_more.len() && unmatched_more[j] < mo {
                    rows.push(MatchedRow::Inserted { ll: more_ln + unmatched_more[j] });
                    j += 1;
                }
                rows.push(MatchedRow::Paired { ls: fewer_ln + f, ll: more_ln + mo });
            }
            None => rows.push(MatchedRow::Deleted { ls: fewer_ln + f }),
        }
    }
    while j < unmatched_more.len() {
        rows.push(MatchedRow::Inserted { ll: more_ln + unmatched_more[j] });
        j += 1;
    }
    rows
}
