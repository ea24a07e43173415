//! Side-by-side diff rendering: drives a pair of `View`s in lockstep off
//! one `DiffEngine`, translating diff-line rows into each side's window.

use crate::tile::Tile;
use crate::view::View;
use core_diff::{ByteTag, DiffEngine, DiffInfo, DiffType};
use core_render::Compositor;
use core_state::FileBuf;
use core_text::StyleClass;

/// Draws both panes of a diff for the engine's current `top_line` (a
/// diff-row index shared by both sides, tracked by the left view's
/// `top_line`). Borders and status lines are left to each `View::redraw`;
/// this only repaints the working areas so the two stay in lockstep.
pub fn redraw_diff_pair(
    engine: &DiffEngine,
    a: &FileBuf,
    b: &FileBuf,
    view_a: &View,
    view_b: &View,
    comp: &mut Compositor,
) {
    comp.set_scheme(core_render::style::ColorScheme::DEFAULT);
    draw_side(engine.di_a(), a, view_a, comp);
    comp.set_scheme(core_render::style::ColorScheme::DIFF_B_SIDE);
    draw_side(engine.di_b(), b, view_b, comp);
    comp.set_scheme(core_render::style::ColorScheme::DEFAULT);
}

fn draw_side(rows: &[DiffInfo], fb: &FileBuf, view: &View, comp: &mut Compositor) {
    let (x, y, tile_rows, tile_cols) = view.tile.geometry(comp.rows(), comp.cols());
    let (working_rows, working_cols) = Tile::working_size_from_rect(tile_rows, tile_cols);
    let (ox, oy) = (x + 1, y + 2);

    for row in 0..working_rows {
        let diff_row = view.top_line + row as usize;
        if diff_row >= rows.len() {
            comp.set(oy + row, ox, b'~', (StyleClass::Empty, false));
            continue;
        }
        let info = &rows[diff_row];
        match info.diff_type {
            DiffType::Deleted => {
                for col in 0..working_cols {
                    comp.set(oy + row, ox + col, b'-', (StyleClass::DiffDeleted, false));
                }
            }
            DiffType::Inserted => {
                let Some(line_num) = info.line_num else { continue };
                let line = fb.line(line_num);
                for col in 0..working_cols {
                    let fc = col as usize;
                    let byte = if fc < line.len() { line.get(fc) } else { b' ' };
                    comp.set(oy + row, ox + col, byte, (StyleClass::DiffInserted, false));
                }
            }
            DiffType::Changed => {
                let Some(line_num) = info.line_num else { continue };
                let line = fb.line(line_num);
                let tags = info.line_info.as_deref().unwrap_or(&[]);
                for col in 0..working_cols {
                    let fc = col as usize;
                    let byte = if fc < line.len() { line.get(fc) } else { b' ' };
                    let class = match tags.get(fc) {
                        Some(ByteTag::Same) | None => StyleClass::DiffSame,
                        Some(ByteTag::Changed) => StyleClass::DiffChanged,
                        Some(ByteTag::Inserted) => StyleClass::DiffInserted,
                    };
                    comp.set(oy + row, ox + col, byte, (class, false));
                }
            }
            DiffType::Same | DiffType::DiffFiles | DiffType::Unknown => {
                let Some(line_num) = info.line_num else { continue };
                let line = fb.line(line_num);
                let style = fb.style(line_num);
                for col in 0..working_cols {
                    let fc = col as usize;
                    let byte = if fc < line.len() { line.get(fc) } else { b' ' };
                    let sb = if fc < style.len() { style.get(fc) } else { Default::default() };
                    let class = if info.diff_type == DiffType::DiffFiles { StyleClass::DiffChanged } else { sb.class };
                    comp.set(oy + row, ox + col, byte, (class, sb.star));
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{HalfPos, Tile};
    use core_text::Line;
    use std::path::PathBuf;

    fn fb(lines: &[&str]) -> FileBuf {
        let lines: Vec<Line> = lines.iter().map(|s| Line::from_slice(s.as_bytes())).collect();
        FileBuf::from_lines(PathBuf::from("t.txt"), lines, true)
    }

    #[test]
    fn redraw_diff_pair_does_not_panic_on_unequal_files() {
        let a = fb(&["one", "two"]);
        let b = fb(&["one", "middle", "two"]);
        let mut engine = DiffEngine::new();
        engine.run(&a, &b);
        let view_a = View::new(Tile::Half(HalfPos::Left));
        let view_b = View::new(Tile::Half(HalfPos::Right));
        let mut comp = Compositor::new(24, 80);
        redraw_diff_pair(&engine, &a, &b, &view_a, &view_b, &mut comp);
    }
}
