//! Tile geometry: the fixed split enumeration a View's window position is
//! drawn from, plus the formula translating a tile into screen cells and
//! a screen-cell rectangle into its working (border-excluded) area.

/// A one-axis half: which side of the split this tile occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfPos {
    Top,
    Bottom,
    Left,
    Right,
}

/// A two-axis quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadPos {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// An eighth: a quarter further halved along its row axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EighthPos {
    TopLeftUpper,
    TopLeftLower,
    TopRightUpper,
    TopRightLower,
    BottomLeftUpper,
    BottomLeftLower,
    BottomRightUpper,
    BottomRightLower,
}

/// Fixed enumeration of tile positions a split can produce: full screen,
/// a half, a quarter, or an eighth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Full,
    Half(HalfPos),
    Quarter(QuadPos),
    Eighth(EighthPos),
}

/// One-cell border drawn on every side of every tile.
const BORDER: u16 = 1;

fn split(origin: u16, extent: u16) -> (u16, u16, u16, u16) {
    let half = extent / 2;
    (origin, half, origin + half, extent - half)
}

impl Tile {
    /// `(x, y, rows, cols)` of this tile within a `screen_rows x
    /// screen_cols` console, in absolute screen-cell coordinates.
    pub fn geometry(&self, screen_rows: u16, screen_cols: u16) -> (u16, u16, u16, u16) {
        let (top_y, top_rows, bot_y, bot_rows) = split(0, screen_rows);
        let (left_x, left_cols, right_x, right_cols) = split(0, screen_cols);

        match self {
            Tile::Full => (0, 0, screen_rows, screen_cols),
            Tile::Half(HalfPos::Top) => (0, top_y, top_rows, screen_cols),
            Tile::Half(HalfPos::Bottom) => (0, bot_y, bot_rows, screen_cols),
            Tile::Half(HalfPos::Left) => (left_x, 0, screen_rows, left_cols),
            Tile::Half(HalfPos::Right) => (right_x, 0, screen_rows, right_cols),
            Tile::Quarter(QuadPos::TopLeft) => (left_x, top_y, top_rows, left_cols),
            Tile::Quarter(QuadPos::TopRight) => (right_x, top_y, top_rows, right_cols),
            Tile::Quarter(QuadPos::BottomLeft) => (left_x, bot_y, bot_rows, left_cols),
            Tile::Quarter(QuadPos::BottomRight) => (right_x, bot_y, bot_rows, right_cols),
            Tile::Eighth(e) => {
                let (quad, upper) = match e {
                    EighthPos::TopLeftUpper => (QuadPos::TopLeft, true),
                    EighthPos::TopLeftLower => (QuadPos::TopLeft, false),
                    EighthPos::TopRightUpper => (QuadPos::TopRight, true),
                    EighthPos::TopRightLower => (QuadPos::TopRight, false),
                    EighthPos::BottomLeftUpper => (QuadPos::BottomLeft, true),
                    EighthPos::BottomLeftLower => (QuadPos::BottomLeft, false),
                    EighthPos::BottomRightUpper => (QuadPos::BottomRight, true),
                    EighthPos::BottomRightLower => (QuadPos::BottomRight, false),
                };
                let (x, y, rows, cols) = Tile::Quarter(quad).geometry(screen_rows, screen_cols);
                let (up_y, up_rows, down_y, down_rows) = split(y, rows);
                if upper {
                    (x, up_y, up_rows, cols)
                } else {
                    (x, down_y, down_rows, cols)
                }
            }
        }
    }

    /// `(working_rows, working_cols)` for this tile: the area available to
    /// the buffer content after reserving a banner/status/command-line
    /// strip (3 rows) and the one-cell border on every side.
    pub fn working_size(&self, screen_rows: u16, screen_cols: u16) -> (u16, u16) {
        let (_, _, rows, cols) = self.geometry(screen_rows, screen_cols);
        Self::working_size_from_rect(rows, cols)
    }

    /// Same reservation as `working_size`, but starting from a rectangle
    /// already resolved by `geometry` rather than full screen dimensions.
    /// Callers that already hold `(rows, cols)` from a prior `geometry`
    /// call must use this instead of feeding those back into
    /// `working_size`, which would split them as if they were a fresh
    /// full-screen extent.
    pub fn working_size_from_rect(rows: u16, cols: u16) -> (u16, u16) {
        let working_rows = rows.saturating_sub(3).saturating_sub(2 * BORDER);
        let working_cols = cols.saturating_sub(2 * BORDER);
        (working_rows, working_cols)
    }

    /// Top-left screen-cell coordinate of the working area (inside the
    /// border, below the banner line).
    pub fn working_origin(&self, screen_rows: u16, screen_cols: u16) -> (u16, u16) {
        let (x, y, _, _) = self.geometry(screen_rows, screen_cols);
        (x + BORDER, y + BORDER + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_tile_covers_whole_screen() {
        assert_eq!(Tile::Full.geometry(40, 100), (0, 0, 40, 100));
    }

    #[test]
    fn halves_partition_the_screen_without_gap_or_overlap() {
        let (_, _, top_rows, _) = Tile::Half(HalfPos::Top).geometry(41, 80);
        let (_, bot_y, bot_rows, _) = Tile::Half(HalfPos::Bottom).geometry(41, 80);
        assert_eq!(bot_y, top_rows);
        assert_eq!(top_rows + bot_rows, 41);
    }

    #[test]
    fn quarters_tile_the_screen_exactly() {
        let (_, _, tl_rows, tl_cols) = Tile::Quarter(QuadPos::TopLeft).geometry(40, 80);
        let (tr_x, _, _, tr_cols) = Tile::Quarter(QuadPos::TopRight).geometry(40, 80);
        assert_eq!(tr_x, tl_cols);
        assert_eq!(tl_cols + tr_cols, 80);
        assert_eq!(tl_rows, 20);
    }

    #[test]
    fn eighths_stack_within_their_quarter() {
        let (qx, qy, qrows, qcols) = Tile::Quarter(QuadPos::TopLeft).geometry(40, 80);
        let (ux, uy, urows, ucols) = Tile::Eighth(EighthPos::TopLeftUpper).geometry(40, 80);
        let (lx, ly, lrows, lcols) = Tile::Eighth(EighthPos::TopLeftLower).geometry(40, 80);
        assert_eq!((ux, ucols), (qx, qcols));
        assert_eq!((lx, lcols), (qx, qcols));
        assert_eq!(uy, qy);
        assert_eq!(ly, uy + urows);
        assert_eq!(urows + lrows, qrows);
    }

    #[test]
    fn working_size_reserves_banner_status_and_borders() {
        let (wr, wc) = Tile::Full.working_size(24, 80);
        assert_eq!(wc, 78);
        assert_eq!(wr, 24 - 3 - 2);
    }
}
