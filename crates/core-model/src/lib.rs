//! `View`/`Tile` layer: window-over-`FileBuf` projections and the fixed
//! tile geometry they render into, plus a small registry tracking which
//! `FileBuf` each live `View` is attached to.

pub mod diff_view;
pub mod tile;
pub mod view;

pub use diff_view::redraw_diff_pair;
pub use tile::{EighthPos, HalfPos, QuadPos, Tile};
pub use view::{View, VisualKind, VisualState};

use core_state::ViewId;

/// Tracks the open `(ViewId, Tile)` set. Does not own the `FileBuf`s or
/// `View`s themselves -- callers keep those in whatever arena fits their
/// dispatcher loop; this just hands out fresh ids and remembers tile
/// assignment, mirroring the create-on-split / destroy-on-close lifecycle.
#[derive(Debug, Default)]
pub struct ViewManager {
    next_id: ViewId,
    tiles: Vec<(ViewId, Tile)>,
    active: usize,
}

impl ViewManager {
    pub fn new() -> Self {
        Self { next_id: 0, tiles: vec![(0, Tile::Full)], active: 0 }
    }

    pub fn active_id(&self) -> ViewId {
        self.tiles[self.active].0
    }

    pub fn active_tile(&self) -> Tile {
        self.tiles[self.active].1
    }

    pub fn ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.tiles.iter().map(|(id, _)| *id)
    }

    /// Registers a new view at `tile`, returning its id.
    pub fn open(&mut self, tile: Tile) -> ViewId {
        self.next_id += 1;
        let id = self.next_id;
        self.tiles.push((id, tile));
        self.active = self.tiles.len() - 1;
        id
    }

    /// Removes `id`'s tile. If it was active, the previous tile (or the
    /// first remaining one) becomes active.
    pub fn close(&mut self, id: ViewId) {
        if let Some(pos) = self.tiles.iter().position(|(i, _)| *i == id) {
            self.tiles.remove(pos);
            if self.tiles.is_empty() {
                self.tiles.push((0, Tile::Full));
                self.active = 0;
            } else {
                self.active = pos.saturating_sub(1).min(self.tiles.len() - 1);
            }
        }
    }

    pub fn set_tile(&mut self, id: ViewId, tile: Tile) {
        if let Some(entry) = self.tiles.iter_mut().find(|(i, _)| *i == id) {
            entry.1 = tile;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_has_one_full_tile() {
        let mgr = ViewManager::new();
        assert_eq!(mgr.active_tile(), Tile::Full);
        assert_eq!(mgr.ids().count(), 1);
    }

    #[test]
    fn open_adds_a_tile_and_makes_it_active() {
        let mut mgr = ViewManager::new();
        let id = mgr.open(Tile::Half(HalfPos::Left));
        assert_eq!(mgr.active_id(), id);
        assert_eq!(mgr.ids().count(), 2);
    }

    #[test]
    fn close_falls_back_to_a_remaining_tile() {
        let mut mgr = ViewManager::new();
        let a = mgr.open(Tile::Half(HalfPos::Left));
        let b = mgr.open(Tile::Half(HalfPos::Right));
        mgr.close(b);
        assert_eq!(mgr.active_id(), a);
    }
}
