use delve_world::{ChunkCoord, Grid3, WorldExtent};

use crate::window::{ChunkWindow, WindowIter};

/// One chunk that needs remeshing, and which categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyChunk {
    pub coord: ChunkCoord,
    pub terrain: bool,
    pub liquid: bool,
}

/// Two per-chunk dirty planes over the world extent.
#[derive(Clone, Debug)]
pub struct DirtyTracker {
    terrain: Grid3<bool>,
    liquid: Grid3<bool>,
}

impl DirtyTracker {
    pub fn new(extent: WorldExtent) -> Self {
        Self {
            terrain: Grid3::new(extent),
            liquid: Grid3::new(extent),
        }
    }

    #[inline]
    pub fn extent(&self) -> WorldExtent {
        self.terrain.extent()
    }

    /// Returns `false` when `c` lies outside the extent.
    pub fn mark_terrain_dirty(&mut self, c: ChunkCoord) -> bool {
        mark(&mut self.terrain, c)
    }

    pub fn mark_liquid_dirty(&mut self, c: ChunkCoord) -> bool {
        mark(&mut self.liquid, c)
    }

    pub fn is_dirty(&self, c: ChunkCoord) -> (bool, bool) {
        (
            self.terrain.get(c).copied().unwrap_or(false),
            self.liquid.get(c).copied().unwrap_or(false),
        )
    }

    pub fn pending_count(&self) -> usize {
        self.terrain
            .iter()
            .zip(self.liquid.iter())
            .filter(|(t, l)| **t || **l)
            .count()
    }

    /// Yield and clear every dirty chunk inside `window`. Bits are cleared as each
    /// chunk is yielded, so dropping the iterator early leaves the rest dirty.
    pub fn drain_dirty(&mut self, window: ChunkWindow) -> Drain<'_> {
        let cells = window.clamp(self.extent()).map(|w| w.iter());
        Drain {
            tracker: self,
            cells,
        }
    }

    pub fn reset(&mut self, extent: WorldExtent) {
        self.terrain.resize(extent);
        self.liquid.resize(extent);
    }
}

fn mark(plane: &mut Grid3<bool>, c: ChunkCoord) -> bool {
    match plane.get_mut(c) {
        Some(bit) => {
            *bit = true;
            true
        }
        None => false,
    }
}

pub struct Drain<'a> {
    tracker: &'a mut DirtyTracker,
    cells: Option<WindowIter>,
}

impl Iterator for Drain<'_> {
    type Item = DirtyChunk;

    fn next(&mut self) -> Option<DirtyChunk> {
        let cells = self.cells.as_mut()?;
        for c in cells.by_ref() {
            let terrain = self.tracker.terrain.get_mut(c).map(std::mem::take);
            let liquid = self.tracker.liquid.get_mut(c).map(std::mem::take);
            let (terrain, liquid) = (terrain.unwrap_or(false), liquid.unwrap_or(false));
            if terrain || liquid {
                return Some(DirtyChunk {
                    coord: c,
                    terrain,
                    liquid,
                });
            }
        }
        None
    }
}
