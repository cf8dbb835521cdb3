use crate::coord::{ChunkCoord, WorldExtent};

/// Dense per-chunk storage over a fixed [`WorldExtent`], backed by one flat `Vec`.
///
/// Sized once; the only way to change the extent is [`Grid3::resize`], which
/// discards every cell.
#[derive(Clone, Debug)]
pub struct Grid3<T> {
    extent: WorldExtent,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid3<T> {
    pub fn new(extent: WorldExtent) -> Self {
        Self {
            extent,
            cells: vec![T::default(); extent.len()],
        }
    }

    pub fn resize(&mut self, extent: WorldExtent) {
        self.extent = extent;
        self.cells.clear();
        self.cells.resize(extent.len(), T::default());
    }
}

impl<T> Grid3<T> {
    #[inline]
    pub fn extent(&self) -> WorldExtent {
        self.extent
    }

    #[inline]
    pub fn index(&self, c: ChunkCoord) -> Option<usize> {
        if !self.extent.contains(c) {
            return None;
        }
        let (x, y, z) = (c.cx as usize, c.cy as usize, c.cz as usize);
        Some((z * self.extent.chunks_y + y) * self.extent.chunks_x + x)
    }

    #[inline]
    pub fn get(&self, c: ChunkCoord) -> Option<&T> {
        self.index(c).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, c: ChunkCoord) -> Option<&mut T> {
        self.index(c).map(move |i| &mut self.cells[i])
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }
}
