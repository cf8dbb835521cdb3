//! Minimal per-chunk tile storage fed by upstream payloads and read by mesh workers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::coord::{ChunkCoord, TILES_PER_CHUNK, TileCoord};

/// Maximum liquid depth of a single tile.
pub const MAX_LIQUID: u8 = 7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileShape {
    #[default]
    Empty,
    Floor,
    Wall,
    Ramp,
    Shrub,
}

impl TileShape {
    /// Shapes drawn with the cut-out foliage style rather than as solid terrain.
    #[inline]
    pub fn is_stencil(self) -> bool {
        matches!(self, TileShape::Shrub)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub shape: TileShape,
    pub material: u16,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        shape: TileShape::Empty,
        material: 0,
    };

    #[inline]
    pub const fn new(shape: TileShape, material: u16) -> Self {
        Self { shape, material }
    }
}

/// One streamed update for a chunk. Each list is either empty (no change for that
/// category) or a full chunk's worth of entries in row-major order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkPayload {
    pub origin: TileCoord,
    pub tiles: Vec<Tile>,
    pub water: Vec<u8>,
    pub magma: Vec<u8>,
}

impl ChunkPayload {
    #[inline]
    pub fn has_terrain(&self) -> bool {
        !self.tiles.is_empty()
    }

    #[inline]
    pub fn has_liquid(&self) -> bool {
        !self.water.is_empty() || !self.magma.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChunkTiles {
    pub coord: ChunkCoord,
    pub tiles: Vec<Tile>,
    pub water: Vec<u8>,
    pub magma: Vec<u8>,
}

impl ChunkTiles {
    pub fn empty(coord: ChunkCoord) -> Self {
        Self {
            coord,
            tiles: vec![Tile::EMPTY; TILES_PER_CHUNK],
            water: vec![0; TILES_PER_CHUNK],
            magma: vec![0; TILES_PER_CHUNK],
        }
    }

    #[inline]
    pub fn tile(&self, idx: usize) -> Tile {
        self.tiles[idx]
    }
}

fn copy_full<T: Copy + Default>(dst: &mut Vec<T>, src: &[T]) {
    dst.clear();
    dst.extend_from_slice(&src[..src.len().min(TILES_PER_CHUNK)]);
    if dst.len() != TILES_PER_CHUNK {
        dst.resize(TILES_PER_CHUNK, T::default());
    }
}

/// Thread-safe store of the latest tile data per chunk.
///
/// Readers get an `Arc` snapshot, so mesh workers never hold the lock while building.
#[derive(Default)]
pub struct TileStore {
    chunks: RwLock<HashMap<ChunkCoord, Arc<ChunkTiles>>>,
}

impl TileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a payload into the stored chunk. Categories absent from the payload
    /// keep their previous contents.
    pub fn store(&self, payload: &ChunkPayload) -> ChunkCoord {
        let coord = payload.origin.chunk();
        let mut chunks = self.chunks.write().unwrap_or_else(|e| e.into_inner());
        let entry = chunks
            .entry(coord)
            .or_insert_with(|| Arc::new(ChunkTiles::empty(coord)));
        let chunk = Arc::make_mut(entry);
        if !payload.tiles.is_empty() {
            copy_full(&mut chunk.tiles, &payload.tiles);
        }
        if !payload.water.is_empty() {
            copy_full(&mut chunk.water, &payload.water);
        }
        if !payload.magma.is_empty() {
            copy_full(&mut chunk.magma, &payload.magma);
        }
        coord
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<ChunkTiles>> {
        let chunks = self.chunks.read().unwrap_or_else(|e| e.into_inner());
        chunks.get(&coord).cloned()
    }

    pub fn tile_at(&self, t: TileCoord) -> Option<Tile> {
        self.get(t.chunk()).map(|c| c.tile(t.local_index()))
    }

    pub fn len(&self) -> usize {
        self.chunks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        self.chunks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
