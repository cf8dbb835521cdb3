use serde::{Deserialize, Serialize};

/// Edge length of a chunk in tiles along both horizontal axes.
pub const CHUNK_EDGE: i32 = 16;
pub const TILES_PER_CHUNK: usize = (CHUNK_EDGE * CHUNK_EDGE) as usize;

/// One tile of the world grid. `z` is the vertical layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Chunk containing this tile (floor division on x/y, chunks are one layer deep).
    #[inline]
    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord {
            cx: self.x.div_euclid(CHUNK_EDGE),
            cy: self.y.div_euclid(CHUNK_EDGE),
            cz: self.z,
        }
    }

    /// Row-major index of this tile inside its chunk.
    #[inline]
    pub fn local_index(self) -> usize {
        let lx = self.x.rem_euclid(CHUNK_EDGE) as usize;
        let ly = self.y.rem_euclid(CHUNK_EDGE) as usize;
        ly * CHUNK_EDGE as usize + lx
    }
}

impl From<(i32, i32, i32)> for TileCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Block-aligned tile origin of this chunk.
    #[inline]
    pub fn origin(self) -> TileCoord {
        TileCoord::new(self.cx * CHUNK_EDGE, self.cy * CHUNK_EDGE, self.cz)
    }

    /// Tile at local (lx, ly) inside this chunk.
    #[inline]
    pub fn tile(self, lx: usize, ly: usize) -> TileCoord {
        self.origin().offset(lx as i32, ly as i32, 0)
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

/// Size of the world in chunks, as declared by the upstream source on connect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldExtent {
    pub chunks_x: usize,
    pub chunks_y: usize,
    pub layers: usize,
}

impl WorldExtent {
    #[inline]
    pub const fn new(chunks_x: usize, chunks_y: usize, layers: usize) -> Self {
        Self {
            chunks_x,
            chunks_y,
            layers,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks_x * self.chunks_y * self.layers
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        c.cx >= 0
            && c.cy >= 0
            && c.cz >= 0
            && (c.cx as usize) < self.chunks_x
            && (c.cy as usize) < self.chunks_y
            && (c.cz as usize) < self.layers
    }

    #[inline]
    pub fn tiles_x(&self) -> usize {
        self.chunks_x * CHUNK_EDGE as usize
    }

    #[inline]
    pub fn tiles_y(&self) -> usize {
        self.chunks_y * CHUNK_EDGE as usize
    }
}
