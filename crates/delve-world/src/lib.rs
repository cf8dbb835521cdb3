//! World-side coordinates, tile/render mapping, dense chunk grids, and tile storage.
#![forbid(unsafe_code)]

pub mod coord;
pub mod grid;
pub mod mapper;
pub mod tiles;

pub use coord::{CHUNK_EDGE, ChunkCoord, TILES_PER_CHUNK, TileCoord, WorldExtent};
pub use grid::Grid3;
pub use tiles::{ChunkPayload, ChunkTiles, Tile, TileShape, TileStore};
