//! Mapping between world tiles and render space.
//!
//! Render space is y-up: world x → render x, world z (layer) → render y, and world y
//! is flipped into render -z.

use delve_geom::Vec3;

use crate::coord::{CHUNK_EDGE, TileCoord};

pub const TILE_WIDTH: f32 = 2.0;
pub const TILE_HEIGHT: f32 = 3.0;
pub const FLOOR_HEIGHT: f32 = 0.5;

#[inline]
pub fn world_to_render(t: TileCoord) -> Vec3 {
    Vec3::new(
        t.x as f32 * TILE_WIDTH,
        t.z as f32 * TILE_HEIGHT,
        t.y as f32 * -TILE_WIDTH,
    )
}

#[inline]
pub fn tile_center(t: TileCoord) -> Vec3 {
    world_to_render(t) + Vec3::new(0.0, TILE_HEIGHT / 2.0, 0.0)
}

/// Lower corner of the tile's footprint, for corner-anchored quads.
#[inline]
pub fn bottom_corner(t: TileCoord) -> Vec3 {
    world_to_render(t) - Vec3::new(TILE_WIDTH / 2.0, 0.0, TILE_WIDTH / 2.0)
}

/// Horizontal axes round to the nearest tile; the vertical axis floors, since a
/// layer spans `[z*H, (z+1)*H)`.
#[inline]
pub fn render_to_world(p: Vec3) -> TileCoord {
    TileCoord::new(
        (p.x / TILE_WIDTH).round() as i32,
        (p.z / -TILE_WIDTH).round() as i32,
        (p.y / TILE_HEIGHT).floor() as i32,
    )
}

#[inline]
pub fn is_block_aligned(t: TileCoord) -> bool {
    t.x.rem_euclid(CHUNK_EDGE) == 0 && t.y.rem_euclid(CHUNK_EDGE) == 0
}
