use std::sync::Arc;

use delve_geom::Vec3;
use delve_mesh::{Face, GlowLight, MeshBundle, MeshData};
use delve_runtime::{ChunkMesher, MeshError, MeshJob};
use delve_world::mapper::{FLOOR_HEIGHT, TILE_HEIGHT, TILE_WIDTH, bottom_corner, tile_center};
use delve_world::tiles::MAX_LIQUID;
use delve_world::{CHUNK_EDGE, ChunkTiles, TileShape, TileStore};

const EDGE: usize = CHUNK_EDGE as usize;

/// Flat-quad mesher: one top face per tile, wall sides where the neighbour inside
/// the chunk is open, crossed quads for shrubs, and a level-scaled sheet per
/// liquid tile.
pub struct FlatMesher {
    tiles: Arc<TileStore>,
}

impl FlatMesher {
    pub fn new(tiles: Arc<TileStore>) -> Self {
        Self { tiles }
    }
}

fn material_rgba(material: u16) -> [u8; 4] {
    let m = material as u32;
    [
        (96 + (m * 37) % 128) as u8,
        (96 + (m * 59) % 128) as u8,
        (96 + (m * 83) % 128) as u8,
        255,
    ]
}

fn is_wall(snap: &ChunkTiles, lx: i32, ly: i32) -> bool {
    if lx < 0 || ly < 0 || lx >= CHUNK_EDGE || ly >= CHUNK_EDGE {
        return false;
    }
    snap.tile(ly as usize * EDGE + lx as usize).shape == TileShape::Wall
}

fn build_terrain(snap: &ChunkTiles, terrain: &mut MeshData, stencil: &mut MeshData) {
    for ly in 0..EDGE {
        for lx in 0..EDGE {
            let t = snap.tile(ly * EDGE + lx);
            let c = bottom_corner(snap.coord.tile(lx, ly));
            let rgba = material_rgba(t.material);
            match t.shape {
                TileShape::Empty => {}
                TileShape::Floor => {
                    terrain.add_face_rect(
                        Face::PosY,
                        c + Vec3::new(0.0, FLOOR_HEIGHT, 0.0),
                        TILE_WIDTH,
                        TILE_WIDTH,
                        rgba,
                    );
                }
                TileShape::Ramp => {
                    terrain.add_face_rect(
                        Face::PosY,
                        c + Vec3::new(0.0, TILE_HEIGHT / 2.0, 0.0),
                        TILE_WIDTH,
                        TILE_WIDTH,
                        rgba,
                    );
                }
                TileShape::Wall => {
                    terrain.add_face_rect(
                        Face::PosY,
                        c + Vec3::new(0.0, TILE_HEIGHT, 0.0),
                        TILE_WIDTH,
                        TILE_WIDTH,
                        rgba,
                    );
                    let (x, y) = (lx as i32, ly as i32);
                    // World +y is render -z.
                    if !is_wall(snap, x + 1, y) {
                        terrain.add_face_rect(Face::PosX, c + Vec3::new(TILE_WIDTH, 0.0, 0.0), TILE_WIDTH, TILE_HEIGHT, rgba);
                    }
                    if !is_wall(snap, x - 1, y) {
                        terrain.add_face_rect(Face::NegX, c, TILE_WIDTH, TILE_HEIGHT, rgba);
                    }
                    if !is_wall(snap, x, y - 1) {
                        terrain.add_face_rect(Face::PosZ, c + Vec3::new(0.0, 0.0, TILE_WIDTH), TILE_WIDTH, TILE_HEIGHT, rgba);
                    }
                    if !is_wall(snap, x, y + 1) {
                        terrain.add_face_rect(Face::NegZ, c, TILE_WIDTH, TILE_HEIGHT, rgba);
                    }
                }
                TileShape::Shrub => {
                    terrain.add_face_rect(
                        Face::PosY,
                        c + Vec3::new(0.0, FLOOR_HEIGHT, 0.0),
                        TILE_WIDTH,
                        TILE_WIDTH,
                        rgba,
                    );
                    let mid = TILE_WIDTH / 2.0;
                    let base = c + Vec3::new(0.0, FLOOR_HEIGHT, 0.0);
                    stencil.add_face_rect(Face::PosZ, base + Vec3::new(0.0, 0.0, mid), TILE_WIDTH, TILE_HEIGHT / 2.0, rgba);
                    stencil.add_face_rect(Face::PosX, base + Vec3::new(mid, 0.0, 0.0), TILE_WIDTH, TILE_HEIGHT / 2.0, rgba);
                }
            }
        }
    }
}

fn liquid_sheet(out: &mut MeshData, corner: Vec3, level: u8, rgba: [u8; 4]) {
    let h = TILE_HEIGHT * level.min(MAX_LIQUID) as f32 / MAX_LIQUID as f32;
    out.add_face_rect(Face::PosY, corner + Vec3::new(0.0, h, 0.0), TILE_WIDTH, TILE_WIDTH, rgba);
}

fn build_liquids(
    snap: &ChunkTiles,
    water: &mut MeshData,
    magma: &mut MeshData,
    glow: &mut Vec<GlowLight>,
) {
    for ly in 0..EDGE {
        for lx in 0..EDGE {
            let i = ly * EDGE + lx;
            let tile = snap.coord.tile(lx, ly);
            let c = bottom_corner(tile);
            if snap.water[i] > 0 {
                liquid_sheet(water, c, snap.water[i], [40, 90, 200, 160]);
            }
            if snap.magma[i] > 0 {
                liquid_sheet(magma, c, snap.magma[i], [230, 90, 20, 255]);
                glow.push(GlowLight {
                    tile,
                    position: tile_center(tile),
                    intensity: snap.magma[i] as f32 / MAX_LIQUID as f32,
                });
            }
        }
    }
}

impl ChunkMesher for FlatMesher {
    fn build(&self, job: &MeshJob) -> Result<MeshBundle, MeshError> {
        let coord = job.coord();
        let snap = self.tiles.get(coord).ok_or(MeshError::MissingData(coord))?;
        let mut out = MeshBundle::new(job.origin);
        if job.terrain {
            let mut terrain = MeshData::default();
            let mut stencil = MeshData::default();
            build_terrain(&snap, &mut terrain, &mut stencil);
            out.terrain = Some(terrain);
            out.stencil = Some(stencil);
        }
        if job.liquid {
            let mut water = MeshData::default();
            let mut magma = MeshData::default();
            let mut glow = Vec::new();
            build_liquids(&snap, &mut water, &mut magma, &mut glow);
            out.water = Some(water);
            out.magma = Some(magma);
            out.glow = Some(glow);
        }
        Ok(out)
    }
}
