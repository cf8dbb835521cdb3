use std::collections::VecDeque;

use delve_stream::{ChunkWindow, UpstreamSource, ViewUpdate};
use delve_world::tiles::MAX_LIQUID;
use delve_world::{
    CHUNK_EDGE, ChunkCoord, ChunkPayload, TILES_PER_CHUNK, Tile, TileShape, WorldExtent,
};
use fastnoise_lite::{FastNoiseLite, NoiseType};
use hashbrown::HashSet;

use crate::config::SimConfig;

const EDGE: usize = CHUNK_EDGE as usize;
const VIEW_W: i32 = 48;
const VIEW_H: i32 = 32;

const MAT_STONE: u16 = 1;
const MAT_SOIL: u16 = 2;
const MAT_GRASS: u16 = 3;

/// Deterministic stand-in for the remote world: a noise heightmap with lakes and
/// a few magma pools, a viewer panning across it, and a trickle of chunk payloads
/// for whatever window was last requested.
pub struct SyntheticWorld {
    extent: WorldExtent,
    cfg: SimConfig,
    heights: Vec<i32>,
    shrubs: Vec<bool>,
    lava: Vec<bool>,
    water_level: i32,
    tick: u64,
    requested: Option<ChunkWindow>,
    backlog: VecDeque<ChunkCoord>,
    sent: HashSet<ChunkCoord>,
    sent_order: Vec<ChunkCoord>,
    tide_cursor: usize,
    views: VecDeque<ViewUpdate>,
    chunks: VecDeque<ChunkPayload>,
}

impl SyntheticWorld {
    pub fn new(chunks_x: usize, chunks_y: usize, cfg: SimConfig) -> Self {
        let extent = WorldExtent::new(chunks_x.max(1), chunks_y.max(1), cfg.layers.max(1));
        let (tx, ty) = (extent.tiles_x(), extent.tiles_y());
        let layers = extent.layers as i32;

        let mut terrain = FastNoiseLite::with_seed(cfg.seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(0.02));
        let mut detail = FastNoiseLite::with_seed(cfg.seed.wrapping_add(101));
        detail.set_noise_type(Some(NoiseType::OpenSimplex2));
        detail.set_frequency(Some(0.15));

        let min_h = 1;
        let max_h = ((layers as f32) * 0.6) as i32;
        let mut heights = Vec::with_capacity(tx * ty);
        let mut shrubs = Vec::with_capacity(tx * ty);
        let mut lava = Vec::with_capacity(tx * ty);
        for y in 0..ty {
            for x in 0..tx {
                let h = terrain.get_noise_2d(x as f32, y as f32);
                // map [-1,1] -> [min_h, max_h]
                let hh = ((h + 1.0) * 0.5 * (max_h - min_h) as f32) as i32 + min_h;
                heights.push(hh.clamp(0, layers - 1));
                let d = detail.get_noise_2d(x as f32, y as f32);
                shrubs.push(d > 0.55);
                lava.push(d < -0.7);
            }
        }
        let water_level = (layers / 4).max(1);
        log::info!(
            target: "sim",
            "synthetic world {}x{} chunks, {} layers, seed {}",
            extent.chunks_x,
            extent.chunks_y,
            extent.layers,
            cfg.seed
        );
        Self {
            extent,
            cfg,
            heights,
            shrubs,
            lava,
            water_level,
            tick: 0,
            requested: None,
            backlog: VecDeque::new(),
            sent: HashSet::new(),
            sent_order: Vec::new(),
            tide_cursor: 0,
            views: VecDeque::new(),
            chunks: VecDeque::new(),
        }
    }

    #[inline]
    fn column(&self, x: i32, y: i32) -> usize {
        y as usize * self.extent.tiles_x() + x as usize
    }

    pub fn height_at(&self, x: i32, y: i32) -> i32 {
        let x = x.clamp(0, self.extent.tiles_x() as i32 - 1);
        let y = y.clamp(0, self.extent.tiles_y() as i32 - 1);
        self.heights[self.column(x, y)]
    }

    /// Tide alternates every `tide_every` ticks so lakes rise and fall by a layer.
    fn tide(&self) -> i32 {
        ((self.tick / self.cfg.tide_every.max(1)) % 2) as i32
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Where the viewer is on this tick: panning back and forth along x.
    fn view_center(&self) -> (i32, i32) {
        let w = self.extent.tiles_x() as i64;
        let period = (2 * w).max(1);
        let p = ((self.tick as i64) * 2) % period;
        let x = if p < w { p } else { period - p };
        let y = self.extent.tiles_y() as i32 / 2;
        (x.clamp(0, w - 1) as i32, y)
    }

    /// Advance one tick: queue a view update and release payloads.
    pub fn step(&mut self) {
        self.tick += 1;
        if self.tick == 1 || self.tick % self.cfg.view_every.max(1) == 0 {
            let (x, y) = self.view_center();
            self.views.push_back(ViewUpdate {
                view_pos_x: x - VIEW_W / 2,
                view_pos_y: y - VIEW_H / 2,
                view_pos_z: self.height_at(x, y),
                view_size_x: VIEW_W,
                view_size_y: VIEW_H,
            });
        }
        for _ in 0..self.cfg.chunks_per_tick {
            let Some(c) = self.backlog.pop_front() else {
                break;
            };
            if self.sent.insert(c) {
                self.sent_order.push(c);
            }
            let payload = self.full_payload(c);
            self.chunks.push_back(payload);
        }
        if self.tick % self.cfg.tide_every.max(1) == 0 {
            self.refresh_liquids();
        }
    }

    fn refresh_liquids(&mut self) {
        let mut n = 0;
        let total = self.sent_order.len();
        for _ in 0..total {
            if n == self.cfg.chunks_per_tick {
                break;
            }
            let c = self.sent_order[self.tide_cursor % total];
            self.tide_cursor = self.tide_cursor.wrapping_add(1);
            let in_window = self.requested.is_some_and(|w| w.contains(c));
            if !in_window {
                continue;
            }
            let (water, magma) = self.liquids(c);
            if water.iter().all(|w| *w == 0) {
                continue;
            }
            self.chunks.push_back(ChunkPayload {
                origin: c.origin(),
                water,
                magma,
                ..Default::default()
            });
            n += 1;
        }
        if n > 0 {
            log::debug!(target: "sim", "tide {} refreshed {} chunk(s)", self.tide(), n);
        }
    }

    fn liquids(&self, c: ChunkCoord) -> (Vec<u8>, Vec<u8>) {
        let mut water = vec![0u8; TILES_PER_CHUNK];
        let mut magma = vec![0u8; TILES_PER_CHUNK];
        let level = self.water_level + self.tide();
        for ly in 0..EDGE {
            for lx in 0..EDGE {
                let t = c.tile(lx, ly);
                let col = self.column(t.x, t.y);
                let h = self.heights[col];
                let i = ly * EDGE + lx;
                if self.lava[col] && t.z == h {
                    magma[i] = MAX_LIQUID;
                } else if t.z >= h && t.z < level {
                    water[i] = MAX_LIQUID;
                }
            }
        }
        (water, magma)
    }

    fn full_payload(&self, c: ChunkCoord) -> ChunkPayload {
        let mut tiles = vec![Tile::EMPTY; TILES_PER_CHUNK];
        for ly in 0..EDGE {
            for lx in 0..EDGE {
                let t = c.tile(lx, ly);
                let col = self.column(t.x, t.y);
                let h = self.heights[col];
                tiles[ly * EDGE + lx] = if t.z < h {
                    let mat = if t.z < h - 2 { MAT_STONE } else { MAT_SOIL };
                    Tile::new(TileShape::Wall, mat)
                } else if t.z == h {
                    let shape = if self.shrubs[col] {
                        TileShape::Shrub
                    } else {
                        TileShape::Floor
                    };
                    Tile::new(shape, MAT_GRASS)
                } else {
                    Tile::EMPTY
                };
            }
        }
        let (water, magma) = self.liquids(c);
        ChunkPayload {
            origin: c.origin(),
            tiles,
            water,
            magma,
        }
    }
}

impl UpstreamSource for SyntheticWorld {
    fn world_extent(&self) -> WorldExtent {
        self.extent
    }

    fn pop_view_update(&mut self) -> Option<ViewUpdate> {
        self.views.pop_front()
    }

    fn pop_chunk_update(&mut self) -> Option<ChunkPayload> {
        self.chunks.pop_front()
    }

    /// Queue every unsent chunk of the new window, nearest layer and column first.
    fn set_request_window(&mut self, window: ChunkWindow) {
        self.requested = Some(window);
        let mid = ChunkCoord::new(
            window.min.cx + (window.max.cx - window.min.cx) / 2,
            window.min.cy + (window.max.cy - window.min.cy) / 2,
            window.max.cz,
        );
        let mut want: Vec<ChunkCoord> = window
            .clamp(self.extent)
            .into_iter()
            .flat_map(|w| w.iter())
            .filter(|c| !self.sent.contains(c))
            .collect();
        want.sort_by_key(|c| {
            (mid.cz - c.cz).abs() * 4 + (mid.cx - c.cx).abs().max((mid.cy - c.cy).abs())
        });
        self.backlog = want.into();
        log::debug!(target: "sim", "window {:?}..={:?}: {} chunk(s) to send", window.min, window.max, self.backlog.len());
    }
}
