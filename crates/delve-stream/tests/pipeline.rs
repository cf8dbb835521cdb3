use std::collections::VecDeque;
use std::sync::Arc;

use delve_geom::Vec3;
use delve_mesh::{BufferClass, Face, GlowLight, MeshBundle, MeshData};
use delve_runtime::{ChunkMesher, InlineRuntime, MeshError, MeshJob};
use delve_stream::{
    ChunkWindow, DrawSubmission, Pipeline, RenderSurface, StreamConfig, UpstreamSource,
    ViewUpdate, Visibility,
};
use delve_world::mapper::tile_center;
use delve_world::{
    ChunkCoord, ChunkPayload, TILES_PER_CHUNK, Tile, TileCoord, TileShape, TileStore, WorldExtent,
};

struct TestMesher {
    tiles: Arc<TileStore>,
}

impl ChunkMesher for TestMesher {
    fn build(&self, job: &MeshJob) -> Result<MeshBundle, MeshError> {
        let coord = job.coord();
        let snap = self.tiles.get(coord).ok_or(MeshError::MissingData(coord))?;
        let mut out = MeshBundle::new(job.origin);
        let quad = |n: usize| {
            let mut m = MeshData::default();
            for i in 0..n {
                m.add_face_rect(Face::PosY, Vec3::new(i as f32, 0.0, 0.0), 1.0, 1.0, [200; 4]);
            }
            m
        };
        if job.terrain {
            let solid = snap.tiles.iter().filter(|t| t.shape != TileShape::Empty).count();
            out.terrain = Some(quad(solid));
            out.stencil = Some(MeshData::default());
        }
        if job.liquid {
            let wet = snap.water.iter().filter(|w| **w > 0).count();
            out.water = Some(quad(wet));
            let hot: Vec<usize> = (0..TILES_PER_CHUNK).filter(|i| snap.magma[*i] > 0).collect();
            out.magma = Some(quad(hot.len()));
            out.glow = Some(
                hot.iter()
                    .map(|i| {
                        let t = coord.tile(i % 16, i / 16);
                        GlowLight {
                            tile: t,
                            position: tile_center(t),
                            intensity: 1.0,
                        }
                    })
                    .collect(),
            );
        }
        Ok(out)
    }
}

struct FakeSource {
    extent: WorldExtent,
    views: VecDeque<ViewUpdate>,
    chunks: VecDeque<ChunkPayload>,
    pushed: Vec<ChunkWindow>,
}

impl FakeSource {
    fn new(extent: WorldExtent) -> Self {
        Self {
            extent,
            views: VecDeque::new(),
            chunks: VecDeque::new(),
            pushed: Vec::new(),
        }
    }

    fn view(&mut self, x: i32, y: i32, layer: i32) {
        self.views.push_back(ViewUpdate {
            view_pos_x: x - 8,
            view_pos_y: y - 8,
            view_pos_z: layer - 1,
            view_size_x: 16,
            view_size_y: 16,
        });
    }
}

impl UpstreamSource for FakeSource {
    fn world_extent(&self) -> WorldExtent {
        self.extent
    }
    fn pop_view_update(&mut self) -> Option<ViewUpdate> {
        self.views.pop_front()
    }
    fn pop_chunk_update(&mut self) -> Option<ChunkPayload> {
        self.chunks.pop_front()
    }
    fn set_request_window(&mut self, window: ChunkWindow) {
        self.pushed.push(window);
    }
}

#[derive(Default)]
struct Recorder {
    draws: Vec<(ChunkCoord, BufferClass, Visibility, u8)>,
    lights: usize,
    visibility_changes: Vec<i32>,
}

impl RenderSurface for Recorder {
    fn submit(&mut self, d: DrawSubmission<'_>) {
        self.draws
            .push((d.coord, d.style.class, d.style.visibility, d.layer.index()));
    }
    fn place_light(&mut self, _light: &GlowLight) {
        self.lights += 1;
    }
    fn visibility_changed(&mut self, layer: i32) {
        self.visibility_changes.push(layer);
    }
}

fn terrain_payload(origin: TileCoord) -> ChunkPayload {
    let mut tiles = vec![Tile::EMPTY; TILES_PER_CHUNK];
    tiles[0] = Tile::new(TileShape::Floor, 1);
    tiles[17] = Tile::new(TileShape::Wall, 2);
    ChunkPayload {
        origin,
        tiles,
        ..Default::default()
    }
}

fn liquid_payload(origin: TileCoord, water: u8, magma: u8) -> ChunkPayload {
    ChunkPayload {
        origin,
        water: vec![water; TILES_PER_CHUNK],
        magma: {
            let mut m = vec![0; TILES_PER_CHUNK];
            m[5] = magma;
            m
        },
        ..Default::default()
    }
}

fn pipeline(cfg: &StreamConfig) -> Pipeline<InlineRuntime> {
    let tiles = Arc::new(TileStore::new());
    let mesher = Arc::new(TestMesher {
        tiles: tiles.clone(),
    });
    let rt = InlineRuntime::new(mesher, cfg.blocks_to_process);
    Pipeline::new(cfg, tiles, rt)
}

#[test]
fn chunk_marked_this_tick_is_drawn_this_tick() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(4, 4, 12));
    p.connect(&src);
    src.view(32, 32, 8);
    src.chunks.push_back(terrain_payload(TileCoord::new(32, 32, 7)));
    let mut surface = Recorder::default();
    let stats = p.tick(&mut src, &mut surface);
    assert_eq!(stats.payloads, 1);
    assert_eq!(stats.enqueued, 1);
    assert_eq!(stats.applied, 1);
    assert!(
        surface
            .draws
            .contains(&(ChunkCoord::new(2, 2, 7), BufferClass::Terrain, Visibility::Normal, 0))
    );
    // Empty stencil buffer is not drawn.
    assert!(!surface.draws.iter().any(|d| d.1 == BufferClass::Stencil));
    assert_eq!(surface.visibility_changes, vec![8]);
}

#[test]
fn request_window_is_pushed_only_on_change() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(16, 16, 20));
    p.connect(&src);
    src.view(100, 100, 10);
    let mut surface = Recorder::default();
    p.tick(&mut src, &mut surface);
    p.tick(&mut src, &mut surface);
    assert_eq!(src.pushed.len(), 1);
    assert_eq!(src.pushed[0].min, ChunkCoord::new(2, 2, 5));
    assert_eq!(src.pushed[0].max, ChunkCoord::new(10, 10, 10));
    // Same chunk, different tile: no push.
    src.view(101, 99, 10);
    p.tick(&mut src, &mut surface);
    assert_eq!(src.pushed.len(), 1);
    src.view(140, 100, 10);
    p.tick(&mut src, &mut surface);
    assert_eq!(src.pushed.len(), 2);
}

#[test]
fn request_window_follows_view_off_world_and_back() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(4, 4, 4));
    p.connect(&src);
    src.view(8, 8, 3);
    let mut surface = Recorder::default();
    p.tick(&mut src, &mut surface);
    assert_eq!(src.pushed.len(), 1);

    src.view(5000, 5000, 3);
    src.chunks.push_back(terrain_payload(TileCoord::new(16, 16, 2)));
    let s = p.tick(&mut src, &mut surface);
    assert_eq!(src.pushed.len(), 2);
    let far = src.pushed[1];
    assert_eq!(far.min, ChunkCoord::new(308, 308, far.min.cz));
    assert_eq!(far.max, ChunkCoord::new(316, 316, far.max.cz));
    // Nothing local is in reach, so the dirty chunk stays queued.
    assert!(s.window.is_none());
    assert_eq!(s.enqueued, 0);
    assert_eq!(p.dirty().is_dirty(ChunkCoord::new(1, 1, 2)), (true, false));

    src.view(8, 8, 3);
    let s = p.tick(&mut src, &mut surface);
    assert_eq!(src.pushed.len(), 3);
    assert_eq!(src.pushed[2], src.pushed[0]);
    assert_eq!(s.enqueued, 1);
}

#[test]
fn request_window_reaching_past_edge_is_not_clamped() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(2, 2, 2));
    p.connect(&src);
    src.view(8, 8, 1);
    let s = p.tick(&mut src, &mut Recorder::default());
    let pushed = src.pushed[0];
    assert_eq!(pushed.min.cx, -4);
    assert_eq!(pushed.max.cx, 4);
    let local = s.window.unwrap();
    assert_eq!((local.min.cx, local.max.cx), (0, 1));
}

#[test]
fn payloads_outside_world_are_ignored() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(2, 2, 2));
    p.connect(&src);
    src.chunks.push_back(terrain_payload(TileCoord::new(1000, 0, 0)));
    src.chunks.push_back(terrain_payload(TileCoord::new(0, 0, -1)));
    let stats = p.tick(&mut src, &mut Recorder::default());
    assert_eq!(stats.payloads_ignored, 2);
    assert!(p.tiles().is_empty());
    assert_eq!(p.dirty().pending_count(), 0);
}

#[test]
fn liquid_update_leaves_terrain_buffer_alone() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(2, 2, 4));
    p.connect(&src);
    src.view(8, 8, 2);
    let origin = TileCoord::new(0, 16, 1);
    src.chunks.push_back(terrain_payload(origin));
    let mut surface = Recorder::default();
    p.tick(&mut src, &mut surface);
    let c = origin.chunk();
    let terrain_rev = p.grid().slot(c).unwrap().buffer(BufferClass::Terrain).unwrap().revision();

    src.chunks.push_back(liquid_payload(origin, 3, 7));
    let mut surface = Recorder::default();
    p.tick(&mut src, &mut surface);
    let slot = p.grid().slot(c).unwrap();
    assert_eq!(slot.buffer(BufferClass::Terrain).unwrap().revision(), terrain_rev);
    assert!(!slot.buffer(BufferClass::Water).unwrap().is_empty());
    assert_eq!(slot.lights().len(), 1);
    assert_eq!(surface.lights, 1);
    assert!(surface.draws.contains(&(c, BufferClass::Water, Visibility::Normal, 4)));
    assert!(surface.draws.contains(&(c, BufferClass::Magma, Visibility::Normal, 4)));
}

#[test]
fn layers_above_view_are_suppressed_without_liquids() {
    let mut p = pipeline(&StreamConfig {
        range_z_up: 2,
        blocks_to_process: 4,
        ..Default::default()
    });
    let mut src = FakeSource::new(WorldExtent::new(1, 1, 12));
    p.connect(&src);
    src.view(8, 8, 5);
    let above = TileCoord::new(0, 0, 6);
    src.chunks.push_back(terrain_payload(above));
    src.chunks.push_back(liquid_payload(above, 2, 0));
    let mut surface = Recorder::default();
    p.tick(&mut src, &mut surface);
    let c = above.chunk();
    assert!(surface.draws.contains(&(c, BufferClass::Terrain, Visibility::Suppressed, 0)));
    assert!(!surface.draws.iter().any(|d| d.0 == c && d.1 == BufferClass::Water));
    assert!(!surface.draws.iter().any(|d| d.2 == Visibility::Normal));
}

#[test]
fn overhead_shadows_off_skips_suppressed_pass() {
    let mut p = pipeline(&StreamConfig {
        range_z_up: 2,
        overhead_shadows: false,
        ..Default::default()
    });
    let mut src = FakeSource::new(WorldExtent::new(1, 1, 12));
    p.connect(&src);
    src.view(8, 8, 5);
    src.chunks.push_back(terrain_payload(TileCoord::new(0, 0, 6)));
    let mut surface = Recorder::default();
    let stats = p.tick(&mut src, &mut surface);
    assert_eq!(stats.applied, 1);
    assert!(surface.draws.is_empty());
}

#[test]
fn inline_budget_spreads_work_over_ticks() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(4, 4, 4));
    p.connect(&src);
    src.view(24, 24, 3);
    for cx in 0..3 {
        src.chunks.push_back(terrain_payload(TileCoord::new(cx * 16, 16, 2)));
    }
    let mut surface = Recorder::default();
    let s1 = p.tick(&mut src, &mut surface);
    assert_eq!(s1.enqueued, 3);
    assert_eq!(s1.applied, 1);
    assert_eq!(s1.runtime.pending, 2);
    let s2 = p.tick(&mut src, &mut surface);
    let s3 = p.tick(&mut src, &mut surface);
    assert_eq!(s2.applied + s3.applied, 2);
    assert_eq!(p.grid().resident_count(), 3);
}

#[test]
fn applied_config_changes_inline_budget() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(4, 4, 4));
    p.connect(&src);
    src.view(24, 24, 3);
    for cx in 0..3 {
        src.chunks.push_back(terrain_payload(TileCoord::new(cx * 16, 16, 2)));
    }
    let mut surface = Recorder::default();
    let s1 = p.tick(&mut src, &mut surface);
    assert_eq!(s1.applied, 1);

    p.apply_config(&StreamConfig {
        blocks_to_process: 8,
        ..Default::default()
    });
    let s2 = p.tick(&mut src, &mut surface);
    assert_eq!(s2.applied, 2);
    assert_eq!(s2.runtime.pending, 0);
}

#[test]
fn chunks_outside_window_wait_until_it_moves() {
    let mut p = pipeline(&StreamConfig {
        range_x: 0,
        range_y: 0,
        ..Default::default()
    });
    let mut src = FakeSource::new(WorldExtent::new(4, 1, 2));
    p.connect(&src);
    src.view(8, 8, 1);
    let far = TileCoord::new(48, 0, 0);
    src.chunks.push_back(terrain_payload(far));
    let s = p.tick(&mut src, &mut Recorder::default());
    assert_eq!(s.enqueued, 0);
    assert_eq!(p.dirty().is_dirty(far.chunk()), (true, false));
    src.view(56, 8, 1);
    let s = p.tick(&mut src, &mut Recorder::default());
    assert_eq!(s.enqueued, 1);
    assert_eq!(s.applied, 1);
}

#[test]
fn reset_drops_everything() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(2, 2, 2));
    p.connect(&src);
    src.view(8, 8, 1);
    src.chunks.push_back(terrain_payload(TileCoord::new(0, 0, 0)));
    p.tick(&mut src, &mut Recorder::default());
    assert_eq!(p.grid().resident_count(), 1);
    p.reset(WorldExtent::new(3, 3, 3));
    assert_eq!(p.grid().resident_count(), 0);
    assert!(p.tiles().is_empty());
    assert_eq!(p.grid().extent(), WorldExtent::new(3, 3, 3));
    p.tick(&mut src, &mut Recorder::default());
    assert_eq!(src.pushed.len(), 2);
}

#[test]
fn position_viewpoint_applies_on_next_tick() {
    let mut p = pipeline(&StreamConfig::default());
    let mut src = FakeSource::new(WorldExtent::new(8, 8, 8));
    p.connect(&src);
    src.view(8, 8, 2);
    p.tick(&mut src, &mut Recorder::default());
    p.set_viewpoint_from_position(delve_world::mapper::world_to_render(TileCoord::new(
        100, 100, 4,
    )));
    assert_eq!(src.pushed.len(), 1);
    let mut surface = Recorder::default();
    p.tick(&mut src, &mut surface);
    assert_eq!(src.pushed.len(), 2);
    assert_eq!(p.viewpoint().layer, 5);
    assert_eq!(surface.visibility_changes, vec![5]);
}
