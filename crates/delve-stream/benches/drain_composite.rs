use criterion::{Criterion, black_box, criterion_group, criterion_main};

use delve_geom::Vec3;
use delve_mesh::{BufferClass, Face, MeshBundle, MeshData};
use delve_stream::{
    ChunkGrid, ChunkWindow, Compositor, DirtyTracker, DrawSubmission, RenderSurface, Viewpoint,
};
use delve_world::{ChunkCoord, WorldExtent};

struct Sink(usize);

impl RenderSurface for Sink {
    fn submit(&mut self, d: DrawSubmission<'_>) {
        self.0 += d.buffer.triangle_count();
    }
}

fn window_for(e: WorldExtent) -> ChunkWindow {
    ChunkWindow::new(
        ChunkCoord::new(0, 0, 0),
        ChunkCoord::new(e.chunks_x as i32 - 1, e.chunks_y as i32 - 1, e.layers as i32 - 1),
    )
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_dirty");
    let e = WorldExtent::new(16, 16, 64);
    group.bench_function("16x16x64_every_4th", |b| {
        let mut d = DirtyTracker::new(e);
        b.iter(|| {
            for coord in window_for(e).iter().step_by(4) {
                d.mark_terrain_dirty(coord);
            }
            let n = d.drain_dirty(window_for(e)).count();
            black_box(n);
        })
    });
    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");
    let e = WorldExtent::new(9, 9, 40);
    let mut grid = ChunkGrid::new(e);
    let mut data = MeshData::default();
    for i in 0..64 {
        data.add_face_rect(Face::PosY, Vec3::new(i as f32, 0.0, 0.0), 2.0, 2.0, [128; 4]);
    }
    for coord in window_for(e).iter() {
        let mut b = MeshBundle::new(coord.origin());
        for class in BufferClass::ALL {
            b.set_payload(class, data.clone());
        }
        grid.apply(&b);
    }
    let comp = Compositor::default();
    group.bench_function("9x9x40_layer_20", |b| {
        b.iter(|| {
            let mut view = Viewpoint {
                x: 72,
                y: 72,
                layer: 20,
                dirty: false,
            };
            let mut sink = Sink(0);
            let stats = comp.composite(&grid, &mut view, &mut sink);
            black_box((stats, sink.0));
        })
    });
    group.finish();
}

criterion_group!(benches, bench_drain, bench_composite);
criterion_main!(benches);
