use std::sync::Arc;
use std::time::Instant;

use delve_geom::Vec3;
use delve_runtime::{MeshScheduler, RuntimeStats};
use delve_world::{TileStore, WorldExtent};

use crate::compositor::{CompositeStats, Compositor, RenderSurface};
use crate::config::StreamConfig;
use crate::dirty::DirtyTracker;
use crate::grid::ChunkGrid;
use crate::upstream::UpstreamSource;
use crate::window::{ChunkWindow, Viewpoint, WindowTracker};

#[derive(Clone, Copy, Debug, Default)]
pub struct TickStats {
    pub tick: u64,
    pub view_updates: usize,
    pub payloads: usize,
    pub payloads_ignored: usize,
    pub window: Option<ChunkWindow>,
    pub window_pushed: bool,
    pub enqueued: usize,
    pub applied: usize,
    pub composite: CompositeStats,
    pub runtime: RuntimeStats,
    pub t_ingest_ms: f32,
    pub t_mesh_ms: f32,
    pub t_composite_ms: f32,
}

/// All streaming state for one viewer: the window, dirty planes, render grid and
/// the mesh scheduler feeding it. Drive it with [`Pipeline::tick`] once per frame.
pub struct Pipeline<S: MeshScheduler> {
    tracker: WindowTracker,
    dirty: DirtyTracker,
    grid: ChunkGrid,
    compositor: Compositor,
    tiles: Arc<TileStore>,
    scheduler: S,
    ticks: u64,
}

impl<S: MeshScheduler> Pipeline<S> {
    /// Starts with an empty extent; call [`Pipeline::connect`] before ticking.
    pub fn new(config: &StreamConfig, tiles: Arc<TileStore>, scheduler: S) -> Self {
        let extent = WorldExtent::default();
        Self {
            tracker: WindowTracker::new(config.ranges()),
            dirty: DirtyTracker::new(extent),
            grid: ChunkGrid::new(extent),
            compositor: Compositor::new(config.camera_view_dist, config.overhead_shadows),
            tiles,
            scheduler,
            ticks: 0,
        }
    }

    /// Size everything from the source's declared extent.
    pub fn connect<U: UpstreamSource + ?Sized>(&mut self, upstream: &U) {
        self.reset(upstream.world_extent());
    }

    /// Drop all geometry, dirty bits, stored tiles and queued jobs, and resize to
    /// `extent`. Jobs already with a worker still complete and are applied if they
    /// land inside the new extent.
    pub fn reset(&mut self, extent: WorldExtent) {
        log::info!(
            target: "stream",
            "reset to {}x{}x{} chunks",
            extent.chunks_x,
            extent.chunks_y,
            extent.layers
        );
        self.dirty.reset(extent);
        self.grid.resize(extent);
        self.tiles.reset();
        self.scheduler.clear_pending();
        self.tracker.forget_pushed();
        self.tracker.mark_viewpoint_dirty();
    }

    pub fn apply_config(&mut self, config: &StreamConfig) {
        self.tracker.set_ranges(config.ranges());
        self.compositor.camera_view_dist = config.camera_view_dist;
        self.compositor.overhead_shadows = config.overhead_shadows;
        self.scheduler.set_budget(config.blocks_to_process);
        log::info!(
            target: "stream",
            "config applied: ranges {:?}, view dist {}, overhead shadows {}, budget {}",
            config.ranges(),
            config.camera_view_dist,
            config.overhead_shadows,
            config.blocks_to_process
        );
    }

    /// Takes effect on the next tick.
    pub fn set_viewpoint_from_position(&mut self, p: Vec3) {
        self.tracker.set_viewpoint_from_position(p);
    }

    pub fn tick<U, R>(&mut self, upstream: &mut U, surface: &mut R) -> TickStats
    where
        U: UpstreamSource + ?Sized,
        R: RenderSurface + ?Sized,
    {
        self.ticks += 1;
        let mut stats = TickStats {
            tick: self.ticks,
            ..Default::default()
        };
        let extent = self.grid.extent();

        let t0 = Instant::now();
        while let Some(update) = upstream.pop_view_update() {
            self.tracker.set_viewpoint_from_upstream(&update);
            stats.view_updates += 1;
        }

        // Upstream gets the unclamped box; only draining is limited to the extent.
        let requested = self.tracker.current_window();
        if self.tracker.note_pushed(requested) {
            log::debug!(
                target: "stream",
                "request window {:?}..={:?}",
                requested.min,
                requested.max
            );
            upstream.set_request_window(requested);
            stats.window_pushed = true;
        }
        let window = requested.clamp(extent);
        stats.window = window;

        while let Some(payload) = upstream.pop_chunk_update() {
            let coord = payload.origin.chunk();
            if !extent.contains(coord) {
                stats.payloads_ignored += 1;
                log::trace!(target: "stream", "payload {:?} outside world, ignored", coord);
                continue;
            }
            stats.payloads += 1;
            self.tiles.store(&payload);
            if payload.has_terrain() {
                self.dirty.mark_terrain_dirty(coord);
            }
            if payload.has_liquid() {
                self.dirty.mark_liquid_dirty(coord);
            }
        }
        stats.t_ingest_ms = t0.elapsed().as_secs_f32() * 1000.0;

        let t1 = Instant::now();
        if let Some(w) = window {
            for d in self.dirty.drain_dirty(w) {
                self.scheduler.enqueue(d.coord.origin(), d.terrain, d.liquid);
                stats.enqueued += 1;
            }
        }
        self.scheduler.poll();
        while let Some(bundle) = self.scheduler.take_completed() {
            if self.grid.apply(&bundle) {
                self.tracker.mark_viewpoint_dirty();
            }
            stats.applied += 1;
        }
        stats.runtime = self.scheduler.stats();
        stats.t_mesh_ms = t1.elapsed().as_secs_f32() * 1000.0;

        let t2 = Instant::now();
        stats.composite = self
            .compositor
            .composite(&self.grid, self.tracker.viewpoint_mut(), surface);
        stats.t_composite_ms = t2.elapsed().as_secs_f32() * 1000.0;

        log::trace!(
            target: "stream",
            "[tick {}] views={} payloads={} enqueued={} applied={} draws={}",
            stats.tick,
            stats.view_updates,
            stats.payloads,
            stats.enqueued,
            stats.applied,
            stats.composite.submissions()
        );
        stats
    }

    #[inline]
    pub fn viewpoint(&self) -> Viewpoint {
        self.tracker.viewpoint()
    }

    #[inline]
    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    #[inline]
    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    #[inline]
    pub fn tiles(&self) -> &Arc<TileStore> {
        &self.tiles
    }

    #[inline]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
