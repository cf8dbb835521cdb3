mod config;
mod mesher;
mod sim;
mod surface;
mod watchers;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use delve_mesh::BufferClass;
use delve_runtime::{MeshScheduler, build_scheduler};
use delve_stream::{Pipeline, Visibility};
use delve_world::TileStore;

use crate::config::{AppConfig, load_app_config};
use crate::mesher::FlatMesher;
use crate::sim::SyntheticWorld;
use crate::surface::TallySurface;
use crate::watchers::ConfigWatcher;

#[derive(Parser, Debug)]
#[command(name = "delve", about = "Headless chunk streaming driver over a synthetic world")]
struct Args {
    /// TOML config with [stream] and [sim] sections
    #[arg(long, default_value = "assets/delve.toml")]
    config: PathBuf,
    /// Ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// World size in chunks along x and y
    #[arg(long, default_value_t = 24)]
    world_size: usize,
    /// Override meshing_threads (0 = inline)
    #[arg(long)]
    threads: Option<usize>,
    /// Reload the config file when it changes
    #[arg(long, default_value_t = false)]
    watch_config: bool,
    /// Sleep between ticks, in milliseconds
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = if args.config.exists() {
        load_app_config(&args.config)?
    } else {
        log::warn!("config {} not found; using defaults", args.config.display());
        AppConfig::default()
    };
    if let Some(t) = args.threads {
        cfg.stream.meshing_threads = t;
    }

    let tiles = Arc::new(TileStore::new());
    let mesher = Arc::new(FlatMesher::new(tiles.clone()));
    let scheduler = build_scheduler(
        mesher,
        cfg.stream.meshing_threads,
        cfg.stream.blocks_to_process,
        cfg.stream.job_queue_capacity,
    );
    let mut pipeline = Pipeline::new(&cfg.stream, tiles, scheduler);
    let mut world = SyntheticWorld::new(args.world_size, args.world_size, cfg.sim.clone());
    pipeline.connect(&world);

    let watcher = args
        .watch_config
        .then(|| ConfigWatcher::spawn(&args.config));
    let mut surface = TallySurface::new();
    let started = Instant::now();
    let (mut payloads, mut applied, mut pushes) = (0usize, 0usize, 0usize);
    let mut mesh_ms = 0.0f32;

    for _ in 0..args.ticks {
        if let Some(new_cfg) = watcher.as_ref().and_then(|w| w.poll()) {
            if new_cfg.stream.meshing_threads != cfg.stream.meshing_threads {
                log::info!("meshing_threads change takes effect on restart");
            }
            pipeline.apply_config(&new_cfg.stream);
            cfg = new_cfg;
        }
        surface.begin_frame();
        world.step();
        let stats = pipeline.tick(&mut world, &mut surface);
        payloads += stats.payloads;
        applied += stats.applied;
        pushes += stats.window_pushed as usize;
        mesh_ms += stats.t_mesh_ms;
        if stats.tick % 60 == 0 {
            let vp = pipeline.viewpoint();
            log::info!(
                "[tick {}] view=({}, {}, {}) resident={} dirty={} pending={} queued={} draws={} tris={} lights={}",
                stats.tick,
                vp.x,
                vp.y,
                vp.layer,
                pipeline.grid().resident_count(),
                pipeline.dirty().pending_count(),
                stats.runtime.pending,
                stats.runtime.queued,
                stats.composite.submissions(),
                stats.composite.triangles,
                stats.composite.lights,
            );
        }
        if args.tick_ms > 0 {
            std::thread::sleep(Duration::from_millis(args.tick_ms));
        }
    }

    let rt = pipeline.scheduler().stats();
    log::info!(
        "{} ticks in {:.2?}: {} payloads, {} bundles applied, {} window pushes, {:.1} ms meshing on tick thread",
        pipeline.ticks(),
        started.elapsed(),
        payloads,
        applied,
        pushes,
        mesh_ms
    );
    log::info!(
        "runtime: completed={} failed={} in_flight={}; last frame terrain={} suppressed={} water={} magma={}",
        rt.completed,
        rt.failed,
        rt.in_flight,
        surface.count(BufferClass::Terrain, Visibility::Normal),
        surface.count(BufferClass::Terrain, Visibility::Suppressed),
        surface.count(BufferClass::Water, Visibility::Normal),
        surface.count(BufferClass::Magma, Visibility::Normal),
    );
    log::info!(
        "surface: {} triangles, {} lights, {} visibility changes (last layer {:?}); source sent {} chunk(s), {} waiting",
        surface.triangles,
        surface.lights,
        surface.visibility_changes,
        surface.last_layer,
        world.sent_count(),
        world.backlog_len(),
    );
    Ok(())
}
