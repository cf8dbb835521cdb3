//! Mesh job scheduling: a threaded worker pool and an inline fallback behind one
//! non-blocking enqueue/poll/take contract.
#![forbid(unsafe_code)]

mod inline;
mod pending;
mod pool;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use delve_mesh::MeshBundle;
use delve_world::{ChunkCoord, TileCoord};
use thiserror::Error;

pub use inline::InlineRuntime;
pub use pool::Runtime;

/// Rebuild request for one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshJob {
    pub origin: TileCoord,
    pub terrain: bool,
    pub liquid: bool,
}

impl MeshJob {
    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.origin.chunk()
    }
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("no tile data for chunk {0:?}")]
    MissingData(ChunkCoord),
    #[error("mesher failed for chunk {coord:?}: {reason}")]
    Failed { coord: ChunkCoord, reason: String },
    #[error("mesher panicked on chunk {coord:?}: {reason}")]
    Panicked { coord: ChunkCoord, reason: String },
}

/// Builds the geometry for one chunk. Runs on worker threads.
pub trait ChunkMesher: Send + Sync {
    fn build(&self, job: &MeshJob) -> Result<MeshBundle, MeshError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub pending: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Contract between the per-tick driver and whatever builds meshes.
///
/// None of these calls may block. A job that fails is dropped and counted; no
/// result is delivered for it.
pub trait MeshScheduler {
    fn enqueue(&mut self, origin: TileCoord, rebuild_terrain: bool, rebuild_liquid: bool);
    fn poll(&mut self);
    fn has_completed(&self) -> bool;
    fn take_completed(&mut self) -> Option<MeshBundle>;
    fn stats(&self) -> RuntimeStats;
    /// Forget work not yet handed to a worker.
    fn clear_pending(&mut self);
    /// Jobs built per `poll` by schedulers that mesh on the caller's thread.
    /// Pooled schedulers ignore it.
    fn set_budget(&mut self, _budget: usize) {}
}

impl<S: MeshScheduler + ?Sized> MeshScheduler for Box<S> {
    fn enqueue(&mut self, origin: TileCoord, rebuild_terrain: bool, rebuild_liquid: bool) {
        (**self).enqueue(origin, rebuild_terrain, rebuild_liquid)
    }
    fn poll(&mut self) {
        (**self).poll()
    }
    fn has_completed(&self) -> bool {
        (**self).has_completed()
    }
    fn take_completed(&mut self) -> Option<MeshBundle> {
        (**self).take_completed()
    }
    fn stats(&self) -> RuntimeStats {
        (**self).stats()
    }
    fn clear_pending(&mut self) {
        (**self).clear_pending()
    }
    fn set_budget(&mut self, budget: usize) {
        (**self).set_budget(budget)
    }
}

/// Pick the threaded pool, or the inline runtime when `threads` is zero.
pub fn build_scheduler(
    mesher: Arc<dyn ChunkMesher>,
    threads: usize,
    inline_budget: usize,
    queue_capacity: usize,
) -> Box<dyn MeshScheduler + Send> {
    if threads == 0 {
        log::info!(target: "runtime", "meshing inline, {} job(s) per poll", inline_budget.max(1));
        Box::new(InlineRuntime::new(mesher, inline_budget))
    } else {
        log::info!(target: "runtime", "meshing on {} worker(s), queue capacity {}", threads, queue_capacity);
        Box::new(Runtime::new(mesher, threads, queue_capacity))
    }
}

pub(crate) fn run_job(mesher: &dyn ChunkMesher, job: &MeshJob) -> Result<MeshBundle, MeshError> {
    match panic::catch_unwind(AssertUnwindSafe(|| mesher.build(job))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(MeshError::Panicked {
                coord: job.coord(),
                reason,
            })
        }
    }
}

pub(crate) fn log_failure(err: &MeshError) {
    match err {
        MeshError::MissingData(_) => log::debug!(target: "runtime", "{}", err),
        _ => log::warn!(target: "runtime", "dropping mesh job: {}", err),
    }
}
