use std::collections::VecDeque;
use std::sync::Arc;

use delve_mesh::MeshBundle;
use delve_world::TileCoord;

use crate::pending::PendingJobs;
use crate::{ChunkMesher, MeshJob, MeshScheduler, RuntimeStats, log_failure, run_job};

/// Builds meshes on the caller's thread during `poll`, at most `budget` per call.
pub struct InlineRuntime {
    mesher: Arc<dyn ChunkMesher>,
    budget: usize,
    pending: PendingJobs,
    completed: VecDeque<MeshBundle>,
    n_completed: usize,
    n_failed: usize,
}

impl InlineRuntime {
    pub fn new(mesher: Arc<dyn ChunkMesher>, budget: usize) -> Self {
        Self {
            mesher,
            budget: budget.max(1),
            pending: PendingJobs::default(),
            completed: VecDeque::new(),
            n_completed: 0,
            n_failed: 0,
        }
    }
}

impl MeshScheduler for InlineRuntime {
    fn enqueue(&mut self, origin: TileCoord, rebuild_terrain: bool, rebuild_liquid: bool) {
        self.pending.push(MeshJob {
            origin,
            terrain: rebuild_terrain,
            liquid: rebuild_liquid,
        });
    }

    fn poll(&mut self) {
        for _ in 0..self.budget {
            let Some(job) = self.pending.pop_front() else {
                break;
            };
            match run_job(self.mesher.as_ref(), &job) {
                Ok(bundle) => {
                    self.n_completed += 1;
                    self.completed.push_back(bundle);
                }
                Err(e) => {
                    self.n_failed += 1;
                    log_failure(&e);
                }
            }
        }
    }

    fn has_completed(&self) -> bool {
        !self.completed.is_empty()
    }

    fn take_completed(&mut self) -> Option<MeshBundle> {
        self.completed.pop_front()
    }

    fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            pending: self.pending.len(),
            queued: 0,
            in_flight: 0,
            completed: self.n_completed,
            failed: self.n_failed,
        }
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
    }

    fn set_budget(&mut self, budget: usize) {
        self.budget = budget.max(1);
    }
}
