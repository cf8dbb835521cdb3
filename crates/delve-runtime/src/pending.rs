use std::collections::VecDeque;

use delve_world::ChunkCoord;
use hashbrown::HashMap;

use crate::MeshJob;

/// FIFO of jobs not yet handed to a worker. A chunk appears at most once; a
/// second request for it OR-s its flags into the queued job.
#[derive(Default)]
pub(crate) struct PendingJobs {
    order: VecDeque<ChunkCoord>,
    jobs: HashMap<ChunkCoord, MeshJob>,
}

impl PendingJobs {
    pub(crate) fn push(&mut self, job: MeshJob) -> bool {
        let coord = job.coord();
        if let Some(queued) = self.jobs.get_mut(&coord) {
            queued.terrain |= job.terrain;
            queued.liquid |= job.liquid;
            return false;
        }
        self.jobs.insert(coord, job);
        self.order.push_back(coord);
        true
    }

    pub(crate) fn pop_front(&mut self) -> Option<MeshJob> {
        while let Some(coord) = self.order.pop_front() {
            if let Some(job) = self.jobs.remove(&coord) {
                return Some(job);
            }
        }
        None
    }

    /// Put a job back at the head without losing flags merged since it was popped.
    pub(crate) fn push_front(&mut self, job: MeshJob) {
        let coord = job.coord();
        match self.jobs.get_mut(&coord) {
            Some(queued) => {
                queued.terrain |= job.terrain;
                queued.liquid |= job.liquid;
            }
            None => {
                self.jobs.insert(coord, job);
                self.order.push_front(coord);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.jobs.clear();
    }
}
