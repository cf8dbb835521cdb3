use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use delve_mesh::MeshBundle;
use delve_world::{ChunkCoord, TileCoord};
use hashbrown::HashSet;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::pending::PendingJobs;
use crate::{
    ChunkMesher, MeshError, MeshJob, MeshScheduler, RuntimeStats, log_failure, run_job,
};

struct JobOut {
    coord: ChunkCoord,
    result: Result<MeshBundle, MeshError>,
}

/// Worker pool fed through a bounded job channel.
///
/// At most one job per chunk is with the workers at a time, so results for the
/// same chunk always arrive in request order.
pub struct Runtime {
    job_tx: Option<Sender<MeshJob>>,
    res_rx: Receiver<JobOut>,
    _pool: Option<Arc<ThreadPool>>,
    pending: PendingJobs,
    dispatched: HashSet<ChunkCoord>,
    completed: VecDeque<MeshBundle>,
    q_jobs: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    n_completed: usize,
    n_failed: usize,
    pub workers: usize,
}

impl Runtime {
    pub fn new(mesher: Arc<dyn ChunkMesher>, workers: usize, queue_capacity: usize) -> Self {
        let workers = workers.max(1);
        let (job_tx, job_rx) = bounded::<MeshJob>(queue_capacity.max(1));
        let (res_tx, res_rx) = unbounded::<JobOut>();
        let q_jobs = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("delve-mesh-{i}"))
                .build()
                .expect("mesh pool"),
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let mesher = mesher.clone();
            let q_jobs = q_jobs.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    q_jobs.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    let result = run_job(mesher.as_ref(), &job);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                    if tx
                        .send(JobOut {
                            coord: job.coord(),
                            result,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }

        Self {
            job_tx: Some(job_tx),
            res_rx,
            _pool: Some(pool),
            pending: PendingJobs::default(),
            dispatched: HashSet::new(),
            completed: VecDeque::new(),
            q_jobs,
            inflight,
            n_completed: 0,
            n_failed: 0,
            workers,
        }
    }

    /// Close the job channel; workers exit once they finish their current job.
    pub fn terminate(&mut self) {
        if self.job_tx.take().is_some() {
            log::debug!(target: "runtime", "mesh runtime terminated");
        }
        self.pending.clear();
    }

    fn dispatch_pending(&mut self) {
        let Some(tx) = self.job_tx.as_ref() else {
            return;
        };
        let mut held: Vec<MeshJob> = Vec::new();
        while let Some(job) = self.pending.pop_front() {
            let coord = job.coord();
            if self.dispatched.contains(&coord) {
                held.push(job);
                continue;
            }
            self.q_jobs.fetch_add(1, Ordering::Relaxed);
            match tx.try_send(job) {
                Ok(()) => {
                    self.dispatched.insert(coord);
                }
                Err(TrySendError::Full(job)) => {
                    self.q_jobs.fetch_sub(1, Ordering::Relaxed);
                    self.pending.push_front(job);
                    break;
                }
                Err(TrySendError::Disconnected(job)) => {
                    self.q_jobs.fetch_sub(1, Ordering::Relaxed);
                    log::warn!(target: "runtime", "mesh workers gone; keeping {:?} pending", job.coord());
                    self.pending.push_front(job);
                    break;
                }
            }
        }
        // Chunks still with a worker go back in their original order.
        for job in held.into_iter().rev() {
            self.pending.push_front(job);
        }
    }

    fn collect_results(&mut self) {
        for out in self.res_rx.try_iter() {
            self.dispatched.remove(&out.coord);
            match out.result {
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
}

impl MeshScheduler for Runtime {
    fn enqueue(&mut self, origin: TileCoord, rebuild_terrain: bool, rebuild_liquid: bool) {
        self.pending.push(MeshJob {
            origin,
            terrain: rebuild_terrain,
            liquid: rebuild_liquid,
        });
    }

    fn poll(&mut self) {
        self.collect_results();
        self.dispatch_pending();
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
            queued: self.q_jobs.load(Ordering::Relaxed),
            in_flight: self.inflight.load(Ordering::Relaxed),
            completed: self.n_completed,
            failed: self.n_failed,
        }
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.terminate();
    }
}
