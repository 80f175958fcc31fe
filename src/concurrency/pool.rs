//! Fixed-size worker pool with wave (superstep) execution.
//!
//! A wave hands every task a `&mut` to its own state, runs all of them on the
//! pool, and returns only when the last one has finished. The join is the only
//! suspension point; tasks never block on each other inside a wave.

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::KCoreError;

/// A dedicated pool of `concurrency` worker threads.
pub struct WorkerPool {
    pool: ThreadPool,
    concurrency: usize,
}

impl WorkerPool {
    /// Starts `concurrency` named workers.
    pub fn new(concurrency: usize) -> Result<Self, KCoreError> {
        if concurrency == 0 {
            return Err(KCoreError::InvalidConcurrency);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|i| format!("kcore-worker-{i}"))
            .build()
            .map_err(|e| KCoreError::ThreadPool(e.to_string()))?;
        Ok(Self { pool, concurrency })
    }

    /// Number of worker threads.
    #[inline]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs `work` once per task, in parallel, and waits for all of them.
    pub fn wave<T, F>(&self, tasks: &mut [T], work: F)
    where
        T: Send,
        F: Fn(&mut T) + Sync,
    {
        let work = &work;
        self.pool.scope(|scope| {
            for task in tasks.iter_mut() {
                scope.spawn(move |_| work(task));
            }
        });
    }

    /// Runs `f` inside the pool so rayon parallel iterators use its workers.
    pub fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(f)
    }
}

impl core::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
