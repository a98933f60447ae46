use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::core::error::{Error, ErrorKind, Result};

/// Fixed-size rayon pool owned by the orchestrator.
///
/// Work runs on the pool's own threads, never the global rayon pool, so
/// the domain fan-out and batch fan-out are bounded independently.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    pub workers: usize,
    pub progress: Arc<AtomicUsize>,
}

impl WorkerPool {
    pub fn new(name: &'static str, workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("{}-{}", name, i))
            .build()
            .map_err(|e| Error::new(
                ErrorKind::Internal,
                format!("Failed to build {} pool: {}", name, e),
            ))?;

        Ok(WorkerPool {
            pool,
            workers,
            progress: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn get_progress(&self) -> usize {
        self.progress.load(Ordering::Relaxed)
    }

    /// Run both closures on the pool, potentially in parallel.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        self.pool.join(a, b)
    }

    /// Apply `f` to every item on the pool, keeping input order.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        self.progress.store(0, Ordering::Relaxed);
        self.pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let result = f(item);
                    self.progress.fetch_add(1, Ordering::Relaxed);
                    result
                })
                .collect()
        })
    }
}
