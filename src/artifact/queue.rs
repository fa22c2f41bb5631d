//! Queues that run the units of work of a visit.

use std::sync::{Mutex, PoisonError};

use threadpool::ThreadPool;

/// One unit of work submitted during a visit.
pub type BuildOperation = Box<dyn FnOnce() + Send + 'static>;

/// Runs submitted operations, possibly in parallel.
pub trait BuildOperationQueue: Send + Sync {
    fn submit(&self, operation: BuildOperation);
}

/// Runs each operation on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineQueue;

impl BuildOperationQueue for InlineQueue {
    fn submit(&self, operation: BuildOperation) {
        operation()
    }
}

/// Runs operations on a fixed pool of worker threads.
///
/// Dropping the queue waits for every submitted operation to finish.
pub struct WorkerPoolQueue {
    pool: Mutex<ThreadPool>,
}

impl WorkerPoolQueue {
    pub fn new(workers: usize) -> Self {
        Self {
            pool: Mutex::new(ThreadPool::with_name(
                "artres-worker".to_string(),
                workers.max(1),
            )),
        }
    }

    pub fn workers(&self) -> usize {
        self.pool().max_count()
    }

    /// Block until every submitted operation has run.
    pub fn join(&self) {
        let pool = self.pool().clone();
        pool.join();
    }

    fn pool(&self) -> std::sync::MutexGuard<'_, ThreadPool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BuildOperationQueue for WorkerPoolQueue {
    fn submit(&self, operation: BuildOperation) {
        self.pool().execute(operation);
    }
}

impl Drop for WorkerPoolQueue {
    fn drop(&mut self) {
        let pool = self.pool.get_mut().unwrap_or_else(PoisonError::into_inner);
        pool.join();
        if pool.panic_count() > 0 {
            tracing::warn!(panics = pool.panic_count(), "build operations panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_inline_queue_runs_immediately() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        InlineQueue.submit(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_worker_pool_runs_everything_before_drop_returns() {
        let ran = Arc::new(AtomicUsize::new(0));
        {
            let queue = WorkerPoolQueue::new(4);
            assert_eq!(queue.workers(), 4);
            for _ in 0..50 {
                let counter = ran.clone();
                queue.submit(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }
        assert_eq!(ran.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_zero_workers_means_one() {
        assert_eq!(WorkerPoolQueue::new(0).workers(), 1);
    }
}
