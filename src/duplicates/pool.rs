//! Bounded worker pool used by the hashing phases.
//!
//! # Overview
//!
//! [`WorkerPool::run`] pushes every work item through a bounded
//! `crossbeam-channel` queue to a fixed number of worker threads. Each
//! worker computes one `Result` per item and sends it, together with the
//! item, over a second bounded channel to the aggregator, which is the
//! calling thread. The aggregator is the only writer of the output, so the
//! merge closure needs no synchronisation.
//!
//! All threads live inside a [`std::thread::scope`], which makes `run` a
//! barrier: it returns only after the producer and every worker have exited
//! and all results have been merged.
//!
//! # Cancellation
//!
//! The shutdown flag is checked by the producer before each hand-off and by
//! workers after each dequeue. An item already being processed is always
//! finished. Items dequeued after the flag is set are discarded without I/O.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;

/// Default capacity of the work and result queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Number of workers to use when none is configured.
///
/// Falls back to 1 when the host parallelism cannot be determined.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Counters describing one pool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolOutcome {
    /// Items handed to the pool
    pub submitted: usize,
    /// Items whose job returned `Ok`
    pub succeeded: usize,
    /// Items whose job returned `Err`
    pub failed: usize,
    /// Items never processed because shutdown was requested
    pub skipped: usize,
    /// Whether the shutdown flag was set when the barrier completed
    pub interrupted: bool,
}

/// A fixed-size pool of worker threads behind a bounded queue.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    queue_capacity: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

impl WorkerPool {
    /// Create a pool with `workers` threads (at least one).
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_flag: None,
        }
    }

    /// Set the capacity of the work and result queues (at least one).
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Option<Arc<AtomicBool>>) -> Self {
        self.shutdown_flag = flag;
        self
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Capacity of each bounded queue.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Run `job` over every item and feed each outcome to `merge`.
    ///
    /// `job` runs concurrently on the worker threads. `merge` runs on the
    /// calling thread, once per processed item, in completion order.
    ///
    /// # Example
    ///
    /// ```
    /// use dupecheck::duplicates::WorkerPool;
    ///
    /// let mut total = 0u64;
    /// let outcome = WorkerPool::new(4).run(
    ///     (1..=10u64).collect(),
    ///     |n: &u64| if n % 5 == 0 { Err("multiple of five") } else { Ok(n * 2) },
    ///     |_, result| {
    ///         if let Ok(doubled) = result {
    ///             total += doubled;
    ///         }
    ///     },
    /// );
    ///
    /// assert_eq!(total, 80);
    /// assert_eq!(outcome.succeeded, 8);
    /// assert_eq!(outcome.failed, 2);
    /// ```
    pub fn run<W, R, E, F, M>(&self, items: Vec<W>, job: F, mut merge: M) -> PoolOutcome
    where
        W: Send,
        R: Send,
        E: Send,
        F: Fn(&W) -> Result<R, E> + Sync,
        M: FnMut(W, Result<R, E>),
    {
        let mut outcome = PoolOutcome {
            submitted: items.len(),
            ..Default::default()
        };
        if items.is_empty() {
            outcome.interrupted = self.is_shutdown_requested();
            return outcome;
        }

        let workers = self.workers.min(items.len());
        log::debug!(
            "Pool: {} items, {} workers, queue capacity {}",
            items.len(),
            workers,
            self.queue_capacity
        );

        thread::scope(|scope| {
            let (work_tx, work_rx) = bounded::<W>(self.queue_capacity);
            let (result_tx, result_rx) = bounded::<(W, Result<R, E>)>(self.queue_capacity);

            scope.spawn(move || {
                for item in items {
                    if self.is_shutdown_requested() {
                        log::debug!("Pool: Shutdown requested, no more work queued");
                        break;
                    }
                    if work_tx.send(item).is_err() {
                        break;
                    }
                }
            });

            let job = &job;
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for item in work_rx.iter() {
                        if self.is_shutdown_requested() {
                            continue;
                        }
                        let result = job(&item);
                        if result_tx.send((item, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(work_rx);
            drop(result_tx);

            for (item, result) in result_rx.iter() {
                if result.is_ok() {
                    outcome.succeeded += 1;
                } else {
                    outcome.failed += 1;
                }
                merge(item, result);
            }
        });

        outcome.skipped = outcome.submitted - outcome.succeeded - outcome.failed;
        outcome.interrupted = self.is_shutdown_requested();
        outcome
    }
}
