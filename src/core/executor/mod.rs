//! Batched parallel execution over an index range
//!
//! Splits `[0, count)` into contiguous fixed-size batches, runs each batch
//! on a persistent worker pool, and hands the caller a `DispatchHandle`
//! whose `wait` is the fork-join barrier: it returns only once every batch
//! has finished and all kernel writes are visible.

use crate::error::{DeformError, DeformResult};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};

mod pool;

use pool::ThreadPool;

/// Per-index work executed by the batch executor.
///
/// `execute` is invoked exactly once per index per dispatch, from any worker
/// thread, in no guaranteed order. Implementations may only write state that
/// the index exclusively owns (one buffer slot per index); everything else
/// they touch must be read-only for the duration of the dispatch.
pub trait BatchKernel: Send + Sync + 'static {
    /// Validate buffer shapes against the dispatch count before any batch
    /// is scheduled. Runs on the calling thread; a failure here means no
    /// kernel invocation has happened.
    fn validate(&self, count: usize) -> DeformResult<()> {
        let _ = count;
        Ok(())
    }

    /// Process a single index.
    fn execute(&self, index: usize);
}

/// Configuration for the batch executor
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecutorConfig {
    /// Number of worker threads to use (0 = auto-detect)
    pub thread_count: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            thread_count: 0, // Auto-detect
        }
    }
}

/// Shared completion state behind a dispatch handle.
struct DispatchState {
    progress: Mutex<DispatchProgress>,
    barrier: Condvar,
}

struct DispatchProgress {
    remaining: usize,
    fault: Option<String>,
}

impl DispatchState {
    fn new(batch_count: usize) -> Self {
        Self {
            progress: Mutex::new(DispatchProgress {
                remaining: batch_count,
                fault: None,
            }),
            barrier: Condvar::new(),
        }
    }

    /// Mark one batch finished, recording the first fault seen.
    fn complete_batch(&self, fault: Option<String>) {
        let mut progress = self.progress.lock().unwrap();
        progress.remaining -= 1;
        if let Some(message) = fault {
            log::warn!("kernel fault in batch: {message}");
            if progress.fault.is_none() {
                progress.fault = Some(message);
            }
        }
        if progress.remaining == 0 {
            self.barrier.notify_all();
        }
    }
}

/// Synchronization token for one in-flight dispatch.
///
/// Transitions pending -> complete exactly once. `wait` may be called any
/// number of times; after the first return it is immediate.
pub struct DispatchHandle {
    state: Arc<DispatchState>,
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle").finish_non_exhaustive()
    }
}

impl DispatchHandle {
    fn new(batch_count: usize) -> Self {
        Self {
            state: Arc::new(DispatchState::new(batch_count)),
        }
    }

    /// Block until every batch dispatched under this handle has finished.
    ///
    /// Returning `Ok` is a full barrier: all writes performed by the kernel
    /// are visible to the caller. Returns `KernelFault` if any kernel
    /// invocation panicked; the faulted cycle's buffer contents must not be
    /// treated as a valid frame.
    pub fn wait(&self) -> DeformResult<()> {
        let mut progress = self.state.progress.lock().unwrap();
        while progress.remaining > 0 {
            progress = self.state.barrier.wait(progress).unwrap();
        }
        match &progress.fault {
            Some(message) => Err(DeformError::KernelFault(message.clone())),
            None => Ok(()),
        }
    }

    /// Non-blocking completion check.
    pub fn is_complete(&self) -> bool {
        self.state.progress.lock().unwrap().remaining == 0
    }
}

/// Executor that fans batched per-index work out over a worker pool.
///
/// `dispatch` never blocks; the calling thread keeps running until it waits
/// on the returned handle. Batches run concurrently with each other and with
/// the caller. There is no cancellation: once dispatched, batches run to
/// completion; a faulting batch stops at the faulting index and the rest
/// drain (see `DispatchHandle::wait`).
pub struct ParallelBatchExecutor {
    pool: ThreadPool,
}

impl ParallelBatchExecutor {
    /// Create an executor with one worker per logical core.
    pub fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        let thread_count = if config.thread_count == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            config.thread_count
        };

        log::debug!("starting batch executor with {thread_count} worker threads");
        Self {
            pool: ThreadPool::new(thread_count),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.pool.size()
    }

    /// Schedule `kernel.execute(i)` for every `i` in `[0, count)`.
    ///
    /// The range is partitioned into `ceil(count / batch_size)` contiguous
    /// batches; batch `b` covers `[b*batch_size, min((b+1)*batch_size, count))`.
    /// The partition depends only on `count` and `batch_size`, never on the
    /// worker count. A zero `count` returns an already-complete handle.
    ///
    /// The caller must not touch any buffer the kernel writes until `wait`
    /// on the returned handle succeeds, and must not start a second dispatch
    /// over the same writable buffer while this one is outstanding.
    pub fn dispatch<K: BatchKernel>(
        &self,
        count: usize,
        batch_size: usize,
        kernel: K,
    ) -> DeformResult<DispatchHandle> {
        if batch_size == 0 {
            return Err(DeformError::invalid_argument("batch size must be >= 1"));
        }
        kernel.validate(count)?;

        let batch_count = (count + batch_size - 1) / batch_size;
        let handle = DispatchHandle::new(batch_count);
        if batch_count == 0 {
            return Ok(handle);
        }

        log::debug!("dispatching {count} indices as {batch_count} batches of {batch_size}");

        let kernel = Arc::new(kernel);
        for batch in 0..batch_count {
            let (start, end) = batch_span(batch, batch_size, count);
            let kernel = Arc::clone(&kernel);
            let state = Arc::clone(&handle.state);

            let submitted = self.pool.execute(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    for index in start..end {
                        kernel.execute(index);
                    }
                }));
                state.complete_batch(outcome.err().map(panic_message));
            });

            if submitted.is_err() {
                // Queue closed underneath us; release waiters for every
                // batch that will never run, this one included.
                for _ in batch..batch_count {
                    handle
                        .state
                        .complete_batch(Some("worker pool is shut down".to_string()));
                }
                return Err(DeformError::PoolShutdown);
            }
        }

        Ok(handle)
    }

    /// Block on a handle produced by `dispatch`. Equivalent to
    /// `handle.wait()`.
    pub fn wait(&self, handle: &DispatchHandle) -> DeformResult<()> {
        handle.wait()
    }
}

impl Default for ParallelBatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds of batch `batch`: a pure function of `count` and `batch_size`,
/// independent of the worker count.
fn batch_span(batch: usize, batch_size: usize, count: usize) -> (usize, usize) {
    let start = batch * batch_size;
    (start, usize::min(start + batch_size, count))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "kernel panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_bounds(count: usize, batch_size: usize) -> Vec<(usize, usize)> {
        let batch_count = (count + batch_size - 1) / batch_size;
        (0..batch_count)
            .map(|b| batch_span(b, batch_size, count))
            .collect()
    }

    #[test]
    fn test_partition_covers_range_without_overlap() {
        for (count, batch_size) in [(10, 3), (64, 64), (65, 64), (1, 100), (7, 1)] {
            let bounds = batch_bounds(count, batch_size);
            assert_eq!(bounds.first().map(|b| b.0), Some(0));
            assert_eq!(bounds.last().map(|b| b.1), Some(count));
            for pair in bounds.windows(2) {
                assert_eq!(pair[0].1, pair[1].0);
            }
            assert!(bounds[..bounds.len() - 1]
                .iter()
                .all(|(s, e)| e - s == batch_size));
        }
    }

    #[test]
    fn test_partition_tail_batch() {
        let bounds = batch_bounds(65, 64);
        assert_eq!(bounds, vec![(0, 64), (64, 65)]);
    }

    #[test]
    fn test_config_default_is_auto_detect() {
        assert_eq!(ExecutorConfig::default().thread_count, 0);
        let executor = ParallelBatchExecutor::with_config(ExecutorConfig { thread_count: 3 });
        assert_eq!(executor.thread_count(), 3);
    }
}
