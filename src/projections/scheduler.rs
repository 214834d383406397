//! scheduler — caller-scoped worker pool for per-shock tasks.
//!
//! Purpose
//! -------
//! Run one independent task per structural shock on a `rayon` pool created
//! for the current estimation call, and return the task results ordered by
//! shock index.
//!
//! Key behaviors
//! -------------
//! - [`ShockPool::new`] sizes the pool as `num_threads` when given, otherwise
//!   `min(#shocks, available_parallelism)`; the pool is dropped with the
//!   `ShockPool` on every exit path.
//! - [`ShockPool::scatter`] runs `task(shock)` for every shock and collects
//!   `Vec<LPResult<T>>` in shock order, never in completion order.
//! - A failing task never aborts its siblings; each failure is logged at
//!   `warn` level and returned in its slot.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tasks borrow shared inputs immutably (`Fn + Sync`); no task mutates
//!   shared state.
//! - No cancellation and no timeouts.
use crate::projections::errors::{LPError, LPResult};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use std::thread;

/// ShockPool — `rayon` pool scoped to one estimation call.
#[derive(Debug)]
pub struct ShockPool {
    pool: ThreadPool,
    nshocks: usize,
}

impl ShockPool {
    /// Build a pool for `nshocks` tasks.
    ///
    /// # Errors
    /// - [`LPError::ThreadPool`] if the pool cannot be created.
    pub fn new(nshocks: usize, num_threads: Option<usize>) -> LPResult<ShockPool> {
        let threads = match num_threads {
            Some(threads) => threads.max(1),
            None => {
                let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
                nshocks.clamp(1, cores.max(1))
            }
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("lp-shock-{idx}"))
            .build()
            .map_err(|err| LPError::ThreadPool(err.to_string()))?;
        log::debug!("local projections: {nshocks} shock task(s) on {threads} worker thread(s)");
        Ok(ShockPool { pool, nshocks })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` for every shock index and gather the results by index.
    pub fn scatter<T, F>(&self, task: F) -> Vec<LPResult<T>>
    where
        T: Send,
        F: Fn(usize) -> LPResult<T> + Sync,
    {
        let outcomes: Vec<LPResult<T>> =
            self.pool.install(|| (0..self.nshocks).into_par_iter().map(&task).collect());
        for (shock, outcome) in outcomes.iter().enumerate() {
            if let Err(err) = outcome {
                log::warn!("local projections: shock {shock} failed: {err}");
            }
        }
        outcomes
    }
}
