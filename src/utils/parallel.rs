//! Parallel processing utilities

use crate::error::{DatathonError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Number of threads (None = use all available)
    pub n_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an `n_jobs` count onto a configuration; 0 means all cores
    pub fn from_n_jobs(n_jobs: usize) -> Self {
        Self {
            n_threads: (n_jobs > 0).then_some(n_jobs),
        }
    }

    /// Set number of threads
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self
    }

    /// Get the number of threads to use
    pub fn num_threads(&self) -> usize {
        self.n_threads.unwrap_or_else(rayon::current_num_threads)
    }
}

/// Fallible parallel map on a dedicated pool; output order follows `items`
pub fn try_parallel_map<T, U, F>(items: Vec<T>, config: &ParallelConfig, f: F) -> Result<Vec<U>>
where
    T: Send,
    U: Send,
    F: Fn(T) -> Result<U> + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads())
        .build()
        .map_err(|e| DatathonError::ThreadPoolError(e.to_string()))?;

    pool.install(|| items.into_par_iter().map(f).collect())
}
