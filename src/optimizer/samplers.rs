//! Candidate generation strategies for hyperparameter search

use super::search_space::{SearchSpace, TrialParams};
use crate::error::Result;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of sampled candidates for random search
pub const DEFAULT_N_ITER: usize = 10;

/// Type of search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplerType {
    /// Full enumeration of a discrete space
    Grid,
    /// Bounded random sampling
    Random,
    /// Same procedure as `Random`; no surrogate model is fitted
    Bayesian,
}

/// Trait for candidate generators
pub trait Sampler: Send + Sync {
    /// Produce the candidates to evaluate, in evaluation order
    fn candidates(&mut self, search_space: &SearchSpace) -> Result<Vec<TrialParams>>;
}

/// Enumerates every combination of a discrete space
#[derive(Debug, Default, Clone, Copy)]
pub struct GridSampler;

impl Sampler for GridSampler {
    fn candidates(&mut self, search_space: &SearchSpace) -> Result<Vec<TrialParams>> {
        search_space.validate()?;
        search_space.grid()
    }
}

/// Random sampler
///
/// A fully discrete space is sampled without replacement, capped at the grid
/// size. Otherwise every parameter is drawn independently for each candidate.
#[derive(Debug)]
pub struct RandomSampler {
    rng: Xoshiro256PlusPlus,
    n_iter: usize,
}

impl RandomSampler {
    /// Create a new random sampler
    pub fn new(n_iter: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        Self { rng, n_iter }
    }
}

impl Sampler for RandomSampler {
    fn candidates(&mut self, search_space: &SearchSpace) -> Result<Vec<TrialParams>> {
        search_space.validate()?;

        if let Some(grid_size) = search_space.grid_size() {
            let n = if grid_size < self.n_iter {
                warn!(
                    grid_size,
                    n_iter = self.n_iter,
                    "Grid is smaller than n_iter; sampling every combination once"
                );
                grid_size
            } else {
                self.n_iter
            };

            let picked = rand::seq::index::sample(&mut self.rng, grid_size, n);
            return Ok(picked
                .into_iter()
                .filter_map(|i| search_space.candidate(i))
                .collect());
        }

        Ok((0..self.n_iter)
            .map(|_| search_space.sample(&mut self.rng))
            .collect())
    }
}

/// Create a sampler from type
pub fn create_sampler(sampler_type: SamplerType, n_iter: usize, seed: Option<u64>) -> Box<dyn Sampler> {
    match sampler_type {
        SamplerType::Grid => Box::new(GridSampler),
        SamplerType::Random | SamplerType::Bayesian => Box::new(RandomSampler::new(n_iter, seed)),
    }
}
