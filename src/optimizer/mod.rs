//! Hyperparameter search module
//!
//! Provides:
//! - Named per-model parameter grids (exhaustive and random)
//! - Search spaces of value lists and sampling distributions
//! - Grid and random candidate samplers
//! - The cross-validated `HyperTunner`

mod config;
mod search_space;
mod samplers;
mod tuner;
pub mod catalog;

pub use config::TuningConfig;
pub use search_space::{SearchSpace, Parameter, ParameterDomain, ParameterValue, TrialParams};
pub use samplers::{Sampler, SamplerType, GridSampler, RandomSampler, create_sampler, DEFAULT_N_ITER};
pub use catalog::{ModelFamily, exhaustive_grid, random_grid, GRID_RANDOM_STATE};
pub use tuner::{HyperTunner, SearchReport, CandidateResult};
