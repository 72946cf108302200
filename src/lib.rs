//! Auto Datathon - hyperparameter tuning orchestration for tabular ML
//!
//! This crate provides the plumbing around model selection:
//! - Named hyperparameter grids for XGBoost, LightGBM and Random Forest
//! - Train/test splitting by random percentage or date cutoff
//! - Cross-validation index generation
//! - Cross-validated exhaustive and random search over any estimator
//!
//! # Modules
//!
//! - [`optimizer`] - Grid catalog, search spaces, samplers and `HyperTunner`
//! - [`training`] - Splitting, CV indexing, estimator and scorer traits
//! - [`utils`] - DataFrame extraction and parallel helpers
//!
//! Estimators are supplied by the caller; the crate does not train models itself.

// Core error handling
pub mod error;

pub mod optimizer;
pub mod training;
pub mod utils;

pub use error::{DatathonError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{DatathonError, Result};

    // Search
    pub use crate::optimizer::{
        HyperTunner, SearchReport, SearchSpace, SamplerType, TuningConfig,
        ModelFamily, ParameterValue, TrialParams, exhaustive_grid, random_grid,
    };

    // Data partitioning
    pub use crate::training::{
        CVIndexer, CVStrategy, IndexPair, TrainTestSplitter, TrainTestSplit,
        Estimator, Predictor, Scorer, Metric,
    };
}
