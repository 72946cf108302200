//! Data partitioning and model capabilities
//!
//! - Train/test splitting by random percentage or date cutoff
//! - Cross-validation index generation (K-Fold, Leave-One-Out)
//! - Estimator, predictor and scorer traits with built-in metrics

pub mod cross_validation;
pub mod models;
pub mod split;

pub use cross_validation::{CVIndexer, CVStrategy, IndexPair, CVResults};
pub use models::{Estimator, Predictor, Scorer, Metric};
pub use split::{TrainTestSplitter, TrainTestSplit};
