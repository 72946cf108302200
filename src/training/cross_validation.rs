//! Cross-validation index generation

use crate::error::{DatathonError, Result};
use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Cross-validation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CVStrategy {
    /// K-Fold cross-validation
    KFold { n_splits: usize },
    /// Leave-one-out cross-validation
    LeaveOneOut,
}

/// Train/test row indices of one fold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPair {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Produces cross-validation index pairs for a dataset
#[derive(Debug, Clone)]
pub struct CVIndexer {
    n_samples: usize,
    shuffle_seed: Option<u64>,
}

impl CVIndexer {
    /// Index the rows of `df`
    pub fn new(df: &DataFrame) -> Self {
        Self::from_n_samples(df.height())
    }

    /// Index `n_samples` rows
    pub fn from_n_samples(n_samples: usize) -> Self {
        Self {
            n_samples,
            shuffle_seed: None,
        }
    }

    /// Shuffle rows with `seed` before cutting K-Fold folds
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Generate index pairs for a strategy
    pub fn split(&self, strategy: CVStrategy) -> Result<Vec<IndexPair>> {
        match strategy {
            CVStrategy::KFold { n_splits } => self.k_fold(n_splits),
            CVStrategy::LeaveOneOut => self.leave_one_out(),
        }
    }

    /// One pair per row: that row is the test set, every other row trains
    pub fn leave_one_out(&self) -> Result<Vec<IndexPair>> {
        let n_samples = self.n_samples;
        if n_samples < 2 {
            return Err(DatathonError::ValidationError(format!(
                "leave-one-out needs at least 2 samples, got {}",
                n_samples
            )));
        }

        let pairs: Vec<IndexPair> = (0..n_samples)
            .map(|i| {
                let train_indices: Vec<usize> = (0..n_samples).filter(|&j| j != i).collect();
                IndexPair {
                    train_indices,
                    test_indices: vec![i],
                    fold_idx: i,
                }
            })
            .collect();

        debug!(n_samples, n_pairs = pairs.len(), "Generated leave-one-out indices");
        Ok(pairs)
    }

    /// `n_splits` folds as equal as possible; the first `n % k` folds get one extra row
    pub fn k_fold(&self, n_splits: usize) -> Result<Vec<IndexPair>> {
        let n_samples = self.n_samples;
        if n_splits < 2 {
            return Err(DatathonError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < n_splits {
            return Err(DatathonError::ValidationError(format!(
                "n_splits ({}) cannot exceed the number of samples ({})",
                n_splits, n_samples
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;

        let mut pairs = Vec::with_capacity(n_splits);
        let mut current = 0;

        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let mut test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let mut train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            if self.shuffle_seed.is_some() {
                test_indices.sort_unstable();
                train_indices.sort_unstable();
            }

            pairs.push(IndexPair {
                train_indices,
                test_indices,
                fold_idx,
            });

            current += fold_size;
        }

        debug!(n_samples, n_splits, shuffled = self.shuffle_seed.is_some(), "Generated k-fold indices");
        Ok(pairs)
    }
}

/// Per-fold scores of one candidate.
///
/// NaN scores serialize to JSON as `null` and deserialize back to NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    #[serde(deserialize_with = "nan_vec_from_null")]
    pub scores: Vec<f64>,
    /// Mean score across folds
    #[serde(deserialize_with = "nan_from_null")]
    pub mean_score: f64,
    /// Standard deviation of scores
    #[serde(deserialize_with = "nan_from_null")]
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        if n_folds == 0 {
            return Self {
                scores,
                mean_score: f64::NAN,
                std_score: f64::NAN,
                n_folds,
            };
        }

        let mean_score = scores.iter().sum::<f64>() / n_folds as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds as f64;
        let std_score = variance.sqrt();

        Self {
            scores,
            mean_score,
            std_score,
            n_folds,
        }
    }
}

/// Read a float written as `null` back as NaN
pub(crate) fn nan_from_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn nan_vec_from_null<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_k_fold() {
        let cv = CVIndexer::from_n_samples(100);
        let pairs = cv.k_fold(5).unwrap();

        assert_eq!(pairs.len(), 5);

        // Each test set should have 20 samples
        for pair in &pairs {
            assert_eq!(pair.test_indices.len(), 20);
            assert_eq!(pair.train_indices.len(), 80);
        }

        // All indices should be covered exactly once in test sets
        let mut all_test: Vec<usize> = pairs.iter().flat_map(|p| p.test_indices.clone()).collect();
        all_test.sort();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_k_fold_uneven_sizes() {
        let pairs = CVIndexer::from_n_samples(10).k_fold(3).unwrap();
        let sizes: Vec<usize> = pairs.iter().map(|p| p.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        // Contiguous folds without shuffling
        assert_eq!(pairs[0].test_indices, vec![0, 1, 2, 3]);
        assert_eq!(pairs[1].test_indices, vec![4, 5, 6]);
        assert_eq!(pairs[1].train_indices, vec![0, 1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn test_k_fold_invalid_splits() {
        let cv = CVIndexer::from_n_samples(4);
        assert!(matches!(cv.k_fold(1), Err(DatathonError::ValidationError(_))));
        assert!(matches!(cv.k_fold(5), Err(DatathonError::ValidationError(_))));
        assert!(cv.k_fold(4).is_ok());
    }

    #[test]
    fn test_k_fold_shuffle_is_seeded() {
        let a = CVIndexer::from_n_samples(30).with_shuffle(42).k_fold(3).unwrap();
        let b = CVIndexer::from_n_samples(30).with_shuffle(42).k_fold(3).unwrap();
        let plain = CVIndexer::from_n_samples(30).k_fold(3).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, plain);

        let mut all_test: Vec<usize> = a.iter().flat_map(|p| p.test_indices.clone()).collect();
        all_test.sort();
        assert_eq!(all_test, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_leave_one_out() {
        let cv = CVIndexer::from_n_samples(10);
        let pairs = cv.split(CVStrategy::LeaveOneOut).unwrap();

        assert_eq!(pairs.len(), 10);

        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.test_indices, vec![i]);
            assert_eq!(pair.train_indices.len(), 9);
            assert!(!pair.train_indices.contains(&i));
        }
    }

    #[test]
    fn test_leave_one_out_needs_two_rows() {
        assert!(CVIndexer::from_n_samples(1).leave_one_out().is_err());
    }

    #[test]
    fn test_indexer_from_dataframe() {
        let df = df!("x" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let cv = CVIndexer::new(&df);
        assert_eq!(cv.n_samples(), 6);
        assert_eq!(cv.split(CVStrategy::KFold { n_splits: 2 }).unwrap().len(), 2);
    }

    #[test]
    fn test_cv_results() {
        let results = CVResults::from_scores(vec![1.0, 3.0]);
        assert_eq!(results.mean_score, 2.0);
        assert_eq!(results.std_score, 1.0);
        assert_eq!(results.n_folds, 2);
    }

    #[test]
    fn test_cv_results_nan_survives_json() {
        let empty = CVResults::from_scores(vec![]);
        let json = serde_json::to_string(&empty).unwrap();
        let back: CVResults = serde_json::from_str(&json).unwrap();
        assert!(back.mean_score.is_nan());
        assert!(back.std_score.is_nan());
        assert_eq!(back.n_folds, 0);

        let partial = CVResults::from_scores(vec![0.5, f64::NAN]);
        let back: CVResults = serde_json::from_str(&serde_json::to_string(&partial).unwrap()).unwrap();
        assert_eq!(back.scores[0], 0.5);
        assert!(back.scores[1].is_nan());
        assert!(back.mean_score.is_nan());
    }
}
