//! HyperTunner - cross-validated hyperparameter search

use super::{
    config::TuningConfig,
    samplers::{create_sampler, SamplerType},
    search_space::{SearchSpace, TrialParams},
};
use crate::error::{DatathonError, Result};
use crate::training::cross_validation::{nan_from_null, CVResults, IndexPair};
use crate::training::models::{Estimator, Scorer};
use crate::utils::parallel::{try_parallel_map, ParallelConfig};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Cross-validated outcome of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Candidate number in evaluation order
    pub candidate_id: usize,
    /// Parameters used
    pub params: TrialParams,
    /// Per-fold scores and their summary
    pub cv: CVResults,
}

/// Outcome of one search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Strategy that produced the candidates
    pub strategy: SamplerType,
    /// Every evaluated candidate, in evaluation order
    pub candidates: Vec<CandidateResult>,
    /// Index of the best candidate
    pub best_index: usize,
    /// Parameters of the best candidate
    pub best_params: TrialParams,
    /// Mean CV score of the best candidate
    #[serde(deserialize_with = "nan_from_null")]
    pub best_score: f64,
    /// Folds per candidate
    pub n_folds: usize,
    /// Total duration
    pub total_duration_secs: f64,
}

impl SearchReport {
    /// Get the best candidate, `None` if `best_index` is out of range
    pub fn best_candidate(&self) -> Option<&CandidateResult> {
        self.candidates.get(self.best_index)
    }

    /// Number of estimator fits performed
    pub fn n_fits(&self) -> usize {
        self.candidates.len() * self.n_folds
    }
}

/// Rows of one CV fold, materialised once per search
struct FoldData {
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
}

/// Hyperparameter tuner over caller-supplied CV folds.
///
/// Every search fits the estimator once per candidate per fold on the fold's
/// training rows and scores it on the fold's test rows. The candidate with the
/// highest mean score wins; ties go to the earliest candidate and a NaN mean
/// never wins. Searches take `&self` and keep no state between calls.
pub struct HyperTunner<E, S> {
    estimator: E,
    hypers_grid: SearchSpace,
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    cv_indices: Vec<IndexPair>,
    scorer: S,
    config: TuningConfig,
}

impl<E, S> HyperTunner<E, S>
where
    E: Estimator,
    S: Scorer<E::Model>,
{
    /// Create a new tuner
    pub fn new(
        estimator: E,
        hypers_grid: SearchSpace,
        x_train: Array2<f64>,
        y_train: Array1<f64>,
        cv_indices: Vec<IndexPair>,
        scorer: S,
        verbose: u8,
    ) -> Self {
        Self {
            estimator,
            hypers_grid,
            x_train,
            y_train,
            cv_indices,
            scorer,
            config: TuningConfig::default().with_verbose(verbose),
        }
    }

    /// Replace the whole tuning configuration
    pub fn with_config(mut self, config: TuningConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the random-search budget
    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.config.n_iter = n_iter;
        self
    }

    /// Seed candidate sampling
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.config.random_state = Some(seed);
        self
    }

    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    pub fn search_space(&self) -> &SearchSpace {
        &self.hypers_grid
    }

    /// Evaluate every combination of a discrete search space
    pub fn exhaustive_search(&self, n_jobs: usize) -> Result<TrialParams> {
        Ok(self.run_exhaustive(n_jobs)?.best_params)
    }

    /// Evaluate `n_iter` sampled combinations
    pub fn random_search(&self, n_jobs: usize) -> Result<TrialParams> {
        Ok(self.run_random(n_jobs)?.best_params)
    }

    /// Runs exactly the random-search procedure; there is no surrogate model
    pub fn bayesian_search(&self, n_jobs: usize) -> Result<TrialParams> {
        Ok(self.execute(SamplerType::Bayesian, n_jobs)?.best_params)
    }

    /// Exhaustive search with the full report
    pub fn run_exhaustive(&self, n_jobs: usize) -> Result<SearchReport> {
        self.execute(SamplerType::Grid, n_jobs)
    }

    /// Random search with the full report
    pub fn run_random(&self, n_jobs: usize) -> Result<SearchReport> {
        self.execute(SamplerType::Random, n_jobs)
    }

    /// Run a strategy with the configured `n_jobs`
    pub fn run(&self, strategy: SamplerType) -> Result<SearchReport> {
        self.execute(strategy, self.config.n_jobs)
    }

    fn execute(&self, strategy: SamplerType, n_jobs: usize) -> Result<SearchReport> {
        let start = Instant::now();
        // Levels above 3 log like 3
        let verbose = self.config.verbose;

        if strategy != SamplerType::Grid {
            self.config.validate()?;
        }
        self.validate_data()?;

        let mut sampler = create_sampler(strategy, self.config.n_iter, self.config.random_state);
        let candidates = sampler.candidates(&self.hypers_grid)?;
        let folds = self.materialise_folds();
        let n_folds = folds.len();

        if verbose >= 1 {
            info!(
                ?strategy,
                n_candidates = candidates.len(),
                n_folds,
                n_jobs,
                "Fitting {} folds for each of {} candidates, totalling {} fits",
                n_folds,
                candidates.len(),
                n_folds * candidates.len()
            );
        }

        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..n_folds).map(move |f| (c, f)))
            .collect();

        let scores = try_parallel_map(tasks, &ParallelConfig::from_n_jobs(n_jobs), |(c, f)| {
            let fold = &folds[f];
            let model = self.estimator.fit(&candidates[c], &fold.x_train, &fold.y_train)?;
            let score = self.scorer.score(&model, &fold.x_test, &fold.y_test)?;
            if verbose >= 3 {
                debug!(candidate = c, fold = f, score, "Fold scored");
            }
            Ok(score)
        })?;

        let results: Vec<CandidateResult> = candidates
            .into_iter()
            .zip(scores.chunks(n_folds))
            .enumerate()
            .map(|(candidate_id, (params, fold_scores))| CandidateResult {
                candidate_id,
                params,
                cv: CVResults::from_scores(fold_scores.to_vec()),
            })
            .collect();

        if verbose >= 2 {
            for r in &results {
                info!(
                    candidate = r.candidate_id,
                    mean_score = r.cv.mean_score,
                    std_score = r.cv.std_score,
                    "Candidate evaluated"
                );
            }
        }

        let best_index = best_candidate_index(&results).ok_or_else(|| {
            DatathonError::ValidationError("search produced no candidates".to_string())
        })?;
        let best = &results[best_index];
        let report = SearchReport {
            strategy,
            best_index,
            best_params: best.params.clone(),
            best_score: best.cv.mean_score,
            n_folds,
            candidates: results,
            total_duration_secs: start.elapsed().as_secs_f64(),
        };

        if verbose >= 1 {
            info!(
                best_index = report.best_index,
                best_score = report.best_score,
                best_params = ?report.best_params,
                duration_secs = report.total_duration_secs,
                "Search finished"
            );
        }

        Ok(report)
    }

    fn validate_data(&self) -> Result<()> {
        let n_rows = self.x_train.nrows();
        if self.y_train.len() != n_rows {
            return Err(DatathonError::ShapeError {
                expected: format!("{} target values", n_rows),
                actual: format!("{} target values", self.y_train.len()),
            });
        }
        if self.cv_indices.is_empty() {
            return Err(DatathonError::ValidationError(
                "at least one cross-validation index pair is required".to_string(),
            ));
        }

        for (i, pair) in self.cv_indices.iter().enumerate() {
            if pair.train_indices.is_empty() || pair.test_indices.is_empty() {
                return Err(DatathonError::ValidationError(format!(
                    "index pair {} has an empty train or test set",
                    i
                )));
            }
            let out_of_range = pair
                .train_indices
                .iter()
                .chain(pair.test_indices.iter())
                .find(|&&row| row >= n_rows);
            if let Some(row) = out_of_range {
                return Err(DatathonError::ValidationError(format!(
                    "index pair {} refers to row {} but the training data has {} rows",
                    i, row, n_rows
                )));
            }
        }
        Ok(())
    }

    fn materialise_folds(&self) -> Vec<FoldData> {
        self.cv_indices
            .iter()
            .map(|pair| FoldData {
                x_train: self.x_train.select(Axis(0), &pair.train_indices),
                y_train: self.y_train.select(Axis(0), &pair.train_indices),
                x_test: self.x_train.select(Axis(0), &pair.test_indices),
                y_test: self.y_train.select(Axis(0), &pair.test_indices),
            })
            .collect()
    }
}

/// First candidate with the highest mean score; NaN ranks last
fn best_candidate_index(results: &[CandidateResult]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, r) in results.iter().enumerate() {
        let score = r.cv.mean_score;
        let is_better = match best {
            None => true,
            Some((_, best_score)) => !score.is_nan() && (best_score.is_nan() || score > best_score),
        };
        if is_better {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}
