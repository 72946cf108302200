//! Estimator and scorer capabilities consumed by the tuner

use crate::error::{DatathonError, Result};
use crate::optimizer::TrialParams;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Something that can be fitted for a given hyperparameter combination.
///
/// `fit` is called once per candidate per fold, possibly from several worker
/// threads at once, so implementations take `&self` and must be `Sync`.
pub trait Estimator: Sync {
    /// The fitted model handed to the scorer
    type Model;

    /// Fit a fresh model with `params` on the given rows
    fn fit(&self, params: &TrialParams, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self::Model>;
}

impl<M, F> Estimator for F
where
    F: Fn(&TrialParams, &Array2<f64>, &Array1<f64>) -> Result<M> + Sync,
{
    type Model = M;

    fn fit(&self, params: &TrialParams, x: &Array2<f64>, y: &Array1<f64>) -> Result<M> {
        self(params, x, y)
    }
}

/// A fitted model that produces one prediction per row
pub trait Predictor {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Scores a fitted model on held-out rows. Higher is better.
pub trait Scorer<M>: Sync {
    fn score(&self, model: &M, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64>;
}

impl<M, F> Scorer<M> for F
where
    F: Fn(&M, &Array2<f64>, &Array1<f64>) -> Result<f64> + Sync,
{
    fn score(&self, model: &M, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        self(model, x, y)
    }
}

/// Built-in scorers for [`Predictor`] models.
///
/// Error metrics are negated so that every variant is maximised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Fraction of predictions within 0.5 of the label
    Accuracy,
    R2,
    NegMeanSquaredError,
    NegRootMeanSquaredError,
    NegMeanAbsoluteError,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::R2 => "r2",
            Metric::NegMeanSquaredError => "neg_mean_squared_error",
            Metric::NegRootMeanSquaredError => "neg_root_mean_squared_error",
            Metric::NegMeanAbsoluteError => "neg_mean_absolute_error",
        }
    }

    /// Compute the metric for a pair of label/prediction vectors
    pub fn compute(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
        if y_true.len() != y_pred.len() {
            return Err(DatathonError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(DatathonError::ValidationError(format!(
                "cannot compute {} on an empty target",
                self.name()
            )));
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let value = match self {
            Metric::Accuracy => {
                let correct = errors.iter().filter(|e| e.abs() < 0.5).count();
                correct as f64 / n
            }
            Metric::R2 => {
                let y_mean = y_true.iter().sum::<f64>() / n;
                let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
                let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
                if ss_tot > 0.0 {
                    1.0 - ss_res / ss_tot
                } else if ss_res == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Metric::NegMeanSquaredError => -(errors.iter().map(|e| e * e).sum::<f64>() / n),
            Metric::NegRootMeanSquaredError => -(errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt(),
            Metric::NegMeanAbsoluteError => -(errors.iter().map(|e| e.abs()).sum::<f64>() / n),
        };
        Ok(value)
    }
}

impl<M: Predictor> Scorer<M> for Metric {
    fn score(&self, model: &M, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = model.predict(x)?;
        self.compute(y, &y_pred)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = DatathonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accuracy" => Ok(Metric::Accuracy),
            "r2" => Ok(Metric::R2),
            "neg_mean_squared_error" => Ok(Metric::NegMeanSquaredError),
            "neg_root_mean_squared_error" => Ok(Metric::NegRootMeanSquaredError),
            "neg_mean_absolute_error" => Ok(Metric::NegMeanAbsoluteError),
            other => Err(DatathonError::InvalidParameter {
                name: "scoring".to_string(),
                value: other.to_string(),
                reason: "unknown metric".to_string(),
            }),
        }
    }
}
