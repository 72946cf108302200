//! Train/test splitting of a tabular dataset

use crate::error::{DatathonError, Result};
use crate::utils::frame::{column_to_array1, columns_to_array2};
use chrono::NaiveDateTime;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const SECONDS_PER_DAY: i64 = 86_400;

/// Feature and target partitions produced by a split
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
    /// Dataset rows that went to train, in partition order
    pub train_indices: Vec<usize>,
    /// Dataset rows that went to test, in partition order
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    /// `(x_train, y_train, x_test, y_test)`
    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>, Array2<f64>, Array1<f64>) {
        (self.x_train, self.y_train, self.x_test, self.y_test)
    }
}

/// Splits a dataset into train and test partitions.
///
/// Note the naming of `test_size`: [`split_by_percentage`](Self::split_by_percentage)
/// samples `round(test_size * n_rows)` rows into the **train** partition and
/// leaves the rest for test. A `test_size` of 0.8 therefore yields an 80% train set.
#[derive(Debug, Clone)]
pub struct TrainTestSplitter<'a> {
    df: &'a DataFrame,
    features: Vec<String>,
    target: String,
    test_size: f64,
    random_state: Option<u64>,
}

impl<'a> TrainTestSplitter<'a> {
    pub fn new<I, S>(df: &'a DataFrame, features: I, target: impl Into<String>, test_size: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            df,
            features: features.into_iter().map(Into::into).collect(),
            target: target.into(),
            test_size,
            random_state: None,
        }
    }

    /// Fix the sampling seed of the percentage split
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Randomly sample `round(test_size * n_rows)` rows without replacement as train.
    ///
    /// Halves round to even. Test rows keep their dataset order.
    pub fn split_by_percentage(&self) -> Result<TrainTestSplit> {
        if !(0.0..=1.0).contains(&self.test_size) {
            return Err(DatathonError::ValidationError(format!(
                "test_size must lie in [0, 1], got {}",
                self.test_size
            )));
        }

        let n_rows = self.df.height();
        let n_train = ((n_rows as f64 * self.test_size).round_ties_even() as usize).min(n_rows);

        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let train_indices = rand::seq::index::sample(&mut rng, n_rows, n_train).into_vec();

        let mut in_train = vec![false; n_rows];
        for &row in &train_indices {
            in_train[row] = true;
        }
        let test_indices: Vec<usize> = (0..n_rows).filter(|&row| !in_train[row]).collect();

        debug!(
            n_rows,
            n_train = train_indices.len(),
            n_test = test_indices.len(),
            seeded = self.random_state.is_some(),
            "Split by percentage"
        );
        self.partition(train_indices, test_indices)
    }

    /// Rows with `date_col < cutoff` train, rows with `date_col >= cutoff` test.
    ///
    /// `date_col` must be a `Date` or `Datetime` column; timezone-aware values
    /// are compared in UTC. Rows with a null date fall on neither side.
    pub fn split_by_date_ts(&self, cutoff: NaiveDateTime, date_col: &str) -> Result<TrainTestSplit> {
        let dates = self
            .df
            .column(date_col)
            .map_err(|_| DatathonError::FeatureNotFound(date_col.to_string()))?;
        let cutoff_key = temporal_key(date_col, dates.dtype(), cutoff)?;

        let keys = dates.cast(&DataType::Int64)?;
        let mut train_indices = Vec::new();
        let mut test_indices = Vec::new();
        for (row, key) in keys.i64()?.into_iter().enumerate() {
            match key {
                Some(k) if k < cutoff_key => train_indices.push(row),
                Some(_) => test_indices.push(row),
                None => {}
            }
        }

        debug!(
            %cutoff,
            date_col,
            n_train = train_indices.len(),
            n_test = test_indices.len(),
            "Split by date"
        );
        self.partition(train_indices, test_indices)
    }

    fn partition(&self, train_indices: Vec<usize>, test_indices: Vec<usize>) -> Result<TrainTestSplit> {
        let x = columns_to_array2(self.df, &self.features)?;
        let y = column_to_array1(self.df, &self.target)?;

        Ok(TrainTestSplit {
            x_train: x.select(Axis(0), &train_indices),
            y_train: y.select(Axis(0), &train_indices),
            x_test: x.select(Axis(0), &test_indices),
            y_test: y.select(Axis(0), &test_indices),
            train_indices,
            test_indices,
        })
    }
}

/// Express `cutoff` in the physical unit of a temporal column.
///
/// For `Date` columns the key is rounded up to the next whole day, so a date
/// sorts below the cutoff exactly when its midnight does.
fn temporal_key(date_col: &str, dtype: &DataType, cutoff: NaiveDateTime) -> Result<i64> {
    let cutoff = cutoff.and_utc();
    match dtype {
        DataType::Date => {
            let secs = cutoff.timestamp();
            let partial_day = secs.rem_euclid(SECONDS_PER_DAY) != 0 || cutoff.timestamp_subsec_nanos() != 0;
            Ok(secs.div_euclid(SECONDS_PER_DAY) + i64::from(partial_day))
        }
        DataType::Datetime(unit, _) => match unit {
            TimeUnit::Milliseconds => Ok(cutoff.timestamp_millis()),
            TimeUnit::Microseconds => Ok(cutoff.timestamp_micros()),
            TimeUnit::Nanoseconds => cutoff.timestamp_nanos_opt().ok_or_else(|| {
                DatathonError::ValidationError(format!(
                    "cutoff {} is outside the nanosecond range of '{}'",
                    cutoff, date_col
                ))
            }),
        },
        other => Err(DatathonError::ValidationError(format!(
            "column '{}' has type {} and cannot be compared with a date",
            date_col, other
        ))),
    }
}
