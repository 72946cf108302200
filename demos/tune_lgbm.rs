//! Hyperparameter Search Example
//!
//! Splits a dated dataset at a cutoff, builds K-Fold indices over the training
//! rows and runs a random search over the LightGBM grid. The estimator is a
//! small ridge regression that reads `reg_lambda` from each candidate.

use auto_datathon::prelude::*;
use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;

/// y = w.x + b
struct Ridge {
    weights: Array1<f64>,
    bias: f64,
}

impl Predictor for Ridge {
    fn predict(&self, x: &Array2<f64>) -> auto_datathon::Result<Array1<f64>> {
        Ok(x.dot(&self.weights) + self.bias)
    }
}

/// Coordinate descent on centred data
fn fit_ridge(params: &TrialParams, x: &Array2<f64>, y: &Array1<f64>) -> auto_datathon::Result<Ridge> {
    let lambda = params.get("reg_lambda").and_then(|v| v.as_float()).unwrap_or(0.0);
    let x_mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
    let y_mean = y.mean().unwrap_or(0.0);
    let xc = x - &x_mean;
    let yc = y - y_mean;

    let mut weights = Array1::<f64>::zeros(x.ncols());
    for _ in 0..50 {
        for j in 0..x.ncols() {
            let col = xc.column(j);
            let residual = &yc - &xc.dot(&weights) + &(&col * weights[j]);
            let denom = col.dot(&col) + lambda;
            weights[j] = if denom > 0.0 { col.dot(&residual) / denom } else { 0.0 };
        }
    }
    let bias = y_mean - x_mean.dot(&weights);
    Ok(Ridge { weights, bias })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auto_datathon=info".into()),
        )
        .init();

    let n = 240;
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let dates: Vec<NaiveDate> = (0..n).map(|i| start + chrono::Days::new(i as u64)).collect();
    let x1: Vec<f64> = (0..n).map(|i| (i as f64 / 15.0).sin()).collect();
    let x2: Vec<f64> = (0..n).map(|i| (i % 7) as f64).collect();
    let y: Vec<f64> = x1
        .iter()
        .zip(x2.iter())
        .enumerate()
        .map(|(i, (a, b))| 3.0 * a - 0.5 * b + rand_simple(i))
        .collect();

    let df = df!("date" => dates, "x1" => x1, "x2" => x2, "target" => y)?;
    println!("Dataset: {} rows\n", df.height());

    let cutoff = NaiveDate::from_ymd_opt(2022, 7, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("bad cutoff"))?;
    let split = TrainTestSplitter::new(&df, ["x1", "x2"], "target", 0.0)
        .split_by_date_ts(cutoff, "date")?;
    println!(
        "Train rows: {}, test rows: {}",
        split.train_indices.len(),
        split.test_indices.len()
    );

    let cv = CVIndexer::from_n_samples(split.x_train.nrows())
        .with_shuffle(42)
        .k_fold(5)?;

    let tuner = HyperTunner::new(
        fit_ridge,
        random_grid("lgbm")?,
        split.x_train.clone(),
        split.y_train.clone(),
        cv,
        Metric::NegRootMeanSquaredError,
        1,
    )
    .with_config(TuningConfig::new().with_n_iter(20).with_n_jobs(0).with_random_state(7).with_verbose(1));

    let report = tuner.run(SamplerType::Random)?;
    println!("\nSearch complete: {} fits", report.n_fits());
    println!("Best CV score: {:.4}", report.best_score);
    println!("Best reg_lambda: {}", report.best_params["reg_lambda"]);

    let model = fit_ridge(&report.best_params, &split.x_train, &split.y_train)?;
    let holdout = Metric::NegRootMeanSquaredError.compute(&split.y_test, &model.predict(&split.x_test)?)?;
    println!("Holdout score: {:.4}", holdout);

    Ok(())
}

// Simple deterministic pseudo-random noise
fn rand_simple(seed: usize) -> f64 {
    let x = ((seed as f64 + 1.0) * 12.9898).sin() * 43758.5453;
    (x - x.floor() - 0.5) * 0.2
}
