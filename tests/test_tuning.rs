//! Integration test: catalog -> split -> CV -> search

use auto_datathon::optimizer::{
    exhaustive_grid, random_grid, HyperTunner, ModelFamily, ParameterValue, SamplerType,
    SearchSpace, TrialParams, TuningConfig,
};
use auto_datathon::training::{CVIndexer, Metric, Predictor, TrainTestSplitter};
use auto_datathon::{DatathonError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Predicts `shrink * mean(y_train)` for every row
struct ShrunkMean {
    value: f64,
}

impl Predictor for ShrunkMean {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(x.nrows(), self.value))
    }
}

fn fit_shrunk_mean(params: &TrialParams, _x: &Array2<f64>, y: &Array1<f64>) -> Result<ShrunkMean> {
    let shrink = params
        .get("shrink")
        .and_then(|v| v.as_float())
        .ok_or_else(|| DatathonError::ValidationError("shrink missing".to_string()))?;
    let mean = y.mean().unwrap_or(0.0);
    Ok(ShrunkMean { value: shrink * mean })
}

fn constant_target_df(n: usize) -> DataFrame {
    let f1: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let f2: Vec<f64> = (0..n).map(|i| (n - i) as f64).collect();
    df!("f1" => f1, "f2" => f2, "target" => vec![5.0; n]).unwrap()
}

#[test]
fn test_end_to_end_exhaustive_search() {
    let df = constant_target_df(30);
    let split = TrainTestSplitter::new(&df, ["f1", "f2"], "target", 0.8)
        .with_random_state(42)
        .split_by_percentage()
        .unwrap();
    let n_train = split.x_train.nrows();
    assert_eq!(n_train, 24);

    let cv = CVIndexer::from_n_samples(n_train).k_fold(4).unwrap();
    let space = SearchSpace::new().floats("shrink", &[0.0, 0.5, 1.0, 1.5]);

    let tuner = HyperTunner::new(
        fit_shrunk_mean,
        space,
        split.x_train,
        split.y_train,
        cv,
        Metric::NegMeanSquaredError,
        1,
    );
    let report = tuner.run_exhaustive(0).unwrap();

    assert_eq!(report.strategy, SamplerType::Grid);
    assert_eq!(report.n_folds, 4);
    assert_eq!(report.n_fits(), 16);
    assert_eq!(report.best_params["shrink"], ParameterValue::Float(1.0));
    assert_eq!(report.best_score, 0.0);
    assert_eq!(report.best_candidate().map(|c| c.cv.scores.len()), Some(4));

    let best = tuner.exhaustive_search(2).unwrap();
    assert_eq!(best, report.best_params);
}

#[test]
fn test_search_independent_of_n_jobs() {
    let df = constant_target_df(20);
    let x = auto_datathon::utils::columns_to_array2(&df, &["f1".to_string(), "f2".to_string()]).unwrap();
    let y = auto_datathon::utils::column_to_array1(&df, "target").unwrap();
    let cv = CVIndexer::new(&df).leave_one_out().unwrap();
    let space = SearchSpace::new().uniform("shrink", 0.5, 1.0);

    let run = |n_jobs| {
        HyperTunner::new(fit_shrunk_mean, space.clone(), x.clone(), y.clone(), cv.clone(), Metric::NegMeanSquaredError, 0)
            .with_n_iter(6)
            .with_random_state(9)
            .run_random(n_jobs)
            .unwrap()
    };

    let serial = run(1);
    let parallel = run(4);
    assert_eq!(serial.candidates.len(), 6);
    assert_eq!(serial.best_index, parallel.best_index);
    assert_eq!(serial.best_params, parallel.best_params);
    for (a, b) in serial.candidates.iter().zip(parallel.candidates.iter()) {
        assert_eq!(a.params, b.params);
        assert_eq!(a.cv.scores, b.cv.scores);
    }
}

#[test]
fn test_bayesian_search_matches_random_search() {
    let df = constant_target_df(12);
    let x = Array2::from_shape_fn((12, 1), |(r, _)| r as f64);
    let y = auto_datathon::utils::column_to_array1(&df, "target").unwrap();
    let cv = CVIndexer::new(&df).k_fold(3).unwrap();
    let space = SearchSpace::new()
        .uniform("shrink", 0.0, 2.0)
        .randint("unused", 1.0, 100.0);

    let tuner = HyperTunner::new(fit_shrunk_mean, space, x, y, cv, Metric::NegMeanAbsoluteError, 0)
        .with_config(TuningConfig::new().with_n_iter(8).with_random_state(123).with_n_jobs(2));

    let random = tuner.random_search(2).unwrap();
    let bayesian = tuner.bayesian_search(2).unwrap();
    assert_eq!(random, bayesian);
    assert_eq!(tuner.run(SamplerType::Bayesian).unwrap().best_params, random);
}

#[test]
fn test_random_search_over_discrete_grid_is_capped() {
    let df = constant_target_df(10);
    let x = Array2::zeros((10, 1));
    let y = auto_datathon::utils::column_to_array1(&df, "target").unwrap();
    let cv = CVIndexer::new(&df).k_fold(2).unwrap();
    let space = SearchSpace::new().floats("shrink", &[0.25, 1.0, 2.0]);

    let report = HyperTunner::new(fit_shrunk_mean, space, x, y, cv, Metric::NegMeanSquaredError, 0)
        .with_n_iter(10)
        .with_random_state(1)
        .run_random(1)
        .unwrap();

    assert_eq!(report.candidates.len(), 3);
    let mut seen: Vec<f64> = report
        .candidates
        .iter()
        .filter_map(|c| c.params["shrink"].as_float())
        .collect();
    seen.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(seen, vec![0.25, 1.0, 2.0]);
    assert_eq!(report.best_params["shrink"], ParameterValue::Float(1.0));
}

#[test]
fn test_catalog_grids_drive_search() {
    let xgb = ModelFamily::XGBoost.random_grid().unwrap();
    let lgbm = random_grid("lgbm").unwrap();
    assert!(!xgb.is_discrete());
    assert!(exhaustive_grid("xgboost").unwrap().is_discrete());

    let n = 16;
    let x = Array2::from_shape_fn((n, 2), |(r, c)| (r + c) as f64);
    let y = Array1::from_elem(n, 1.0);
    let cv = CVIndexer::from_n_samples(n).k_fold(4).unwrap();

    // Record which leaves counts were tried and score by closeness to 20
    let fit = |params: &TrialParams, _x: &Array2<f64>, _y: &Array1<f64>| -> Result<i64> {
        params
            .get("num_leaves")
            .and_then(|v| v.as_int())
            .ok_or_else(|| DatathonError::ValidationError("num_leaves missing".to_string()))
    };
    let score = |leaves: &i64, _x: &Array2<f64>, _y: &Array1<f64>| -> Result<f64> {
        Ok(-((leaves - 20).abs() as f64))
    };

    let report = HyperTunner::new(fit, lgbm, x, y, cv, score, 0)
        .with_n_iter(12)
        .with_random_state(5)
        .run_random(0)
        .unwrap();

    assert_eq!(report.candidates.len(), 12);
    for c in &report.candidates {
        let leaves = c.params["num_leaves"].as_int().unwrap();
        assert!((6..50).contains(&leaves));
        let children = c.params["min_child_samples"].as_int().unwrap();
        assert!((100..500).contains(&children));
        let subsample = c.params["subsample"].as_float().unwrap();
        assert!((0.2..=1.0).contains(&subsample));
    }
    let best = report.best_score;
    assert!(report.candidates.iter().all(|c| c.cv.mean_score <= best));
}

#[test]
fn test_unknown_model_name() {
    assert!(matches!(
        exhaustive_grid("catboost"),
        Err(DatathonError::ModelNameInexistent(name)) if name == "catboost"
    ));
    assert!(matches!(
        random_grid("random_forest"),
        Err(DatathonError::ModelNameInexistent(_))
    ));
}

#[test]
fn test_report_serializes() {
    let df = constant_target_df(6);
    let x = Array2::zeros((6, 1));
    let y = auto_datathon::utils::column_to_array1(&df, "target").unwrap();
    let cv = CVIndexer::new(&df).k_fold(3).unwrap();
    let space = SearchSpace::new().floats("shrink", &[1.0]);

    let report = HyperTunner::new(fit_shrunk_mean, space, x, y, cv, Metric::R2, 0)
        .run_exhaustive(1)
        .unwrap();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"shrink\":1.0"));
    assert!(json.contains("\"strategy\":\"Grid\""));
}

#[test]
fn test_report_with_nan_scores_round_trips() {
    let x = Array2::zeros((4, 1));
    let y = Array1::from_elem(4, 1.0);
    let cv = CVIndexer::from_n_samples(4).k_fold(2).unwrap();
    let space = SearchSpace::new().floats("shrink", &[0.5, 1.0]);
    let nan_score = |_m: &ShrunkMean, _x: &Array2<f64>, _y: &Array1<f64>| -> Result<f64> { Ok(f64::NAN) };

    let report = HyperTunner::new(fit_shrunk_mean, space, x, y, cv, nan_score, 0)
        .run_exhaustive(1)
        .unwrap();
    assert_eq!(report.best_index, 0);

    let json = serde_json::to_string(&report).unwrap();
    let back: auto_datathon::optimizer::SearchReport = serde_json::from_str(&json).unwrap();
    assert!(back.best_score.is_nan());
    assert!(back.candidates.iter().all(|c| c.cv.mean_score.is_nan()));
    assert_eq!(back.best_params, report.best_params);
}
