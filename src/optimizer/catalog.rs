//! Named hyperparameter grids for the supported model families
//!
//! Two modes are provided. The exhaustive grids hold literal value lists meant
//! for full enumeration. The random grids swap some of those lists for
//! `uniform` / `randint` distributions and are meant for sampling.

use super::search_space::{ParameterValue, SearchSpace};
use crate::error::{DatathonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seed baked into the exhaustive grids
pub const GRID_RANDOM_STATE: i64 = 42;

/// Model families with a catalogued grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    #[serde(rename = "xgboost")]
    XGBoost,
    #[serde(rename = "lgbm")]
    LightGBM,
    #[serde(rename = "random_forest")]
    RandomForest,
}

impl ModelFamily {
    /// Catalogue name of the family
    pub fn name(&self) -> &'static str {
        match self {
            ModelFamily::XGBoost => "xgboost",
            ModelFamily::LightGBM => "lgbm",
            ModelFamily::RandomForest => "random_forest",
        }
    }

    /// Grid for exhaustive search
    pub fn exhaustive_grid(&self) -> SearchSpace {
        match self {
            ModelFamily::XGBoost => SearchSpace::new()
                .ints("n_estimators", &[100, 200, 300])
                .floats("learning_rate", &[0.01, 0.1, 0.2])
                .ints("max_depth", &[3, 4, 5])
                .ints("min_child_weight", &[1, 2, 3])
                .floats("gamma", &[0.0, 0.1, 0.2])
                .floats("subsample", &[0.8, 0.9, 1.0])
                .floats("colsample_bytree", &[0.8, 0.9, 1.0])
                .ints("lambda", &[0, 1, 2])
                .ints("alpha", &[0, 1, 2])
                .ints("random_state", &[GRID_RANDOM_STATE]),
            ModelFamily::LightGBM => SearchSpace::new()
                .ints("n_estimators", &[100, 200, 300])
                .floats("learning_rate", &[0.01, 0.1, 0.2])
                .ints("max_depth", &[3, 4, 5, 6])
                .ints("num_leaves", &[15, 31, 63])
                .ints("min_child_samples", &[1, 5, 10])
                .floats("subsample", &[0.8, 0.9, 1.0])
                .floats("colsample_bytree", &[0.8, 0.9, 1.0])
                .ints("reg_alpha", &[0, 1, 2])
                .ints("reg_lambda", &[0, 1, 2])
                .ints("random_state", &[GRID_RANDOM_STATE]),
            ModelFamily::RandomForest => SearchSpace::new()
                .ints("n_estimators", &[10, 50, 100, 200])
                .strings("criterion", &["gini", "entropy"])
                .choice(
                    "max_depth",
                    vec![
                        ParameterValue::Null,
                        ParameterValue::Int(10),
                        ParameterValue::Int(20),
                        ParameterValue::Int(30),
                    ],
                )
                .ints("min_samples_split", &[2, 5, 10])
                .ints("min_samples_leaf", &[1, 2, 4])
                .choice(
                    "max_features",
                    vec![
                        ParameterValue::from("auto"),
                        ParameterValue::from("sqrt"),
                        ParameterValue::from("log2"),
                        ParameterValue::Null,
                    ],
                )
                .ints("random_state", &[GRID_RANDOM_STATE]),
        }
    }

    /// Grid for random search, `None` for families without one
    pub fn random_grid(&self) -> Option<SearchSpace> {
        match self {
            ModelFamily::XGBoost => Some(
                SearchSpace::new()
                    .ints("min_child_weight", &[1, 5, 10])
                    .randint("gamma", 0.5, 10.0)
                    .floats("subsample", &[0.6, 0.8, 1.0])
                    .randint("colsample_bytree", 0.4, 1.0)
                    .randint("max_depth", 1.0, 15.0),
            ),
            ModelFamily::LightGBM => Some(
                SearchSpace::new()
                    .randint("num_leaves", 6.0, 50.0)
                    .randint("min_child_samples", 100.0, 500.0)
                    .floats(
                        "min_child_weight",
                        &[1e-5, 1e-3, 1e-2, 1e-1, 1.0, 1e1, 1e2, 1e3, 1e4],
                    )
                    .uniform("subsample", 0.2, 0.8)
                    .uniform("colsample_bytree", 0.4, 0.6)
                    .floats("reg_alpha", &[0.0, 1e-1, 1.0, 2.0, 5.0, 7.0, 10.0, 50.0, 100.0])
                    .floats("reg_lambda", &[0.0, 1e-1, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]),
            ),
            ModelFamily::RandomForest => None,
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelFamily {
    type Err = DatathonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xgboost" => Ok(ModelFamily::XGBoost),
            "lgbm" => Ok(ModelFamily::LightGBM),
            "random_forest" => Ok(ModelFamily::RandomForest),
            other => Err(DatathonError::ModelNameInexistent(other.to_string())),
        }
    }
}

/// Get the exhaustive grid for `name`
pub fn exhaustive_grid(name: &str) -> Result<SearchSpace> {
    let family: ModelFamily = name.parse()?;
    Ok(family.exhaustive_grid())
}

/// Get the random-search grid for `name`
pub fn random_grid(name: &str) -> Result<SearchSpace> {
    let family: ModelFamily = name.parse()?;
    family
        .random_grid()
        .ok_or_else(|| DatathonError::ModelNameInexistent(name.to_string()))
}
