//! Search space definition for hyperparameters

use crate::error::{DatathonError, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    /// Leave the estimator's own default in place (e.g. unlimited depth)
    Null,
}

impl ParameterValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParameterValue::Null)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Int(v) => write!(f, "{}", v),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::String(v) => write!(f, "{}", v),
            ParameterValue::Bool(v) => write!(f, "{}", v),
            ParameterValue::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        ParameterValue::Int(v as i64)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::String(v.to_string())
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

/// Domain a hyperparameter is drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterDomain {
    /// Explicit list of candidate values
    Choice(Vec<ParameterValue>),
    /// Continuous uniform over `[loc, loc + scale]`
    Uniform { loc: f64, scale: f64 },
    /// Integer uniform over `[low, high)`; bounds are truncated toward zero when sampled
    RandInt { low: f64, high: f64 },
}

impl ParameterDomain {
    /// Whether the domain is a finite list
    pub fn is_discrete(&self) -> bool {
        matches!(self, ParameterDomain::Choice(_))
    }

    /// Candidate values of a discrete domain
    pub fn values(&self) -> Option<&[ParameterValue]> {
        match self {
            ParameterDomain::Choice(values) => Some(values),
            _ => None,
        }
    }

    /// Sample a random value
    pub fn sample(&self, rng: &mut impl Rng) -> ParameterValue {
        match self {
            ParameterDomain::Choice(values) => {
                values.choose(rng).cloned().unwrap_or(ParameterValue::Null)
            }
            ParameterDomain::Uniform { loc, scale } => {
                ParameterValue::Float(loc + rng.gen::<f64>() * scale)
            }
            ParameterDomain::RandInt { low, high } => {
                let low = low.trunc() as i64;
                let high = high.trunc() as i64;
                if high <= low {
                    ParameterValue::Int(low)
                } else {
                    ParameterValue::Int(rng.gen_range(low..high))
                }
            }
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        match self {
            ParameterDomain::Choice(values) if values.is_empty() => {
                Err(DatathonError::ValidationError(format!(
                    "parameter '{}' has an empty list of candidate values",
                    name
                )))
            }
            ParameterDomain::Uniform { loc, scale } if !loc.is_finite() || !scale.is_finite() || *scale < 0.0 => {
                Err(DatathonError::InvalidParameter {
                    name: name.to_string(),
                    value: format!("uniform(loc={}, scale={})", loc, scale),
                    reason: "loc and scale must be finite and scale non-negative".to_string(),
                })
            }
            ParameterDomain::RandInt { low, high } if !low.is_finite() || !high.is_finite() => {
                Err(DatathonError::InvalidParameter {
                    name: name.to_string(),
                    value: format!("randint({}, {})", low, high),
                    reason: "bounds must be finite".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// A single hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub domain: ParameterDomain,
}

impl Parameter {
    /// Create a parameter from an explicit list of values
    pub fn choice(name: impl Into<String>, values: Vec<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            domain: ParameterDomain::Choice(values),
        }
    }

    /// Create a continuous uniform parameter over `[loc, loc + scale]`
    pub fn uniform(name: impl Into<String>, loc: f64, scale: f64) -> Self {
        Self {
            name: name.into(),
            domain: ParameterDomain::Uniform { loc, scale },
        }
    }

    /// Create an integer uniform parameter over `[low, high)`
    pub fn randint(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            domain: ParameterDomain::RandInt { low, high },
        }
    }
}

/// Alias for a sampled configuration
pub type TrialParams = HashMap<String, ParameterValue>;

/// Ordered mapping from hyperparameter name to its domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    /// Create a new empty search space
    pub fn new() -> Self {
        Self {
            parameters: Vec::new(),
        }
    }

    /// Add a parameter, replacing any previous one with the same name
    pub fn add(mut self, param: Parameter) -> Self {
        match self.parameters.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => existing.domain = param.domain,
            None => self.parameters.push(param),
        }
        self
    }

    /// Add a parameter with an explicit list of values
    pub fn choice(self, name: impl Into<String>, values: Vec<ParameterValue>) -> Self {
        self.add(Parameter::choice(name, values))
    }

    /// Add an integer-valued list
    pub fn ints(self, name: impl Into<String>, values: &[i64]) -> Self {
        self.choice(name, values.iter().map(|&v| ParameterValue::Int(v)).collect())
    }

    /// Add a float-valued list
    pub fn floats(self, name: impl Into<String>, values: &[f64]) -> Self {
        self.choice(name, values.iter().map(|&v| ParameterValue::Float(v)).collect())
    }

    /// Add a string-valued list
    pub fn strings(self, name: impl Into<String>, values: &[&str]) -> Self {
        self.choice(name, values.iter().map(|&v| ParameterValue::from(v)).collect())
    }

    /// Add a continuous uniform distribution
    pub fn uniform(self, name: impl Into<String>, loc: f64, scale: f64) -> Self {
        self.add(Parameter::uniform(name, loc, scale))
    }

    /// Add an integer uniform distribution
    pub fn randint(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::randint(name, low, high))
    }

    /// Get all parameters
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up the domain of a parameter
    pub fn get(&self, name: &str) -> Option<&ParameterDomain> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.domain)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Get parameter names in order
    pub fn param_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }

    /// True when every parameter is an explicit list
    pub fn is_discrete(&self) -> bool {
        self.parameters.iter().all(|p| p.domain.is_discrete())
    }

    /// Number of combinations of a discrete space.
    ///
    /// `None` when the space holds a distribution or the count overflows.
    pub fn grid_size(&self) -> Option<usize> {
        self.parameters.iter().try_fold(1usize, |acc, p| {
            p.domain.values().and_then(|v| acc.checked_mul(v.len()))
        })
    }

    /// The `index`-th combination of a discrete space, last parameter varying fastest
    pub fn candidate(&self, index: usize) -> Option<TrialParams> {
        if index >= self.grid_size()? {
            return None;
        }

        let mut remainder = index;
        let mut params = TrialParams::with_capacity(self.parameters.len());
        for param in self.parameters.iter().rev() {
            let values = param.domain.values()?;
            params.insert(param.name.clone(), values[remainder % values.len()].clone());
            remainder /= values.len();
        }
        Some(params)
    }

    /// Every combination of a discrete space, in iteration order
    pub fn grid(&self) -> Result<Vec<TrialParams>> {
        let size = self.grid_size().ok_or_else(|| {
            DatathonError::ValidationError(
                "exhaustive enumeration requires every parameter to be a finite list".to_string(),
            )
        })?;

        Ok((0..size).filter_map(|i| self.candidate(i)).collect())
    }

    /// Sample a random configuration, each parameter independently
    pub fn sample(&self, rng: &mut impl Rng) -> TrialParams {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.domain.sample(rng)))
            .collect()
    }

    /// Check that every domain can produce a value
    pub fn validate(&self) -> Result<()> {
        if self.parameters.is_empty() {
            return Err(DatathonError::ValidationError(
                "search space has no parameters".to_string(),
            ));
        }
        self.parameters
            .iter()
            .try_for_each(|p| p.domain.validate(&p.name))
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self::new()
    }
}
