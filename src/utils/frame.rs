//! DataFrame to ndarray extraction

use crate::error::{DatathonError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Read one column as `f64`, nulls as 0.0
pub fn column_to_array1(df: &DataFrame, col_name: &str) -> Result<Array1<f64>> {
    let series = df
        .column(col_name)
        .map_err(|_| DatathonError::FeatureNotFound(col_name.to_string()))?;
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| DatathonError::DataError(e.to_string()))?;

    let values: Array1<f64> = series_f64
        .f64()
        .map_err(|e| DatathonError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(values)
}

/// Extract named columns into a row-major `Array2<f64>`
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Array1<f64>> = col_names
        .iter()
        .map(|name| column_to_array1(df, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}
