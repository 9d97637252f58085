//! CSV dataset loading

use super::{Dataset, FeatureVector, Label, TrainingExample, FEATURE_NAMES, N_FEATURES, TARGET_COLUMN};
use crate::error::{Result, ScoutError};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Load a labelled dataset from a CSV file with a header row.
///
/// The eight feature columns and `is_pro` must all be present; any other
/// columns are ignored. Column order in the file does not matter, the
/// returned dataset always uses [`FEATURE_NAMES`] order.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ScoutError::DatasetError(format!("cannot open {}: {}", path.display(), e)))?
        .finish()
        .map_err(|e| ScoutError::DatasetError(format!("cannot parse {}: {}", path.display(), e)))?;

    let dataset = dataset_from_frame(&df)?;
    let (not_pro, pro) = dataset.class_counts();
    info!(
        path = %path.display(),
        rows = dataset.len(),
        not_pro,
        pro,
        "Loaded training dataset"
    );

    Ok(dataset)
}

/// Build a dataset from an already-loaded frame
pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset> {
    let columns = FEATURE_NAMES
        .iter()
        .map(|name| numeric_column(df, name))
        .collect::<Result<Vec<_>>>()?;
    let labels = numeric_column(df, TARGET_COLUMN)?;

    let examples = labels
        .iter()
        .enumerate()
        .map(|(row, &raw_label)| {
            let mut values = [0.0; N_FEATURES];
            for (j, column) in columns.iter().enumerate() {
                values[j] = column[row];
            }
            let label = Label::from_value(raw_label).map_err(|_| {
                ScoutError::DatasetError(format!(
                    "row {}: column `{}` must be 0 or 1, got {}",
                    row + 1,
                    TARGET_COLUMN,
                    raw_label
                ))
            })?;
            Ok(TrainingExample::new(FeatureVector::from_array(values), label))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset::new(examples))
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| ScoutError::DatasetError(format!("missing required column `{}`", name)))?;

    // Non-strict cast: unparseable cells become nulls and are reported below
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|_| ScoutError::DatasetError(format!("column `{}` is not numeric", name)))?;

    let nulls = series.null_count();
    if nulls > 0 {
        return Err(ScoutError::DatasetError(format!(
            "column `{}` has {} missing or non-numeric values",
            name, nulls
        )));
    }

    let ca = series
        .f64()
        .map_err(|e| ScoutError::DatasetError(format!("column `{}`: {}", name, e)))?;

    let values: Vec<f64> = ca.into_no_null_iter().collect();
    if let Some(row) = values.iter().position(|v| !v.is_finite()) {
        return Err(ScoutError::DatasetError(format!(
            "row {}: column `{}` must be finite, got {}",
            row + 1,
            name,
            values[row]
        )));
    }

    Ok(values)
}
