//! Turns collected inputs into the exact row the classifier was trained on
//!
//! The order is fixed: impute numerics, scale numerics, one-hot encode
//! categoricals, then concatenate numerics followed by encoded columns.
//! The concatenation must match the training layout or predictions are
//! silently wrong.

use serde::Serialize;

use super::bundle::ModelBundle;
use super::error::PredictError;
use super::input::{FeatureValue, InputSet};

/// Model-ready feature row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessedVector {
    /// `numeric_cols` followed by the encoder output names
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl PreprocessedVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named output column
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }
}

/// One cell of the raw input row
type Cell<'a> = Option<&'a FeatureValue>;

/// Build the single raw row over `input_cols`; omitted entries are missing
fn raw_row<'a>(
    inputs: &'a InputSet,
    bundle: &ModelBundle,
) -> Result<Vec<(&'a str, Cell<'a>)>, PredictError> {
    bundle
        .input_cols
        .iter()
        .map(|col| {
            inputs
                .iter()
                .find(|(name, _)| *name == col.as_str())
                .map(|(name, value)| (name, value.value()))
                .ok_or_else(|| PredictError::MissingColumn(col.clone()))
        })
        .collect()
}

fn lookup<'a>(row: &[(&str, Cell<'a>)], col: &str) -> Result<Cell<'a>, PredictError> {
    row.iter()
        .find(|(name, _)| *name == col)
        .map(|(_, cell)| *cell)
        .ok_or_else(|| PredictError::MissingColumn(col.to_string()))
}

/// Apply the bundle's imputer, scaler and encoder to the collected inputs.
///
/// # Errors
/// * `MissingColumn` / `ShapeMismatch` when the bundle layout and the inputs
///   disagree (a broken or incompatible bundle)
/// * `FeatureKindMismatch` when a provided value has the wrong kind
/// * `InvalidValue` when a provided number is NaN or infinite
/// * `UnknownCategory` when the encoder rejects a value
pub fn preprocess(
    inputs: &InputSet,
    bundle: &ModelBundle,
) -> Result<PreprocessedVector, PredictError> {
    let row = raw_row(inputs, bundle)?;

    let mut numeric = bundle
        .numeric_cols
        .iter()
        .map(|col| match lookup(&row, col)? {
            None => Ok(f64::NAN),
            Some(FeatureValue::Number(v)) if !v.is_finite() => Err(PredictError::InvalidValue {
                feature: col.clone(),
                value: v.to_string(),
                reason: "value must be finite".to_string(),
            }),
            Some(FeatureValue::Number(v)) => Ok(*v),
            Some(FeatureValue::Category(_)) => Err(PredictError::FeatureKindMismatch {
                feature: col.clone(),
                expected: "numeric",
            }),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    bundle.imputer.transform(&mut numeric)?;
    bundle.scaler.transform(&mut numeric)?;

    let categorical = bundle
        .categorical_cols
        .iter()
        .map(|col| match lookup(&row, col)? {
            None => Ok(None),
            Some(FeatureValue::Category(s)) => Ok(Some(s.as_str())),
            Some(FeatureValue::Number(_)) => Err(PredictError::FeatureKindMismatch {
                feature: col.clone(),
                expected: "categorical",
            }),
        })
        .collect::<Result<Vec<Option<&str>>, _>>()?;

    let encoded = bundle
        .encoder
        .transform(&bundle.categorical_cols, &categorical)?;

    let mut columns = bundle.numeric_cols.clone();
    columns.extend(bundle.encoded_cols());

    let mut values = numeric;
    values.extend(encoded);

    if columns.len() != values.len() {
        return Err(PredictError::ShapeMismatch {
            stage: "concatenation",
            expected: columns.len(),
            actual: values.len(),
        });
    }

    Ok(PreprocessedVector { columns, values })
}

