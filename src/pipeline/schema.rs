//! Feature schema derived from the reference dataset
//!
//! Each feature is resolved once into a tagged [`FeatureKind`]: categorical
//! columns carry their observed vocabulary, numeric columns the
//! `(min, max, mean)` domain used to bound and default the input form.

use std::collections::HashSet;

use polars::prelude::*;
use serde::Serialize;

use super::error::PredictError;
use super::features::{OUTLIER_CAPPED_FEATURES, OUTLIER_QUANTILE};
use super::input::FeatureValue;

/// Value domain of a numeric feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericDomain {
    pub min: f64,
    /// True maximum, or the outlier-trimmed quantile for capped features
    pub max: f64,
    pub mean: f64,
}

impl NumericDomain {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Value offered when the user accepts the default: the mean, kept
    /// inside `[min, max]` since a capped max can fall below the mean
    pub fn default_input(&self) -> f64 {
        self.mean.max(self.min).min(self.max)
    }
}

/// Kind of a feature together with its valid domain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Distinct non-null values in first-seen order
    Categorical { values: Vec<String> },
    Numeric(NumericDomain),
}

impl FeatureKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FeatureKind::Numeric(_))
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureKind::Categorical { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeatureKind::Categorical { .. } => "categorical",
            FeatureKind::Numeric(_) => "numeric",
        }
    }
}

/// Schema entry for a single feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

impl FeatureSpec {
    /// Interpret a raw user-supplied string according to the feature kind.
    ///
    /// Categorical values are not checked against the observed vocabulary;
    /// unseen categories are the encoder's concern.
    pub fn parse(&self, raw: &str) -> Result<FeatureValue, PredictError> {
        let trimmed = raw.trim();
        match &self.kind {
            FeatureKind::Categorical { .. } => {
                if trimmed.is_empty() {
                    return Err(PredictError::InvalidValue {
                        feature: self.name.clone(),
                        value: raw.to_string(),
                        reason: "empty category".to_string(),
                    });
                }
                Ok(FeatureValue::Category(trimmed.to_string()))
            }
            FeatureKind::Numeric(_) => {
                let value = trimmed
                    .parse::<f64>()
                    .map_err(|e| PredictError::InvalidValue {
                        feature: self.name.clone(),
                        value: raw.to_string(),
                        reason: e.to_string(),
                    })?;
                if !value.is_finite() {
                    return Err(PredictError::InvalidValue {
                        feature: self.name.clone(),
                        value: raw.to_string(),
                        reason: "value must be finite".to_string(),
                    });
                }
                Ok(FeatureValue::Number(value))
            }
        }
    }
}

/// Immutable feature schema, computed once per process
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// Derive schema entries for `features` from the reference dataset.
    ///
    /// # Arguments
    /// * `df` - The reference dataset
    /// * `features` - Feature names to describe, in the order to keep them
    pub fn from_dataframe<S: AsRef<str>>(
        df: &DataFrame,
        features: &[S],
    ) -> Result<Self, PredictError> {
        let features = features
            .iter()
            .map(|name| describe_column(df, name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { features })
    }

    /// Look up the schema entry of a feature
    pub fn describe(&self, name: &str) -> Result<&FeatureSpec, PredictError> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| PredictError::UnknownFeature(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name)
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Resolve one column into a schema entry
fn describe_column(df: &DataFrame, name: &str) -> Result<FeatureSpec, PredictError> {
    if df.get_column_index(name).is_none() {
        return Err(PredictError::MissingDatasetColumn(name.to_string()));
    }
    let column = df.column(name)?;

    let kind = match column.dtype() {
        DataType::String => FeatureKind::Categorical {
            values: distinct_values(column)?,
        },
        DataType::Categorical(..) | DataType::Enum(..) => FeatureKind::Categorical {
            values: distinct_values(&column.cast(&DataType::String)?)?,
        },
        dtype if dtype.is_primitive_numeric() => {
            FeatureKind::Numeric(numeric_domain(name, column)?)
        }
        other => {
            return Err(PredictError::UnsupportedFeatureType {
                feature: name.to_string(),
                dtype: other.to_string(),
            })
        }
    };

    Ok(FeatureSpec {
        name: name.to_string(),
        kind,
    })
}

/// Distinct non-null values in first-seen order
fn distinct_values(column: &Column) -> Result<Vec<String>, PredictError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut values = Vec::new();
    for value in column.str()?.into_iter().flatten() {
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

fn numeric_domain(name: &str, column: &Column) -> Result<NumericDomain, PredictError> {
    let float_col = column.cast(&DataType::Float64)?;
    let mut values: Vec<f64> = float_col
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();

    if values.is_empty() {
        return Err(PredictError::EmptyColumn(name.to_string()));
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let min = values[0];
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let max = if OUTLIER_CAPPED_FEATURES.contains(&name) {
        quantile_sorted(&values, OUTLIER_QUANTILE)
    } else {
        values[values.len() - 1]
    };

    Ok(NumericDomain { min, max, mean })
}

/// Quantile of pre-sorted values with linear interpolation between the two
/// nearest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let position = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
