//! Error types for the inference pipeline.
//!
//! Configuration errors (schema inference, bundle consistency, bundle/dataset
//! mismatch) are fatal for the process. Request errors (missing mandatory
//! input, unknown category, wrong value kind) are fatal for one prediction.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while building the feature schema, validating the model
/// bundle, or running a single prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Column storage type is neither string-like nor integer/float.
    #[error("Unsupported feature type for '{feature}': {dtype}")]
    UnsupportedFeatureType { feature: String, dtype: String },

    /// Feature name is not part of the form.
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),

    /// A form feature is not a column of the reference dataset.
    #[error("Feature '{0}' is not a column of the reference dataset")]
    MissingDatasetColumn(String),

    /// Numeric column has no non-null values, so no domain can be derived.
    #[error("Feature '{0}' has no non-null values in the reference dataset")]
    EmptyColumn(String),

    /// A mandatory feature was not provided.
    #[error("Missing required input: '{0}'")]
    MissingRequiredInput(String),

    /// A raw value could not be interpreted for the feature's kind.
    #[error("Invalid value '{value}' for feature '{feature}': {reason}")]
    InvalidValue {
        feature: String,
        value: String,
        reason: String,
    },

    /// A provided value has the wrong kind for its column.
    #[error("Feature '{feature}' expects a {expected} value")]
    FeatureKindMismatch {
        feature: String,
        expected: &'static str,
    },

    /// Model bundle and reference dataset disagree on the feature set.
    #[error("Model bundle does not match the reference dataset: {0}")]
    BundleSchemaMismatch(String),

    /// Model bundle is internally inconsistent.
    #[error("Invalid model bundle: {0}")]
    InvalidBundle(String),

    /// A column the bundle expects has no entry in the collected inputs.
    #[error("Input row has no value for model column '{0}'")]
    MissingColumn(String),

    /// Row width does not match what a transform or the classifier expects.
    #[error("Shape mismatch in {stage}: expected {expected} columns, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Categorical value outside the encoder vocabulary, with `handle_unknown = error`.
    #[error("Unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PredictError {
    /// Whether the error indicates a broken installation (dataset or bundle)
    /// rather than a bad request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PredictError::UnsupportedFeatureType { .. }
                | PredictError::MissingDatasetColumn(_)
                | PredictError::EmptyColumn(_)
                | PredictError::BundleSchemaMismatch(_)
                | PredictError::InvalidBundle(_)
                | PredictError::MissingColumn(_)
                | PredictError::ShapeMismatch { .. }
                | PredictError::Polars(_)
        )
    }
}
