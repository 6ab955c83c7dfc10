//! Model bundle: the classifier plus every fitted transform and the column
//! ordering recorded at training time.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::PredictError;
use super::features::FeatureLayout;
use super::model::{Classifier, ClassifierModel};
use super::schema::{FeatureKind, FeatureSchema};
use super::transform::{validate_transforms, Imputer, OneHotEncoder, Scaler};

/// Persisted model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: ClassifierModel,
    pub imputer: Imputer,
    pub scaler: Scaler,
    pub encoder: OneHotEncoder,
    /// Feature names expected before encoding, in training order
    pub input_cols: Vec<String>,
    pub numeric_cols: Vec<String>,
    pub categorical_cols: Vec<String>,
}

impl ModelBundle {
    /// Load a bundle from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model bundle: {}", path.display()))?;
        let bundle: ModelBundle = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse model bundle: {}", path.display()))?;
        bundle
            .validate()
            .with_context(|| format!("Model bundle is unusable: {}", path.display()))?;
        Ok(bundle)
    }

    /// Write the bundle as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize model bundle")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write model bundle to {}", path.display()))?;
        Ok(())
    }

    /// Names of the encoded categorical columns, in output order
    pub fn encoded_cols(&self) -> Vec<String> {
        self.encoder.feature_names_out(&self.categorical_cols)
    }

    /// Width of the vector fed to the classifier
    pub fn n_model_features(&self) -> usize {
        self.numeric_cols.len() + self.encoder.n_features_out()
    }

    /// Check that column lists and transform parameters agree with each other
    pub fn validate(&self) -> Result<(), PredictError> {
        let mut seen = HashSet::new();
        if let Some(dup) = self.input_cols.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(PredictError::InvalidBundle(format!(
                "input_cols lists '{}' twice",
                dup
            )));
        }

        for col in self.numeric_cols.iter().chain(&self.categorical_cols) {
            if !seen.contains(col.as_str()) {
                return Err(PredictError::InvalidBundle(format!(
                    "'{}' is not listed in input_cols",
                    col
                )));
            }
        }
        if let Some(both) = self
            .numeric_cols
            .iter()
            .find(|c| self.categorical_cols.contains(c))
        {
            return Err(PredictError::InvalidBundle(format!(
                "'{}' is both numeric and categorical",
                both
            )));
        }
        if self.numeric_cols.len() + self.categorical_cols.len() != self.input_cols.len() {
            return Err(PredictError::InvalidBundle(
                "numeric_cols and categorical_cols do not partition input_cols".to_string(),
            ));
        }

        let n_numeric = self.numeric_cols.len();
        check_len("imputer statistics", n_numeric, self.imputer.n_features())?;
        check_len("scaler parameters", n_numeric, self.scaler.n_features())?;
        check_len(
            "encoder vocabularies",
            self.categorical_cols.len(),
            self.encoder.n_features_in(),
        )?;
        validate_transforms(&self.imputer, &self.scaler, &self.encoder)?;

        self.model.validate()?;
        check_len(
            "classifier features",
            self.n_model_features(),
            self.model.n_features(),
        )
    }

    /// Check the bundle against the live reference dataset schema.
    ///
    /// Every `input_cols` feature must exist in the schema with the same kind,
    /// and every form feature must be consumed by the model.
    pub fn check_compatibility(
        &self,
        schema: &FeatureSchema,
        layout: &FeatureLayout,
    ) -> Result<(), PredictError> {
        for col in &self.input_cols {
            let spec = schema.describe(col).map_err(|_| {
                PredictError::BundleSchemaMismatch(format!(
                    "model column '{}' is not a feature of the reference dataset",
                    col
                ))
            })?;
            let expects_numeric = self.numeric_cols.contains(col);
            match (&spec.kind, expects_numeric) {
                (FeatureKind::Numeric(_), true) | (FeatureKind::Categorical { .. }, false) => {}
                (kind, _) => {
                    return Err(PredictError::BundleSchemaMismatch(format!(
                        "'{}' is {} in the dataset but {} in the model",
                        col,
                        kind.label(),
                        if expects_numeric { "numeric" } else { "categorical" }
                    )))
                }
            }
        }

        if let Some(unused) = layout.all().find(|f| !self.input_cols.iter().any(|c| c == f)) {
            return Err(PredictError::BundleSchemaMismatch(format!(
                "form feature '{}' is not a model input column",
                unused
            )));
        }
        Ok(())
    }
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), PredictError> {
    if expected != actual {
        return Err(PredictError::InvalidBundle(format!(
            "{} cover {} columns, expected {}",
            what, actual, expected
        )));
    }
    Ok(())
}
