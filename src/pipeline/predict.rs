//! Prediction over a preprocessed row

use std::sync::Arc;

use serde::Serialize;

use super::bundle::ModelBundle;
use super::error::PredictError;
use super::features::FeatureLayout;
use super::input::InputSet;
use super::model::Classifier;
use super::preprocess::{preprocess, PreprocessedVector};
use super::schema::FeatureSchema;
use crate::utils::round2;

/// Predicted label with the confidence in that label, in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: String,
    /// Max over class probabilities × 100, rounded to 2 decimals
    pub probability: f64,
}

/// Classify one preprocessed row.
///
/// The probability reported is always that of the predicted class, whichever
/// direction was predicted.
pub fn predict<C: Classifier + ?Sized>(
    vector: &PreprocessedVector,
    classifier: &C,
) -> Result<PredictionResult, PredictError> {
    let (label, proba) = classifier.predict(&vector.values)?;
    let max = proba.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(PredictionResult {
        label,
        probability: round2(max * 100.0),
    })
}

/// A prediction together with the inputs it was made from
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub result: PredictionResult,
    pub inputs: InputSet,
    pub vector: PreprocessedVector,
}

/// Runs the full request pipeline against shared, read-only resources
#[derive(Debug, Clone)]
pub struct RainPredictor {
    schema: Arc<FeatureSchema>,
    bundle: Arc<ModelBundle>,
    layout: FeatureLayout,
}

impl RainPredictor {
    /// Build a predictor after checking the bundle against the dataset schema
    /// and for internal consistency
    pub fn new(
        schema: Arc<FeatureSchema>,
        bundle: Arc<ModelBundle>,
        layout: FeatureLayout,
    ) -> Result<Self, PredictError> {
        bundle.check_compatibility(&schema, &layout)?;
        bundle.validate()?;
        Ok(Self {
            schema,
            bundle,
            layout,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Preprocess `inputs` and classify them
    pub fn predict(&self, inputs: &InputSet) -> Result<Prediction, PredictError> {
        inputs.ensure_mandatory(&self.layout)?;
        let vector = preprocess(inputs, &self.bundle)?;
        let result = predict(&vector, &self.bundle.model)?;
        Ok(Prediction {
            result,
            inputs: inputs.clone(),
            vector,
        })
    }
}
