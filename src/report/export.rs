//! Prediction export functionality

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{Prediction, PredictionResult, PreprocessedVector};

use super::prediction::condition_text;

/// Metadata about the prediction run
#[derive(Serialize)]
pub struct PredictionMetadata {
    /// Timestamp of the prediction (ISO 8601 format)
    pub timestamp: String,
    /// Raincast version
    pub raincast_version: String,
    /// Reference dataset path
    pub dataset_file: String,
    /// Model bundle path
    pub model_file: String,
}

/// One echoed input condition
#[derive(Serialize)]
pub struct ConditionEntry {
    pub feature: String,
    /// Display form of the value (`skipped` when omitted)
    pub value: String,
    pub provided: bool,
}

/// Complete prediction export with metadata
#[derive(Serialize)]
pub struct PredictionExport<'a> {
    pub metadata: PredictionMetadata,
    pub prediction: &'a PredictionResult,
    pub conditions: Vec<ConditionEntry>,
    /// Model-ready row the prediction was made from
    pub model_input: &'a PreprocessedVector,
}

/// Build the export structure for a prediction
pub fn build_export<'a>(
    prediction: &'a Prediction,
    dataset_file: &Path,
    model_file: &Path,
) -> PredictionExport<'a> {
    let conditions = prediction
        .inputs
        .iter()
        .map(|(feature, value)| ConditionEntry {
            feature: feature.to_string(),
            value: condition_text(value),
            provided: value.is_provided(),
        })
        .collect();

    PredictionExport {
        metadata: PredictionMetadata {
            timestamp: Utc::now().to_rfc3339(),
            raincast_version: env!("CARGO_PKG_VERSION").to_string(),
            dataset_file: dataset_file.display().to_string(),
            model_file: model_file.display().to_string(),
        },
        prediction: &prediction.result,
        conditions,
        model_input: &prediction.vector,
    }
}

/// Export a prediction to a JSON file
///
/// # Arguments
/// * `prediction` - The prediction with its inputs
/// * `output_path` - Path to write the JSON file
/// * `dataset_file` / `model_file` - Recorded in the metadata
pub fn export_prediction(
    prediction: &Prediction,
    output_path: &Path,
    dataset_file: &Path,
    model_file: &Path,
) -> Result<()> {
    let export = build_export(prediction, dataset_file, model_file);

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize prediction to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write prediction to {}", output_path.display()))?;

    Ok(())
}
