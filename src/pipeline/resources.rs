//! Process-wide, read-only resources
//!
//! The reference dataset, the schema derived from it and the model bundle are
//! loaded on first use and shared as immutable `Arc`s afterwards. Both files
//! are static for the process lifetime, so nothing is ever invalidated.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;

use super::bundle::ModelBundle;
use super::features::FeatureLayout;
use super::loader::read_dataset;
use super::predict::RainPredictor;
use super::schema::FeatureSchema;

/// Where the resources live on disk
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub infer_schema_length: usize,
    pub layout: FeatureLayout,
}

/// Lazily loaded dataset, schema and model bundle
#[derive(Debug)]
pub struct Resources {
    config: ResourceConfig,
    dataset: OnceLock<Arc<DataFrame>>,
    schema: OnceLock<Arc<FeatureSchema>>,
    bundle: OnceLock<Arc<ModelBundle>>,
}

impl Resources {
    pub fn new(config: ResourceConfig) -> Self {
        Self {
            config,
            dataset: OnceLock::new(),
            schema: OnceLock::new(),
            bundle: OnceLock::new(),
        }
    }

    /// Resources over an already loaded dataset (no dataset file is read)
    pub fn with_dataset(config: ResourceConfig, df: DataFrame) -> Self {
        let resources = Self::new(config);
        let _ = resources.dataset.set(Arc::new(df));
        resources
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn dataset(&self) -> Result<Arc<DataFrame>> {
        if let Some(df) = self.dataset.get() {
            return Ok(Arc::clone(df));
        }
        let df = read_dataset(&self.config.dataset_path, self.config.infer_schema_length)?;
        Ok(Arc::clone(self.dataset.get_or_init(|| Arc::new(df))))
    }

    /// Schema of the form features, derived once from the dataset
    pub fn schema(&self) -> Result<Arc<FeatureSchema>> {
        if let Some(schema) = self.schema.get() {
            return Ok(Arc::clone(schema));
        }
        let df = self.dataset()?;
        let features: Vec<&str> = self.config.layout.all().collect();
        let schema = FeatureSchema::from_dataframe(&df, &features).with_context(|| {
            format!(
                "Failed to derive feature schema from {}",
                self.config.dataset_path.display()
            )
        })?;
        Ok(Arc::clone(self.schema.get_or_init(|| Arc::new(schema))))
    }

    pub fn bundle(&self) -> Result<Arc<ModelBundle>> {
        if let Some(bundle) = self.bundle.get() {
            return Ok(Arc::clone(bundle));
        }
        let bundle = ModelBundle::load(&self.config.model_path)?;
        Ok(Arc::clone(self.bundle.get_or_init(|| Arc::new(bundle))))
    }

    /// Predictor wired to the shared schema and bundle
    pub fn predictor(&self) -> Result<RainPredictor> {
        let predictor =
            RainPredictor::new(self.schema()?, self.bundle()?, self.config.layout.clone())
                .context("Model bundle and reference dataset are incompatible")?;
        Ok(predictor)
    }

    pub fn is_dataset_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    pub fn is_bundle_loaded(&self) -> bool {
        self.bundle.get().is_some()
    }
}
