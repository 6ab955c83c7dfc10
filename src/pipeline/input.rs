//! Collected prediction inputs
//!
//! An [`InputSet`] is built once per request, either through
//! [`InputSetBuilder`] or by walking a [`FeaturePrompter`] over the form
//! layout, and is never mutated afterwards.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use serde::Serialize;

use super::error::PredictError;
use super::features::FeatureLayout;
use super::schema::{FeatureKind, FeatureSchema, NumericDomain};
use crate::utils::round2;

/// A concrete feature value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(s) => Some(s),
            FeatureValue::Number(_) => None,
        }
    }
}

/// Numbers are shown rounded to 2 decimals, categories as-is
impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(v) => write!(f, "{:.2}", round2(*v)),
            FeatureValue::Category(s) => write!(f, "{}", s),
        }
    }
}

/// Value of one feature in a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputValue {
    Provided(FeatureValue),
    Omitted,
}

impl InputValue {
    pub fn is_provided(&self) -> bool {
        matches!(self, InputValue::Provided(_))
    }

    pub fn value(&self) -> Option<&FeatureValue> {
        match self {
            InputValue::Provided(v) => Some(v),
            InputValue::Omitted => None,
        }
    }
}

/// One entry per form feature, in solicitation order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSet {
    entries: Vec<(String, InputValue)>,
}

impl InputSet {
    pub fn builder(layout: &FeatureLayout) -> InputSetBuilder<'_> {
        InputSetBuilder::new(layout)
    }

    pub fn get(&self, feature: &str) -> Option<&InputValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn provided_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_provided()).count()
    }

    /// Fail if any mandatory feature of `layout` is not provided
    pub fn ensure_mandatory(&self, layout: &FeatureLayout) -> Result<(), PredictError> {
        for feature in &layout.mandatory {
            match self.get(feature) {
                Some(InputValue::Provided(_)) => {}
                _ => return Err(PredictError::MissingRequiredInput(feature.clone())),
            }
        }
        Ok(())
    }
}

/// Builder producing a complete [`InputSet`] for a layout.
///
/// Optional features that were never set become [`InputValue::Omitted`].
#[derive(Debug)]
pub struct InputSetBuilder<'a> {
    layout: &'a FeatureLayout,
    values: HashMap<String, InputValue>,
}

impl<'a> InputSetBuilder<'a> {
    pub fn new(layout: &'a FeatureLayout) -> Self {
        Self {
            layout,
            values: HashMap::new(),
        }
    }

    pub fn provide(mut self, feature: &str, value: FeatureValue) -> Self {
        self.values
            .insert(feature.to_string(), InputValue::Provided(value));
        self
    }

    pub fn omit(mut self, feature: &str) -> Self {
        self.values.insert(feature.to_string(), InputValue::Omitted);
        self
    }

    /// Parse `raw` with the feature's schema entry and provide it
    pub fn provide_raw(
        self,
        schema: &FeatureSchema,
        feature: &str,
        raw: &str,
    ) -> Result<Self, PredictError> {
        let value = schema.describe(feature)?.parse(raw)?;
        Ok(self.provide(feature, value))
    }

    pub fn build(mut self) -> Result<InputSet, PredictError> {
        let layout = self.layout;
        if let Some(unknown) = self.values.keys().find(|k| !layout.contains(k.as_str())) {
            return Err(PredictError::UnknownFeature(unknown.clone()));
        }

        let mut entries = Vec::with_capacity(layout.len());
        for feature in layout.all() {
            let value = self.values.remove(feature).unwrap_or(InputValue::Omitted);
            if layout.is_mandatory(feature) && !value.is_provided() {
                return Err(PredictError::MissingRequiredInput(feature.to_string()));
            }
            entries.push((feature.to_string(), value));
        }

        Ok(InputSet { entries })
    }
}

/// Source of user answers for the prediction form
pub trait FeaturePrompter {
    /// Ask whether an optional feature should be skipped
    fn skip(&mut self, feature: &str) -> Result<bool>;

    /// Ask for one of the observed categories
    fn choose(&mut self, feature: &str, options: &[String]) -> Result<String>;

    /// Ask for a number within `domain`, defaulting to its mean
    fn number(&mut self, feature: &str, domain: &NumericDomain) -> Result<f64>;
}

/// Walk the form layout and collect one value per feature.
///
/// Mandatory features are always solicited; each optional feature is first
/// offered a skip.
pub fn collect_inputs(
    schema: &FeatureSchema,
    layout: &FeatureLayout,
    prompter: &mut dyn FeaturePrompter,
) -> Result<InputSet> {
    let mut builder = InputSet::builder(layout);

    for feature in layout.all() {
        let optional = !layout.is_mandatory(feature);
        if optional && prompter.skip(feature)? {
            builder = builder.omit(feature);
            continue;
        }

        let value = match &schema.describe(feature)?.kind {
            FeatureKind::Categorical { values } => {
                FeatureValue::Category(prompter.choose(feature, values)?)
            }
            FeatureKind::Numeric(domain) => FeatureValue::Number(prompter.number(feature, domain)?),
        };
        builder = builder.provide(feature, value);
    }

    Ok(builder.build()?)
}
