//! Fitted preprocessing transforms persisted in the model bundle
//!
//! These only apply learned parameters; fitting happens at training time.

use serde::{Deserialize, Serialize};

use super::error::PredictError;

/// Statistic the imputer was fitted with. Informational only: the learned
/// fill values are in [`Imputer::statistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    #[default]
    Mean,
    Median,
    MostFrequent,
    Constant,
}

/// Fills missing (NaN) numeric values with per-column statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputer {
    #[serde(default)]
    pub strategy: ImputeStrategy,
    /// One fill value per numeric column
    pub statistics: Vec<f64>,
}

impl Imputer {
    pub fn n_features(&self) -> usize {
        self.statistics.len()
    }

    pub fn transform(&self, row: &mut [f64]) -> Result<(), PredictError> {
        check_width("imputer", self.statistics.len(), row.len())?;
        for (value, fill) in row.iter_mut().zip(&self.statistics) {
            if value.is_nan() {
                *value = *fill;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), PredictError> {
        if self.statistics.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::InvalidBundle(
                "imputer statistics must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fitted numeric scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - data_min) / (data_max - data_min)` mapped onto `feature_range`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Zero-width ranges scale by one instead of dividing by zero
fn handle_zero(width: f64) -> f64 {
    if width == 0.0 {
        1.0
    } else {
        width
    }
}

impl Scaler {
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::MinMax { data_min, .. } => data_min.len(),
            Scaler::Standard { mean, .. } => mean.len(),
        }
    }

    pub fn transform(&self, row: &mut [f64]) -> Result<(), PredictError> {
        check_width("scaler", self.n_features(), row.len())?;
        match self {
            Scaler::MinMax {
                data_min,
                data_max,
                feature_range: (low, high),
            } => {
                for ((value, min), max) in row.iter_mut().zip(data_min).zip(data_max) {
                    let scale = (high - low) / handle_zero(max - min);
                    let offset = low - min * scale;
                    *value = *value * scale + offset;
                }
            }
            Scaler::Standard { mean, scale } => {
                for ((value, mu), sigma) in row.iter_mut().zip(mean).zip(scale) {
                    *value = (*value - mu) / handle_zero(*sigma);
                }
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), PredictError> {
        let (a, b) = match self {
            Scaler::MinMax {
                data_min, data_max, ..
            } => (data_min.len(), data_max.len()),
            Scaler::Standard { mean, scale } => (mean.len(), scale.len()),
        };
        if a != b {
            return Err(PredictError::InvalidBundle(format!(
                "scaler parameter lengths differ ({} vs {})",
                a, b
            )));
        }
        Ok(())
    }
}

/// What the encoder does with a value outside its vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Encode as an all-zero block
    Ignore,
}

/// One-hot encoder over a fixed, training-time vocabulary.
///
/// A `null` category in the vocabulary matches missing values; without one,
/// a missing value is treated like any other unknown category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Vocabulary per categorical column, in output order
    pub categories: Vec<Vec<Option<String>>>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

/// Label used in output column names for the missing-value category
const MISSING_CATEGORY_LABEL: &str = "nan";

impl OneHotEncoder {
    pub fn n_features_in(&self) -> usize {
        self.categories.len()
    }

    /// Total width of the encoded block
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Output column names, `<feature>_<category>`
    pub fn feature_names_out<S: AsRef<str>>(&self, input_features: &[S]) -> Vec<String> {
        input_features
            .iter()
            .zip(&self.categories)
            .flat_map(|(feature, categories)| {
                categories.iter().map(move |category| {
                    format!(
                        "{}_{}",
                        feature.as_ref(),
                        category.as_deref().unwrap_or(MISSING_CATEGORY_LABEL)
                    )
                })
            })
            .collect()
    }

    /// Encode one row of categorical values (`None` = missing)
    pub fn transform<S: AsRef<str>>(
        &self,
        input_features: &[S],
        row: &[Option<&str>],
    ) -> Result<Vec<f64>, PredictError> {
        check_width("encoder", self.categories.len(), row.len())?;
        check_width("encoder feature names", self.categories.len(), input_features.len())?;

        let mut encoded = Vec::with_capacity(self.n_features_out());
        for ((value, categories), feature) in row.iter().zip(&self.categories).zip(input_features) {
            let position = categories
                .iter()
                .position(|category| category.as_deref() == *value);

            match (position, self.handle_unknown) {
                (Some(hot), _) => {
                    encoded.extend((0..categories.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
                }
                (None, HandleUnknown::Ignore) => {
                    encoded.extend(std::iter::repeat(0.0).take(categories.len()));
                }
                (None, HandleUnknown::Error) => {
                    return Err(PredictError::UnknownCategory {
                        feature: feature.as_ref().to_string(),
                        value: value.unwrap_or(MISSING_CATEGORY_LABEL).to_string(),
                    });
                }
            }
        }
        Ok(encoded)
    }

    fn validate(&self) -> Result<(), PredictError> {
        if let Some(i) = self.categories.iter().position(Vec::is_empty) {
            return Err(PredictError::InvalidBundle(format!(
                "encoder vocabulary {} is empty",
                i
            )));
        }
        Ok(())
    }
}

fn check_width(stage: &'static str, expected: usize, actual: usize) -> Result<(), PredictError> {
    if expected != actual {
        return Err(PredictError::ShapeMismatch {
            stage,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Validate the internal consistency of all three transforms
pub(crate) fn validate_transforms(
    imputer: &Imputer,
    scaler: &Scaler,
    encoder: &OneHotEncoder,
) -> Result<(), PredictError> {
    imputer.validate()?;
    scaler.validate()?;
    encoder.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imputer_fills_only_missing() {
        let imputer = Imputer {
            strategy: ImputeStrategy::Mean,
            statistics: vec![10.0, 20.0, 30.0],
        };
        let mut row = [1.0, f64::NAN, 3.0];
        imputer.transform(&mut row).unwrap();
        assert_eq!(row, [1.0, 20.0, 3.0]);
    }

    #[test]
    fn test_imputer_width_mismatch() {
        let imputer = Imputer {
            strategy: ImputeStrategy::Median,
            statistics: vec![1.0],
        };
        let err = imputer.transform(&mut [1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::ShapeMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_min_max_scaler() {
        let scaler = Scaler::MinMax {
            data_min: vec![0.0, -10.0, 5.0],
            data_max: vec![100.0, 40.0, 5.0],
            feature_range: (0.0, 1.0),
        };
        let mut row = [80.0, 10.0, 5.0];
        scaler.transform(&mut row).unwrap();
        assert!((row[0] - 0.8).abs() < 1e-12);
        assert!((row[1] - 0.4).abs() < 1e-12);
        // constant column: scale of one keeps the offset at zero
        assert!((row[2] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_scaler() {
        let scaler = Scaler::Standard {
            mean: vec![50.0, 0.0],
            scale: vec![10.0, 0.0],
        };
        let mut row = [65.0, 3.0];
        scaler.transform(&mut row).unwrap();
        assert!((row[0] - 1.5).abs() < 1e-12);
        assert!((row[1] - 3.0).abs() < 1e-12);
    }

    fn encoder(handle_unknown: HandleUnknown) -> OneHotEncoder {
        OneHotEncoder {
            categories: vec![
                vec![Some("Melbourne".to_string()), Some("Sydney".to_string())],
                vec![Some("No".to_string()), Some("Yes".to_string()), None],
            ],
            handle_unknown,
        }
    }

    #[test]
    fn test_encoder_feature_names() {
        let names = encoder(HandleUnknown::Ignore).feature_names_out(&["Location", "RainToday"]);
        assert_eq!(
            names,
            vec![
                "Location_Melbourne",
                "Location_Sydney",
                "RainToday_No",
                "RainToday_Yes",
                "RainToday_nan"
            ]
        );
    }

    #[test]
    fn test_encoder_one_hot_and_null_category() {
        let enc = encoder(HandleUnknown::Error);
        let out = enc
            .transform(&["Location", "RainToday"], &[Some("Sydney"), None])
            .unwrap();
        assert_eq!(out, vec![0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encoder_unknown_ignore_gives_zero_block() {
        let enc = encoder(HandleUnknown::Ignore);
        let out = enc
            .transform(&["Location", "RainToday"], &[Some("Perth"), Some("Yes")])
            .unwrap();
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_encoder_unknown_error() {
        let enc = encoder(HandleUnknown::Error);
        let err = enc
            .transform(&["Location", "RainToday"], &[Some("Perth"), Some("Yes")])
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::UnknownCategory { feature, value } if feature == "Location" && value == "Perth"
        ));
    }

    #[test]
    fn test_encoder_missing_without_null_category_is_unknown() {
        let enc = encoder(HandleUnknown::Error);
        let err = enc
            .transform(&["Location", "RainToday"], &[None, Some("Yes")])
            .unwrap_err();
        assert!(matches!(err, PredictError::UnknownCategory { .. }));
    }
}
