//! Fixed feature lists of the prediction form

/// Features that must always be provided
pub const MANDATORY_FEATURES: [&str; 1] = ["Location"];

/// Features the user may skip, in solicitation order
pub const OPTIONAL_FEATURES: [&str; 20] = [
    "Humidity9am",
    "Humidity3pm",
    "Evaporation",
    "Rainfall",
    "WindGustDir",
    "WindGustSpeed",
    "WindDir9am",
    "WindDir3pm",
    "WindSpeed9am",
    "WindSpeed3pm",
    "MinTemp",
    "MaxTemp",
    "Temp9am",
    "Temp3pm",
    "Sunshine",
    "Pressure9am",
    "Pressure3pm",
    "Cloud9am",
    "Cloud3pm",
    "RainToday",
];

/// Numeric features with long-tailed outliers; their input range is capped
pub const OUTLIER_CAPPED_FEATURES: [&str; 2] = ["Rainfall", "Evaporation"];

/// Quantile used as the upper bound for outlier-capped features
pub const OUTLIER_QUANTILE: f64 = 0.98;

/// Target column of the reference dataset
pub const TARGET_COLUMN: &str = "RainTomorrow";

/// Column grouping the statistics view
pub const LOCATION_COLUMN: &str = "Location";

/// Features summarized by default in the statistics view
pub const DEFAULT_STATS_FEATURES: [&str; 4] = ["Humidity3pm", "Pressure3pm", "MinTemp", "MaxTemp"];

/// Ordered feature layout of the prediction form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    pub mandatory: Vec<String>,
    pub optional: Vec<String>,
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self {
            mandatory: MANDATORY_FEATURES.iter().map(|s| s.to_string()).collect(),
            optional: OPTIONAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FeatureLayout {
    pub fn new(mandatory: Vec<String>, optional: Vec<String>) -> Self {
        Self {
            mandatory,
            optional,
        }
    }

    /// All features in solicitation order: mandatory first, then optional
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.mandatory
            .iter()
            .chain(self.optional.iter())
            .map(|s| s.as_str())
    }

    pub fn is_mandatory(&self, feature: &str) -> bool {
        self.mandatory.iter().any(|f| f == feature)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.all().any(|f| f == feature)
    }

    pub fn len(&self) -> usize {
        self.mandatory.len() + self.optional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
