//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use raincast::pipeline::{
    ClassifierModel, DecisionTree, FeatureLayout, FeatureSchema, HandleUnknown, ImputeStrategy,
    Imputer, InputSet, ModelBundle, OneHotEncoder, RandomForest, Scaler, TREE_LEAF,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// Numeric model columns with their fixture (min, max, imputer fill)
pub const NUMERIC_FIXTURE: [(&str, f64, f64, f64); 16] = [
    ("MinTemp", -10.0, 40.0, 12.0),
    ("MaxTemp", -5.0, 50.0, 23.0),
    ("Rainfall", 0.0, 400.0, 2.0),
    ("Evaporation", 0.0, 150.0, 5.0),
    ("Sunshine", 0.0, 15.0, 8.0),
    ("WindGustSpeed", 0.0, 140.0, 40.0),
    ("WindSpeed9am", 0.0, 130.0, 14.0),
    ("WindSpeed3pm", 0.0, 90.0, 18.0),
    ("Humidity9am", 0.0, 100.0, 70.0),
    ("Humidity3pm", 0.0, 100.0, 50.0),
    ("Pressure9am", 980.0, 1040.0, 1018.0),
    ("Pressure3pm", 975.0, 1040.0, 1015.0),
    ("Cloud9am", 0.0, 9.0, 4.0),
    ("Cloud3pm", 0.0, 9.0, 4.5),
    ("Temp9am", -5.0, 40.0, 17.0),
    ("Temp3pm", -5.0, 47.0, 21.5),
];

/// Categorical model columns
pub const CATEGORICAL_COLS: [&str; 5] = [
    "Location",
    "WindGustDir",
    "WindDir9am",
    "WindDir3pm",
    "RainToday",
];

/// Model input columns in training order
pub const INPUT_COLS: [&str; 21] = [
    "Location",
    "MinTemp",
    "MaxTemp",
    "Rainfall",
    "Evaporation",
    "Sunshine",
    "WindGustDir",
    "WindGustSpeed",
    "WindDir9am",
    "WindDir3pm",
    "WindSpeed9am",
    "WindSpeed3pm",
    "Humidity9am",
    "Humidity3pm",
    "Pressure9am",
    "Pressure3pm",
    "Cloud9am",
    "Cloud3pm",
    "Temp9am",
    "Temp3pm",
    "RainToday",
];

/// Position of Humidity3pm in the model row
pub const HUMIDITY3PM_INDEX: usize = 9;
/// Position of Location_Sydney in the model row
pub const LOCATION_SYDNEY_INDEX: usize = 17;

/// Small reference dataset shaped like weatherAUS.
///
/// - `Location`: Sydney (3 rows), Melbourne (3 rows)
/// - `Rainfall`/`Evaporation`: one extreme outlier each
/// - `WindGustSpeed`, `Cloud9am`, `Cloud3pm`: integer columns
/// - `RainTomorrow`: one null row
pub fn create_reference_dataframe() -> DataFrame {
    df! {
        "Location" => ["Sydney", "Sydney", "Sydney", "Melbourne", "Melbourne", "Melbourne"],
        "MinTemp" => [Some(13.4f64), Some(7.4), Some(12.9), Some(9.2), Some(17.5), None],
        "MaxTemp" => [22.9f64, 25.1, 25.7, 28.0, 32.3, 29.7],
        "Rainfall" => [0.0f64, 0.0, 0.2, 1.0, 0.4, 120.0],
        "Evaporation" => [Some(4.0f64), None, Some(5.6), Some(3.0), Some(2.2), Some(60.0)],
        "Sunshine" => [Some(8.0f64), Some(9.5), Some(10.1), None, Some(6.3), Some(11.0)],
        "WindGustDir" => [Some("W"), Some("N"), Some("E"), Some("S"), None, Some("W")],
        "WindGustSpeed" => [44i64, 44, 46, 24, 41, 56],
        "WindDir9am" => ["W", "N", "S", "E", "E", "N"],
        "WindDir3pm" => [Some("N"), Some("W"), Some("W"), Some("E"), Some("S"), None],
        "WindSpeed9am" => [20.0f64, 4.0, 19.0, 11.0, 7.0, 19.0],
        "WindSpeed3pm" => [24.0f64, 22.0, 26.0, 9.0, 20.0, 24.0],
        "Humidity9am" => [71.0f64, 44.0, 38.0, 45.0, 82.0, 55.0],
        "Humidity3pm" => [22.0f64, 25.0, 30.0, 16.0, 33.0, 23.0],
        "Pressure9am" => [1007.7f64, 1010.6, 1007.6, 1017.6, 1010.8, 1009.2],
        "Pressure3pm" => [1007.1f64, 1007.8, 1008.7, 1012.8, 1006.0, 1005.4],
        "Cloud9am" => [Some(8i64), None, None, None, Some(7), None],
        "Cloud3pm" => [None, None, Some(2i64), None, Some(8), None],
        "Temp9am" => [16.9f64, 17.2, 21.0, 18.1, 17.8, 20.6],
        "Temp3pm" => [21.8f64, 24.3, 23.2, 26.5, 29.7, 28.9],
        "RainToday" => ["No", "No", "No", "No", "No", "Yes"],
        "RainTomorrow" => [Some("No"), Some("No"), Some("Yes"), Some("No"), Some("Yes"), None],
    }
    .unwrap()
}

/// Schema of the default form layout over the reference fixture
pub fn create_reference_schema() -> FeatureSchema {
    let df = create_reference_dataframe();
    let layout = FeatureLayout::default();
    let features: Vec<&str> = layout.all().collect();
    FeatureSchema::from_dataframe(&df, &features).unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn vocabulary(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|s| Some(s.to_string())).collect()
}

/// Two-node stump: `row[feature] <= threshold` goes left
pub fn stump(feature: i64, threshold: f64, left: [f64; 2], right: [f64; 2]) -> DecisionTree {
    DecisionTree {
        children_left: vec![1, TREE_LEAF, TREE_LEAF],
        children_right: vec![2, TREE_LEAF, TREE_LEAF],
        feature: vec![feature, -2, -2],
        threshold: vec![threshold, -2.0, -2.0],
        value: vec![vec![100.0, 100.0], left.to_vec(), right.to_vec()],
    }
}

/// Model bundle matching the reference fixture.
///
/// The forest has two stumps:
/// - scaled `Humidity3pm <= 0.6` → 90% No, else 80% Yes
/// - `Location_Sydney <= 0.5` (not Sydney) → 60% Yes, else 60% No
pub fn create_test_bundle() -> ModelBundle {
    let numeric_cols: Vec<String> = NUMERIC_FIXTURE.iter().map(|c| c.0.to_string()).collect();
    let directions = ["E", "N", "S", "W"];

    ModelBundle {
        model: ClassifierModel::RandomForest(RandomForest {
            classes: strings(&["No", "Yes"]),
            n_features: 32,
            trees: vec![
                stump(HUMIDITY3PM_INDEX as i64, 0.6, [90.0, 10.0], [20.0, 80.0]),
                stump(LOCATION_SYDNEY_INDEX as i64, 0.5, [40.0, 60.0], [60.0, 40.0]),
            ],
        }),
        imputer: Imputer {
            strategy: ImputeStrategy::Mean,
            statistics: NUMERIC_FIXTURE.iter().map(|c| c.3).collect(),
        },
        scaler: Scaler::MinMax {
            data_min: NUMERIC_FIXTURE.iter().map(|c| c.1).collect(),
            data_max: NUMERIC_FIXTURE.iter().map(|c| c.2).collect(),
            feature_range: (0.0, 1.0),
        },
        encoder: OneHotEncoder {
            categories: vec![
                vocabulary(&["Melbourne", "Sydney"]),
                vocabulary(&directions),
                vocabulary(&directions),
                vocabulary(&directions),
                vocabulary(&["No", "Yes"]),
            ],
            handle_unknown: HandleUnknown::Ignore,
        },
        input_cols: strings(&INPUT_COLS),
        numeric_cols,
        categorical_cols: strings(&CATEGORICAL_COLS),
    }
}

/// Inputs with only `Location` provided
pub fn location_only_inputs(location: &str) -> InputSet {
    InputSet::builder(&FeatureLayout::default())
        .provide(
            "Location",
            raincast::pipeline::FeatureValue::Category(location.to_string()),
        )
        .build()
        .unwrap()
}

/// Write the reference fixture as CSV and the bundle as JSON into a temp dir
pub fn create_temp_resources() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("weatherAUS.csv");
    let model_path = temp_dir.path().join("rf_model.json");

    let mut df = create_reference_dataframe();
    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file)
        .with_null_value("NA".to_string())
        .finish(&mut df)
        .unwrap();

    create_test_bundle().save(&model_path).unwrap();

    (temp_dir, csv_path, model_path)
}

/// Assert two floats are equal within `tol`
pub fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}
