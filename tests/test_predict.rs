//! Tests for classification and the end-to-end predictor

use std::sync::Arc;

use raincast::pipeline::{
    predict, preprocess, Classifier, ClassifierModel, FeatureLayout, FeatureValue, InputSet,
    LogisticRegression, PredictError, PreprocessedVector, RainPredictor, RandomForest,
};
use raincast::utils::round2;

#[path = "common/mod.rs"]
mod common;

use common::{
    assert_close, create_reference_dataframe, create_reference_schema, create_test_bundle,
    location_only_inputs, stump,
};

fn predictor() -> RainPredictor {
    RainPredictor::new(
        Arc::new(create_reference_schema()),
        Arc::new(create_test_bundle()),
        FeatureLayout::default(),
    )
    .unwrap()
}

#[test]
fn test_sydney_with_everything_skipped() {
    let prediction = predictor().predict(&location_only_inputs("Sydney")).unwrap();

    assert_eq!(prediction.result.label, "No");
    assert_close(prediction.result.probability, 75.0, 1e-9, "probability");
    assert_eq!(prediction.inputs.provided_count(), 1);
}

#[test]
fn test_melbourne_humid_afternoon() {
    let inputs = InputSet::builder(&FeatureLayout::default())
        .provide("Location", FeatureValue::Category("Melbourne".to_string()))
        .provide("Humidity3pm", FeatureValue::Number(80.0))
        .build()
        .unwrap();

    let prediction = predictor().predict(&inputs).unwrap();

    assert_eq!(prediction.result.label, "Yes");
    assert_close(prediction.result.probability, 70.0, 1e-9, "probability");
}

#[test]
fn test_probability_is_confidence_in_predicted_label() {
    let bundle = create_test_bundle();

    for location in ["Sydney", "Melbourne", "Uluru"] {
        let vector = preprocess(&location_only_inputs(location), &bundle).unwrap();
        let proba = bundle.model.predict_proba(&vector.values).unwrap();
        let result = predict(&vector, &bundle.model).unwrap();

        let max = proba.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(
            (50.0..=100.0).contains(&result.probability),
            "Binary confidence must lie in [50, 100], got {}",
            result.probability
        );
        assert_eq!(result.probability, round2(max * 100.0), "{}", location);
    }
}

#[test]
fn test_probability_rounded_to_two_decimals() {
    let model = ClassifierModel::LogisticRegression(LogisticRegression {
        classes: vec!["No".to_string(), "Yes".to_string()],
        coefficients: vec![1.0],
        intercept: 0.0,
    });
    let vector = PreprocessedVector {
        columns: vec!["x".to_string()],
        values: vec![1.0],
    };

    // sigmoid(1) = 0.7310585786...
    let result = predict(&vector, &model).unwrap();
    assert_eq!(result.label, "Yes");
    assert_eq!(result.probability, 73.11);

    // sigmoid(-1): "No" is predicted with the complementary confidence
    let vector = PreprocessedVector {
        columns: vec!["x".to_string()],
        values: vec![-1.0],
    };
    let result = predict(&vector, &model).unwrap();
    assert_eq!(result.label, "No");
    assert_eq!(result.probability, 73.11);
}

#[test]
fn test_missing_location_is_rejected() {
    let predictor = predictor();

    let err = InputSet::builder(predictor.layout())
        .provide("Humidity3pm", FeatureValue::Number(80.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, PredictError::MissingRequiredInput(f) if f == "Location"));
}

#[test]
fn test_predictor_rejects_mandatory_missing_from_other_layout() {
    let predictor = predictor();
    // built against a layout where Location is optional
    let relaxed = FeatureLayout::new(
        vec![],
        FeatureLayout::default().all().map(String::from).collect(),
    );
    let inputs = InputSet::builder(&relaxed)
        .provide("Humidity3pm", FeatureValue::Number(80.0))
        .build()
        .unwrap();

    let err = predictor.predict(&inputs).unwrap_err();
    assert!(matches!(err, PredictError::MissingRequiredInput(f) if f == "Location"));
}

#[test]
fn test_predictor_rejects_kind_mismatch_with_dataset() {
    let mut bundle = create_test_bundle();
    // claim RainToday is numeric and Humidity3pm categorical
    let humidity = bundle
        .numeric_cols
        .iter()
        .position(|c| c == "Humidity3pm")
        .unwrap();
    bundle.numeric_cols[humidity] = "RainToday".to_string();
    let rain_today = bundle
        .categorical_cols
        .iter()
        .position(|c| c == "RainToday")
        .unwrap();
    bundle.categorical_cols[rain_today] = "Humidity3pm".to_string();

    let err = RainPredictor::new(
        Arc::new(create_reference_schema()),
        Arc::new(bundle),
        FeatureLayout::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PredictError::BundleSchemaMismatch(_)));
    assert!(err.is_configuration_error());
}

#[test]
fn test_predictor_rejects_bundle_without_form_feature() {
    let df = create_reference_dataframe();
    let layout = FeatureLayout::default();
    let features: Vec<&str> = layout.all().collect();
    let schema = raincast::pipeline::FeatureSchema::from_dataframe(&df, &features).unwrap();

    let mut bundle = create_test_bundle();
    bundle.input_cols.retain(|c| c != "Cloud3pm");

    let err = RainPredictor::new(Arc::new(schema), Arc::new(bundle), layout).unwrap_err();
    match err {
        PredictError::BundleSchemaMismatch(msg) => assert!(msg.contains("Cloud3pm")),
        other => panic!("Expected BundleSchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_wrong_vector_width_fails_immediately() {
    let bundle = create_test_bundle();
    let vector = PreprocessedVector {
        columns: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        values: vec![0.1, 0.2, 0.3],
    };

    let err = predict(&vector, &bundle.model).unwrap_err();
    assert!(matches!(
        err,
        PredictError::ShapeMismatch {
            expected: 32,
            actual: 3,
            ..
        }
    ));
}

#[test]
fn test_predictor_rejects_split_on_missing_feature() {
    let mut bundle = create_test_bundle();
    match &mut bundle.model {
        ClassifierModel::RandomForest(forest) => forest.trees[0].feature[0] = 99,
        other => panic!("Expected a random forest, got {:?}", other),
    }

    let err = RainPredictor::new(
        Arc::new(create_reference_schema()),
        Arc::new(bundle),
        FeatureLayout::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PredictError::InvalidBundle(_)));
    assert!(err.is_configuration_error());
}

#[test]
fn test_malformed_forest_fails_without_panicking() {
    let classes = vec!["No".to_string(), "Yes".to_string()];

    let forest = RandomForest {
        classes: classes.clone(),
        n_features: 2,
        trees: vec![stump(99, 0.5, [1.0, 0.0], [0.0, 1.0])],
    };
    assert!(matches!(
        forest.predict_proba(&[0.1, 0.2]),
        Err(PredictError::InvalidBundle(_))
    ));

    let mut dangling = stump(0, 0.5, [1.0, 0.0], [0.0, 1.0]);
    dangling.children_left[0] = 7;
    let forest = RandomForest {
        classes: classes.clone(),
        n_features: 2,
        trees: vec![dangling],
    };
    assert!(forest.predict_proba(&[0.1, 0.2]).is_err());

    let empty = RandomForest {
        classes,
        n_features: 2,
        trees: vec![],
    };
    assert!(matches!(
        empty.predict_proba(&[0.1, 0.2]),
        Err(PredictError::InvalidBundle(_))
    ));
}
