//! Rain-tomorrow prediction command

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use super::args::PredictArgs;
use super::prompts::{confirm_step, DialoguerPrompter};
use crate::pipeline::{
    collect_inputs, DatasetStats, FeatureKind, InputSet, Prediction, RainPredictor, Resources,
};
use crate::report::{display_prediction, export_prediction, format_prediction};
use crate::utils::{
    create_spinner, finish_with_error, finish_with_success, print_info, print_step_header,
    print_step_time, print_success, print_warning,
};

/// Build the input set from `--set` assignments; everything else is skipped
pub fn inputs_from_assignments(
    predictor: &RainPredictor,
    assignments: &[(String, String)],
) -> Result<InputSet> {
    let mut builder = InputSet::builder(predictor.layout());
    for (feature, raw) in assignments {
        builder = builder
            .provide_raw(predictor.schema(), feature, raw)
            .with_context(|| format!("Invalid --set {}={}", feature, raw))?;
    }
    Ok(builder.build()?)
}

/// Provided categories that never occur in the reference dataset
pub fn unseen_categories<'a>(
    predictor: &RainPredictor,
    inputs: &'a InputSet,
) -> Vec<(&'a str, &'a str)> {
    inputs
        .iter()
        .filter_map(|(feature, value)| {
            let category = value.value()?.as_category()?;
            match &predictor.schema().describe(feature).ok()?.kind {
                FeatureKind::Categorical { values } if !values.iter().any(|v| v == category) => {
                    Some((feature, category))
                }
                _ => None,
            }
        })
        .collect()
}

/// Load resources, collect inputs and print the prediction
pub fn run_predict(resources: &Resources, args: &PredictArgs) -> Result<()> {
    // Step 1: Load the reference dataset and model bundle
    print_step_header(1, "Load Dataset & Model");
    let step_start = Instant::now();

    let spinner = create_spinner("Reading reference dataset...");
    let df = resources.dataset()?;
    finish_with_success(&spinner, "Reference dataset loaded");

    let stats = DatasetStats::of(&df);
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", stats.rows);
    println!("      Columns: {}", stats.columns);
    println!("      Estimated memory: {:.2} MB", stats.memory_mb);

    let spinner = create_spinner("Loading model bundle...");
    let predictor = match resources.predictor() {
        Ok(predictor) => predictor,
        Err(e) => {
            finish_with_error(&spinner, "Model bundle unusable");
            return Err(e);
        }
    };
    finish_with_success(
        &spinner,
        &format!(
            "Model ready ({} input features → {} model columns)",
            predictor.bundle().input_cols.len(),
            predictor.bundle().n_model_features()
        ),
    );
    print_step_time(step_start.elapsed());

    // Step 2: Collect the conditions
    print_step_header(2, "Weather Conditions");
    let interactive = !args.no_confirm && args.set.is_empty();
    let inputs = if interactive {
        collect_inputs(predictor.schema(), predictor.layout(), &mut DialoguerPrompter)?
    } else {
        inputs_from_assignments(&predictor, &args.set)?
    };
    print_info(&format!(
        "{} of {} features provided, the rest will be imputed",
        inputs.provided_count(),
        inputs.len()
    ));
    for (feature, category) in unseen_categories(&predictor, &inputs) {
        print_warning(&format!(
            "{} '{}' does not occur in the reference dataset",
            feature, category
        ));
    }

    if interactive && !confirm_step("Predict Rain Tomorrow?")? {
        println!("Cancelled by user.");
        return Ok(());
    }

    // Step 3: Predict
    print_step_header(3, "Prediction");
    let prediction: Prediction = predictor.predict(&inputs)?;
    if args.plain {
        println!();
        print!("{}", format_prediction(&prediction.result, &prediction.inputs));
    } else {
        display_prediction(&prediction.result, &prediction.inputs);
    }

    if let Some(output) = &args.output {
        let config = resources.config();
        export_prediction(&prediction, output, &config.dataset_path, &config.model_path)?;
        println!();
        print_success(&format!("Prediction saved to {}", output.display()));
    }

    Ok(())
}
