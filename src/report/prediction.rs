//! Prediction result formatting

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{InputSet, InputValue, PredictionResult};

/// Text shown for a feature the user skipped
pub const SKIPPED_LABEL: &str = "skipped";

/// Display form of one collected input
pub fn condition_text(value: &InputValue) -> String {
    match value {
        InputValue::Provided(v) => v.to_string(),
        InputValue::Omitted => SKIPPED_LABEL.to_string(),
    }
}

/// Render the prediction and every collected condition as plain text.
///
/// ```text
/// Rain Tomorrow: Yes
/// with probability 72.50%
/// Provided Conditions:
/// Location: Sydney
/// Humidity9am: skipped
/// ...
/// ```
pub fn format_prediction(result: &PredictionResult, inputs: &InputSet) -> String {
    let mut text = format!(
        "Rain Tomorrow: {}\nwith probability {:.2}%\nProvided Conditions:\n",
        result.label, result.probability
    );
    for (feature, value) in inputs.iter() {
        text.push_str(feature);
        text.push_str(": ");
        text.push_str(&condition_text(value));
        text.push('\n');
    }
    text
}

/// Print the prediction headline and a table of the conditions
pub fn display_prediction(result: &PredictionResult, inputs: &InputSet) {
    let label = if result.label.eq_ignore_ascii_case("yes") {
        style(format!("🌧️  {}", result.label)).blue().bold()
    } else {
        style(format!("☀️  {}", result.label)).yellow().bold()
    };

    println!();
    println!("    {} {}", style("Rain Tomorrow:").white().bold(), label);
    println!(
        "    with probability {}",
        style(format!("{:.2}%", result.probability)).cyan().bold()
    );
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Provided Condition").add_attribute(Attribute::Bold),
    ]);

    for (feature, value) in inputs.iter() {
        let cell = match value {
            InputValue::Provided(_) => Cell::new(condition_text(value)).fg(Color::Green),
            InputValue::Omitted => Cell::new(SKIPPED_LABEL).fg(Color::DarkGrey),
        };
        table.add_row(vec![Cell::new(feature), cell]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
