//! Weather statistics and schema commands

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use crate::pipeline::{weather_stats, Resources};
use crate::report::{display_schema, display_stats, save_stats};
use crate::utils::{create_spinner, finish_with_success, print_step_time, print_success};

/// Compute and print per-location statistics, optionally saving them
pub fn run_stats(
    resources: &Resources,
    features: &[String],
    include_total: bool,
    output: Option<&Path>,
) -> Result<()> {
    let step_start = Instant::now();
    let spinner = create_spinner("Reading reference dataset...");
    let df = resources.dataset()?;
    finish_with_success(&spinner, "Reference dataset loaded");

    let spinner = create_spinner("Aggregating by location...");
    let stats = weather_stats(&df, features, include_total)?;
    finish_with_success(&spinner, &format!("{} location rows", stats.len()));
    print_step_time(step_start.elapsed());

    display_stats(&stats);

    if let Some(path) = output {
        save_stats(&stats, path)?;
        println!();
        print_success(&format!("Saved to {}", path.display()));
    }

    Ok(())
}

/// Print the schema of the prediction form
pub fn run_schema(resources: &Resources) -> Result<()> {
    let spinner = create_spinner("Deriving feature schema...");
    let schema = resources.schema()?;
    finish_with_success(&spinner, &format!("{} features", schema.len()));

    display_schema(&schema);
    Ok(())
}
