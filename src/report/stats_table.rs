//! Weather statistics and feature schema tables

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use polars::prelude::*;

use crate::pipeline::{stats_to_dataframe, FeatureKind, FeatureSchema, LocationStats, TOTAL_ROW_LABEL};

/// Column title for a feature mean, e.g. `💧 Humidity (Rainy)`
pub fn feature_title(feature: &str, rainy: bool) -> String {
    let outcome = if rainy { "Rainy" } else { "Dry" };
    let (icon, label) = match feature {
        "Humidity3pm" => ("💧 ", "Humidity"),
        "Pressure3pm" => ("🌬️ ", "Pressure"),
        "MinTemp" => ("🌡️ ", "Min Temp"),
        "MaxTemp" => ("🔥 ", "Max Temp"),
        other => ("", other),
    };
    format!("{}{} ({})", icon, label, outcome)
}

fn unit_suffix(feature: &str) -> &'static str {
    if feature.contains("Temp") {
        " °C"
    } else {
        ""
    }
}

fn number_cell(value: Option<f64>, suffix: &str) -> Cell {
    match value {
        Some(v) => Cell::new(format!("{:.1}{}", v, suffix)).set_alignment(CellAlignment::Right),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}

/// Build the statistics table: one row per location, rain percentage first,
/// then rainy/dry means per feature
pub fn build_stats_table(stats: &[LocationStats]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![
        Cell::new("📍 Location").add_attribute(Attribute::Bold),
        Cell::new("🌧️ Rain Tomorrow (%)").add_attribute(Attribute::Bold),
    ];
    if let Some(first) = stats.first() {
        for split in &first.features {
            header.push(Cell::new(feature_title(&split.feature, true)).add_attribute(Attribute::Bold));
            header.push(Cell::new(feature_title(&split.feature, false)).add_attribute(Attribute::Bold));
        }
    }
    table.set_header(header);

    for row in stats {
        let mut location = Cell::new(&row.location);
        if row.location == TOTAL_ROW_LABEL {
            location = location.add_attribute(Attribute::Bold).fg(Color::Cyan);
        }
        let pct = match row.rain_tomorrow_pct {
            Some(p) => Cell::new(format!("{:.2}", p))
                .fg(Color::Blue)
                .set_alignment(CellAlignment::Right),
            None => Cell::new("-").fg(Color::DarkGrey),
        };

        let mut cells = vec![location, pct];
        for split in &row.features {
            let suffix = unit_suffix(&split.feature);
            cells.push(number_cell(split.rainy, suffix));
            cells.push(number_cell(split.dry, suffix));
        }
        table.add_row(cells);
    }

    table
}

/// Print the statistics table
pub fn display_stats(stats: &[LocationStats]) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style("WEATHER BY LOCATION").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    for line in build_stats_table(stats).to_string().lines() {
        println!("    {}", line);
    }
}

/// Save statistics to file (CSV or Parquet based on extension)
pub fn save_stats(stats: &[LocationStats], path: &Path) -> Result<()> {
    let mut df = stats_to_dataframe(stats)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

/// Build the feature schema table: kind and input domain per feature
pub fn build_schema_table(schema: &FeatureSchema) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Kind").add_attribute(Attribute::Bold),
        Cell::new("Domain").add_attribute(Attribute::Bold),
    ]);

    for spec in schema.features() {
        let domain = match &spec.kind {
            FeatureKind::Categorical { values } => {
                let shown: Vec<&str> = values.iter().take(8).map(String::as_str).collect();
                if values.len() > shown.len() {
                    format!("{}, … ({} values)", shown.join(", "), values.len())
                } else {
                    shown.join(", ")
                }
            }
            FeatureKind::Numeric(d) => {
                format!("{:.2} – {:.2} (mean {:.2})", d.min, d.max, d.mean)
            }
        };
        let kind = Cell::new(spec.kind.label()).fg(if spec.kind.is_numeric() {
            Color::Cyan
        } else {
            Color::Magenta
        });
        table.add_row(vec![Cell::new(&spec.name), kind, Cell::new(domain)]);
    }

    table
}

/// Print the feature schema table
pub fn display_schema(schema: &FeatureSchema) {
    println!();
    println!(
        "    {} {}",
        style("🧾").cyan(),
        style("FEATURE SCHEMA").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    for line in build_schema_table(schema).to_string().lines() {
        println!("    {}", line);
    }
}
