//! Descriptive weather statistics grouped by location and rain outcome

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::features::{LOCATION_COLUMN, TARGET_COLUMN};
use crate::utils::round2;

/// Label of the totals row
pub const TOTAL_ROW_LABEL: &str = "ALL";

const RAIN_FLAG: &str = "RainTomorrow_bool";
const RAIN_PERCENTAGE: &str = "RainTomorrow_Yes_Percentage";

/// Mean of one feature on rainy and on dry next days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSplit {
    pub feature: String,
    /// Mean over rows with `RainTomorrow == "Yes"`
    pub rainy: Option<f64>,
    /// Mean over rows with `RainTomorrow == "No"`
    pub dry: Option<f64>,
}

/// Statistics of one location (or of the whole dataset)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationStats {
    pub location: String,
    /// Share of rows followed by a rainy day, in percent
    pub rain_tomorrow_pct: Option<f64>,
    pub features: Vec<FeatureSplit>,
}

fn yes_column(feature: &str) -> String {
    format!("{}_Yes", feature)
}

fn no_column(feature: &str) -> String {
    format!("{}_No", feature)
}

/// Aggregations shared by the per-location and total computations
fn aggregations<S: AsRef<str>>(features: &[S]) -> Vec<Expr> {
    let mut exprs = vec![(col(RAIN_FLAG).mean() * lit(100.0)).alias(RAIN_PERCENTAGE)];
    for feature in features {
        let feature = feature.as_ref();
        let value = col(feature).cast(DataType::Float64);
        exprs.push(
            value
                .clone()
                .filter(col(TARGET_COLUMN).eq(lit("Yes")))
                .mean()
                .alias(yes_column(feature)),
        );
        exprs.push(
            value
                .filter(col(TARGET_COLUMN).eq(lit("No")))
                .mean()
                .alias(no_column(feature)),
        );
    }
    exprs
}

/// Compute per-location rain percentage and feature means split by
/// `RainTomorrow`.
///
/// Rows without a `RainTomorrow` value are ignored. Locations are sorted by
/// name; with `include_total` an [`TOTAL_ROW_LABEL`] row over all locations is
/// appended. Values are rounded to 2 decimals.
pub fn weather_stats<S: AsRef<str>>(
    df: &DataFrame,
    features: &[S],
    include_total: bool,
) -> Result<Vec<LocationStats>> {
    for required in [LOCATION_COLUMN, TARGET_COLUMN]
        .into_iter()
        .chain(features.iter().map(|f| f.as_ref()))
    {
        if df.get_column_index(required).is_none() {
            anyhow::bail!("Column '{}' not found in dataset", required);
        }
    }

    let labelled = df
        .clone()
        .lazy()
        .filter(col(TARGET_COLUMN).is_not_null())
        .with_column(
            col(TARGET_COLUMN)
                .eq(lit("Yes"))
                .cast(DataType::Float64)
                .alias(RAIN_FLAG),
        );

    let by_location = labelled
        .clone()
        .group_by([col(LOCATION_COLUMN)])
        .agg(aggregations(features))
        .sort([LOCATION_COLUMN], SortMultipleOptions::default())
        .collect()
        .context("Failed to aggregate statistics by location")?;

    let locations = by_location.column(LOCATION_COLUMN)?.cast(&DataType::String)?;
    let locations = locations.str()?;

    let mut rows = Vec::with_capacity(by_location.height() + 1);
    for (i, location) in locations.into_iter().enumerate() {
        rows.push(read_row(
            &by_location,
            i,
            location.unwrap_or_default().to_string(),
            features,
        )?);
    }

    if include_total {
        let totals = labelled
            .select(aggregations(features))
            .collect()
            .context("Failed to aggregate statistics over all locations")?;
        if totals.height() > 0 {
            rows.push(read_row(&totals, 0, TOTAL_ROW_LABEL.to_string(), features)?);
        }
    }

    Ok(rows)
}

fn float_at(df: &DataFrame, name: &str, row: usize) -> Result<Option<f64>> {
    let value = df
        .column(name)
        .with_context(|| format!("Missing aggregate column '{}'", name))?
        .cast(&DataType::Float64)?
        .f64()?
        .get(row);
    Ok(value.filter(|v| !v.is_nan()).map(round2))
}

fn read_row<S: AsRef<str>>(
    df: &DataFrame,
    row: usize,
    location: String,
    features: &[S],
) -> Result<LocationStats> {
    let features = features
        .iter()
        .map(|f| {
            let feature = f.as_ref();
            Ok(FeatureSplit {
                feature: feature.to_string(),
                rainy: float_at(df, &yes_column(feature), row)?,
                dry: float_at(df, &no_column(feature), row)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LocationStats {
        location,
        rain_tomorrow_pct: float_at(df, RAIN_PERCENTAGE, row)?,
        features,
    })
}

/// Flatten statistics into a DataFrame with columns
/// `Location, RainTomorrow_Yes_Percentage, <feature>_No, <feature>_Yes, ...`
pub fn stats_to_dataframe(stats: &[LocationStats]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = vec![
        Column::new(
            LOCATION_COLUMN.into(),
            stats.iter().map(|s| s.location.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            RAIN_PERCENTAGE.into(),
            stats.iter().map(|s| s.rain_tomorrow_pct).collect::<Vec<_>>(),
        ),
    ];

    if let Some(first) = stats.first() {
        for (i, split) in first.features.iter().enumerate() {
            let dry: Vec<Option<f64>> = stats.iter().map(|s| s.features[i].dry).collect();
            let rainy: Vec<Option<f64>> = stats.iter().map(|s| s.features[i].rainy).collect();
            columns.push(Column::new(no_column(&split.feature).into(), dry));
            columns.push(Column::new(yes_column(&split.feature).into(), rainy));
        }
    }

    DataFrame::new(columns).context("Failed to build statistics table")
}
