//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{FeatureLayout, ResourceConfig, DEFAULT_STATS_FEATURES};

/// Raincast - Australian weather statistics and rain-tomorrow prediction
#[derive(Parser, Debug)]
#[command(name = "raincast")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Reference dataset (CSV or Parquet)
    #[arg(short, long, global = true, default_value = "data/weatherAUS.csv")]
    pub data: PathBuf,

    /// Model bundle (JSON)
    #[arg(short, long, global = true, default_value = "models/rf_model.json")]
    pub model: PathBuf,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, global = true, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict whether it will rain tomorrow (default command)
    Predict(PredictArgs),

    /// Summarize weather by location and next-day rain outcome
    Stats {
        /// Features to average (comma-separated)
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_STATS_FEATURES.map(String::from))]
        features: Vec<String>,

        /// Omit the totals row across all locations
        #[arg(long, default_value = "false")]
        no_total: bool,

        /// Also write the table to a file (CSV or Parquet, determined by extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show each form feature with its kind and input domain
    Schema,
}

/// Arguments of the predict command
#[derive(clap::Args, Debug, Default, Clone)]
pub struct PredictArgs {
    /// Feature value as FEATURE=VALUE (repeatable). Features not set are skipped.
    #[arg(short, long = "set", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Skip the interactive form and predict from --set values only
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Print the result as plain text instead of a table
    #[arg(long, default_value = "false")]
    pub plain: bool,

    /// Write the prediction to a JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Predict arguments, defaulting when no subcommand was given
    pub fn predict_args(&self) -> Option<PredictArgs> {
        match &self.command {
            None => Some(PredictArgs::default()),
            Some(Commands::Predict(args)) => Some(args.clone()),
            Some(_) => None,
        }
    }

    /// Resource locations for the default form layout
    pub fn resource_config(&self) -> ResourceConfig {
        ResourceConfig {
            dataset_path: self.data.clone(),
            model_path: self.model.clone(),
            infer_schema_length: self.infer_schema_length,
            layout: FeatureLayout::default(),
        }
    }
}

/// Parser for FEATURE=VALUE assignments
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (feature, value) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not in FEATURE=VALUE form", s))?;
    let feature = feature.trim();
    if feature.is_empty() {
        return Err(format!("'{}' has an empty feature name", s));
    }
    Ok((feature.to_string(), value.to_string()))
}
