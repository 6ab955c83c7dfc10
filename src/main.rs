//! Raincast: Rain Tomorrow CLI Tool
//!
//! A command-line tool for exploring Australian weather statistics and
//! predicting tomorrow's rain from partial weather conditions.

use anyhow::Result;
use clap::Parser;

use raincast::cli::predict::run_predict;
use raincast::cli::stats::{run_schema, run_stats};
use raincast::cli::{Cli, Commands};
use raincast::pipeline::Resources;
use raincast::utils::{print_banner, print_config};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let resources = Resources::new(cli.resource_config());

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.data, &cli.model);

    match &cli.command {
        Some(Commands::Stats {
            features,
            no_total,
            output,
        }) => run_stats(&resources, features, !no_total, output.as_deref()),
        Some(Commands::Schema) => run_schema(&resources),
        Some(Commands::Predict(_)) | None => {
            let args = cli.predict_args().unwrap_or_default();
            run_predict(&resources, &args)
        }
    }
}
