//! CLI module - argument parsing, interactive prompts and commands

mod args;
pub mod predict;
mod prompts;
pub mod stats;

pub use args::{Cli, Commands, PredictArgs};
pub use prompts::*;
