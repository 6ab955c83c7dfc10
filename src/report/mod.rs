//! Report module - rendering predictions, statistics and the feature schema

pub mod export;
pub mod prediction;
pub mod stats_table;

pub use export::*;
pub use prediction::*;
pub use stats_table::*;
