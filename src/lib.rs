//! Raincast: Rain Tomorrow Prediction Library
//!
//! Derives a feature schema from a reference weather dataset, collects
//! partial user input, reproduces the training-time preprocessing of a
//! persisted model bundle and predicts whether it will rain tomorrow.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
