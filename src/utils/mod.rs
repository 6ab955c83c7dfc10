//! Utility helpers - terminal styling, progress spinners and rounding

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;

/// Round to 2 decimals, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
