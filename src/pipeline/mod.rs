//! Pipeline module - schema, inputs, preprocessing and prediction

pub mod bundle;
pub mod error;
pub mod features;
pub mod input;
pub mod loader;
pub mod model;
pub mod predict;
pub mod preprocess;
pub mod resources;
pub mod schema;
pub mod stats;
pub mod transform;

pub use bundle::*;
pub use error::*;
pub use features::*;
pub use input::*;
pub use loader::*;
pub use model::*;
pub use predict::*;
pub use preprocess::*;
pub use resources::*;
pub use schema::*;
pub use stats::*;
pub use transform::*;
