pub mod aggregator;
pub mod condition;
pub mod config;
pub mod error;
pub mod indicator;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod window;

pub use error::{EngineError, EngineResult};
