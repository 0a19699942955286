//! Data module - CSV loading and cleaning

mod loader;
mod processor;

pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, ProcessorError, ShapeError, MOVIE};
