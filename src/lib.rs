//! Titles EDA - Exploratory analysis of a media titles dataset
//!
//! Loads and cleans the dataset, builds grouped counts, summary statistics and
//! description sentiment, and writes SVG charts and CSV tables.

pub mod charts;
pub mod config;
pub mod data;
pub mod report;
pub mod sentiment;
pub mod stats;
pub mod workflow;

pub use config::WorkflowConfig;
