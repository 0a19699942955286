//! Stats module - Aggregations and descriptive statistics

mod aggregator;
mod calculator;

pub use aggregator::{Aggregator, StatsError, TrendQuery, COUNT, COUNTS};
pub use calculator::{GroupStats, StatsCalculator, DENSITY_CUT, DENSITY_POINTS};
