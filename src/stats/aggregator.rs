//! Aggregation Module
//! Grouped counts, year trends and per-key summary statistics.

use crate::data::{DataProcessor, ProcessorError, ShapeError};
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Count column produced by [`Aggregator::group_count`].
pub const COUNTS: &str = "counts";

/// Count column produced by [`Aggregator::value_counts`].
pub const COUNT: &str = "count";

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Parameters of a year trend table.
#[derive(Debug, Clone)]
pub struct TrendQuery {
    /// Columns kept before grouping.
    pub keep_columns: Vec<String>,
    /// Grouping keys, a subset of `keep_columns`.
    pub group_columns: Vec<String>,
    /// Numeric column compared against `min_year`.
    pub year_column: String,
    pub min_year: i64,
    /// Name of the produced count column.
    pub count_column: String,
}

/// Grouping and summary transforms. Every call returns a new table.
pub struct Aggregator;

impl Aggregator {
    /// Number of rows per distinct combination of `group_columns`, in `counts`.
    ///
    /// Rows are ordered ascending by the key columns.
    pub fn group_count(df: &DataFrame, group_columns: &[&str]) -> Result<DataFrame, StatsError> {
        Self::count_by(df, group_columns, COUNTS)
    }

    /// Project, group, count and keep rows from `min_year` onwards.
    ///
    /// No row passing the year filter yields an empty table, not an error.
    pub fn trend(df: &DataFrame, query: &TrendQuery) -> Result<DataFrame, StatsError> {
        let keep: Vec<&str> = query.keep_columns.iter().map(String::as_str).collect();
        DataProcessor::require_columns(df, &keep)?;

        let projected = df.select(keep)?;
        let group: Vec<&str> = query.group_columns.iter().map(String::as_str).collect();
        let counted = Self::count_by(&projected, &group, &query.count_column)?;

        Self::since_year(&counted, &query.year_column, query.min_year)
    }

    /// Rows whose `year_column` is at least `min_year`.
    pub fn since_year(
        df: &DataFrame,
        year_column: &str,
        min_year: i64,
    ) -> Result<DataFrame, StatsError> {
        DataProcessor::require_columns(df, &[year_column])?;
        let dtype = df.column(year_column)?.dtype();
        if !DataProcessor::is_numeric(dtype) {
            return Err(ShapeError::UnexpectedType {
                column: year_column.to_string(),
                dtype: dtype.to_string(),
                expected: "numeric",
            }
            .into());
        }

        let filtered = df
            .clone()
            .lazy()
            .filter(col(year_column).gt_eq(lit(min_year)))
            .collect()?;

        if filtered.height() == 0 {
            warn!("No rows with {} >= {}, result is empty", year_column, min_year);
        }
        Ok(filtered)
    }

    /// Occurrences of each distinct combination of `columns`, in `count`.
    ///
    /// Ordered by descending count, ties broken by ascending keys.
    pub fn value_counts(df: &DataFrame, columns: &[&str]) -> Result<DataFrame, StatsError> {
        let counted = Self::count_by(df, columns, COUNT)?;

        let mut by = vec![PlSmallStr::from(COUNT)];
        by.extend(columns.iter().map(|c| PlSmallStr::from(*c)));
        let descending = std::iter::once(true).chain(columns.iter().map(|_| false));

        Ok(counted
            .lazy()
            .sort(
                by,
                SortMultipleOptions::default().with_order_descending_multi(descending),
            )
            .collect()?)
    }

    /// Mean, standard deviation and median of the `(key, value)` pair counts per key.
    ///
    /// Columns: `key_column`, `mean <value_column>` (rounded to one decimal),
    /// `std` (sample, NaN for a key with a single pair) and `median`. Rows are
    /// sorted descending by key.
    pub fn summary_stats(
        df: &DataFrame,
        key_column: &str,
        value_column: &str,
    ) -> Result<DataFrame, StatsError> {
        let pairs = Self::value_counts(df, &[key_column, value_column])?;
        let mean_name = format!("mean {}", value_column);
        let counts = || col(COUNT).cast(DataType::Float64);

        let mut summary = pairs
            .lazy()
            .group_by([col(key_column)])
            .agg([
                counts().mean().alias(mean_name.as_str()),
                counts().std(1).alias("std"),
                counts().median().alias("median"),
            ])
            .sort(
                [key_column],
                SortMultipleOptions::default().with_order_descending(true),
            )
            .collect()?;

        let mean: Vec<f64> = summary
            .column(&mean_name)?
            .f64()?
            .into_iter()
            .map(|v| v.map_or(f64::NAN, |m| (m * 10.0).round_ties_even() / 10.0))
            .collect();
        let std: Vec<f64> = summary
            .column("std")?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();

        summary.with_column(Column::new(mean_name.as_str().into(), mean))?;
        summary.with_column(Column::new("std".into(), std))?;

        debug!(
            "Summary of {} by {}: {} keys",
            value_column,
            key_column,
            summary.height()
        );
        Ok(summary)
    }

    /// `(x, y)` value counts restricted to the first `top_n` categories of `x`.
    ///
    /// Categories are taken in value-count order; rows whose `x` equals
    /// `exclude` are dropped afterwards.
    pub fn distribution_frame(
        df: &DataFrame,
        x_column: &str,
        y_column: &str,
        top_n: usize,
        exclude: &str,
    ) -> Result<DataFrame, StatsError> {
        let counts = Self::value_counts(df, &[x_column, y_column])?;
        let xs = DataProcessor::string_values(&counts, x_column)?;

        let top: HashSet<String> = DataProcessor::unique_in_order(&xs)
            .into_iter()
            .take(top_n)
            .collect();
        let keep: Vec<bool> = xs.iter().map(|x| top.contains(x) && x != exclude).collect();

        let filtered = counts.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        if filtered.height() == 0 {
            warn!("No {} categories left after filtering, result is empty", x_column);
        }
        Ok(filtered)
    }

    fn count_by(df: &DataFrame, columns: &[&str], name: &str) -> Result<DataFrame, StatsError> {
        DataProcessor::require_columns(df, columns)?;

        let keys: Vec<Expr> = columns.iter().map(|c| col(*c)).collect();
        let order: Vec<PlSmallStr> = columns.iter().map(|c| PlSmallStr::from(*c)).collect();

        Ok(df
            .clone()
            .lazy()
            .group_by(keys)
            .agg([len().alias(name)])
            .sort(order, SortMultipleOptions::default())
            .collect()?)
    }
}
