//! Data Processor Module
//! Handles data cleaning and column coercion on explicit copies of a table.

use polars::prelude::*;
use thiserror::Error;

/// Value of the `type` column selecting the movie-only view.
pub const MOVIE: &str = "Movie";

/// A table does not have the shape an operation expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Expected column is absent: {0}")]
    MissingColumn(String),
    #[error("Cannot coerce duration to minutes: {0:?}")]
    InvalidDuration(String),
    #[error("Column {column} has type {dtype}, expected {expected}")]
    UnexpectedType {
        column: String,
        dtype: String,
        expected: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Fail with [`ShapeError::MissingColumn`] for the first absent column.
    pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), ShapeError> {
        let names = df.get_column_names();
        match columns
            .iter()
            .find(|c| !names.iter().any(|n| n.as_str() == **c))
        {
            Some(missing) => Err(ShapeError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Replace every null cell with `fill`.
    ///
    /// Columns holding nulls are converted to text first so the sentinel fits.
    pub fn fill_nulls(df: &DataFrame, fill: &str) -> PolarsResult<DataFrame> {
        let exprs: Vec<Expr> = df
            .get_columns()
            .iter()
            .filter(|c| c.null_count() > 0)
            .map(|c| {
                col(c.name().clone())
                    .cast(DataType::String)
                    .fill_null(lit(fill))
            })
            .collect();

        if exprs.is_empty() {
            return Ok(df.clone());
        }

        df.clone().lazy().with_columns(exprs).collect()
    }

    /// One `Float64` column per input column: 1.0 where the cell is null.
    pub fn null_mask(df: &DataFrame) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = df
            .get_columns()
            .iter()
            .map(|c| {
                let mask = c.is_null();
                let values: Vec<f64> = mask
                    .into_iter()
                    .map(|v| if v == Some(true) { 1.0 } else { 0.0 })
                    .collect();
                Column::new(c.name().clone(), values)
            })
            .collect();

        DataFrame::new(columns)
    }

    /// Convert a duration such as `"90 min"` to whole minutes.
    ///
    /// The sentinel maps to 0. Trailing `m`, `i`, `n` characters are stripped
    /// before parsing, so anything left that is not an integer is rejected.
    pub fn coerce_duration(text: &str, sentinel: &str) -> Result<i64, ShapeError> {
        if text == sentinel {
            return Ok(0);
        }

        text.trim_end_matches(['m', 'i', 'n'])
            .trim()
            .parse::<i64>()
            .map_err(|_| ShapeError::InvalidDuration(text.to_string()))
    }

    /// Movie-only copy of the table with the duration column in minutes.
    pub fn movies_only(
        df: &DataFrame,
        type_column: &str,
        duration_column: &str,
        sentinel: &str,
    ) -> Result<DataFrame, ProcessorError> {
        Self::require_columns(df, &[type_column, duration_column])?;

        let mut movies = df
            .clone()
            .lazy()
            .filter(col(type_column).eq(lit(MOVIE)))
            .collect()?;

        let durations = movies.column(duration_column)?;
        if durations.dtype() != &DataType::String {
            return Err(ShapeError::UnexpectedType {
                column: duration_column.to_string(),
                dtype: durations.dtype().to_string(),
                expected: "text",
            }
            .into());
        }

        let minutes = durations
            .str()?
            .into_iter()
            .map(|v| Self::coerce_duration(v.unwrap_or(sentinel), sentinel))
            .collect::<Result<Vec<i64>, ShapeError>>()?;

        movies.with_column(Column::new(duration_column.into(), minutes))?;
        Ok(movies)
    }

    /// Render a cell the way it appears in the source file.
    pub fn cell_to_string(value: &AnyValue) -> String {
        match value {
            AnyValue::Null => String::new(),
            AnyValue::String(s) => s.to_string(),
            AnyValue::StringOwned(s) => s.to_string(),
            other => other.to_string(),
        }
    }

    /// Column values as text, nulls rendered empty.
    pub fn string_values(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        Self::require_columns(df, &[column])?;
        // Row iteration needs a single chunk; CSV reads and fills produce several.
        let series = df.column(column)?.as_materialized_series().rechunk();
        Ok(series.iter().map(|v| Self::cell_to_string(&v)).collect())
    }

    /// Numeric column values as `f64`, nulls rendered as NaN.
    pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, ProcessorError> {
        Self::require_columns(df, &[column])?;
        let col = df.column(column)?;
        if !Self::is_numeric(col.dtype()) {
            return Err(ShapeError::UnexpectedType {
                column: column.to_string(),
                dtype: col.dtype().to_string(),
                expected: "numeric",
            }
            .into());
        }

        let values = col.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Whether a column can feed a numeric chart channel.
    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Boolean
        )
    }

    /// Distinct values of a column in order of first appearance.
    pub fn unique_in_order(values: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        values
            .iter()
            .filter(|v| seen.insert(v.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: &str = "No item specified";

    fn titles() -> DataFrame {
        df!(
            "type" => ["Movie", "Movie", "TV Show"],
            "duration" => ["120 min", SENTINEL, "3 Seasons"],
        )
        .unwrap()
    }

    #[test]
    fn coerce_duration_strips_unit() {
        assert_eq!(DataProcessor::coerce_duration("90 min", SENTINEL), Ok(90));
        assert_eq!(DataProcessor::coerce_duration("5min", SENTINEL), Ok(5));
    }

    #[test]
    fn coerce_duration_maps_sentinel_to_zero() {
        assert_eq!(DataProcessor::coerce_duration(SENTINEL, SENTINEL), Ok(0));
    }

    #[test]
    fn coerce_duration_rejects_other_units() {
        assert_eq!(
            DataProcessor::coerce_duration("3 Seasons", SENTINEL),
            Err(ShapeError::InvalidDuration("3 Seasons".to_string()))
        );
        assert!(DataProcessor::coerce_duration("", SENTINEL).is_err());
    }

    #[test]
    fn movies_only_filters_and_coerces() {
        let df = titles();
        let movies = DataProcessor::movies_only(&df, "type", "duration", SENTINEL).unwrap();

        let minutes: Vec<Option<i64>> = movies
            .column("duration")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(minutes, vec![Some(120), Some(0)]);

        // The source table is untouched.
        assert_eq!(df.column("duration").unwrap().dtype(), &DataType::String);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn movies_only_requires_columns() {
        let err = DataProcessor::movies_only(&titles(), "kind", "duration", SENTINEL).unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::Shape(ShapeError::MissingColumn(ref c)) if c == "kind"
        ));
    }

    #[test]
    fn fill_nulls_converts_and_fills() {
        let df = df!(
            "country" => [Some("India"), None],
            "release_year" => [Some(2019i64), None],
            "rating" => ["PG", "R"],
        )
        .unwrap();

        let cleaned = DataProcessor::fill_nulls(&df, SENTINEL).unwrap();

        assert_eq!(
            DataProcessor::string_values(&cleaned, "country").unwrap(),
            vec!["India", SENTINEL]
        );
        assert_eq!(
            DataProcessor::string_values(&cleaned, "release_year").unwrap(),
            vec!["2019", SENTINEL]
        );
        assert_eq!(cleaned.column("rating").unwrap().null_count(), 0);
        assert_eq!(df.column("country").unwrap().null_count(), 1);
    }

    #[test]
    fn null_mask_marks_missing_cells() {
        let df = df!(
            "director" => [None, Some("Ava")],
            "cast" => [Some("A"), Some("B")],
        )
        .unwrap();

        let mask = DataProcessor::null_mask(&df).unwrap();
        assert_eq!(
            DataProcessor::numeric_values(&mask, "director").unwrap(),
            vec![1.0, 0.0]
        );
        assert_eq!(
            DataProcessor::numeric_values(&mask, "cast").unwrap(),
            vec![0.0, 0.0]
        );
    }

    #[test]
    fn numeric_values_rejects_text() {
        let err = DataProcessor::numeric_values(&titles(), "type").unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::Shape(ShapeError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn unique_in_order_keeps_first_seen() {
        let values: Vec<String> = ["b", "a", "b", "c", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(DataProcessor::unique_in_order(&values), vec!["b", "a", "c"]);
    }
}
