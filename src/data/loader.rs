//! CSV Data Loader Module
//! Reads the raw titles dataset and produces the cleaned table using Polars.

use super::processor::{DataProcessor, ShapeError};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Dataset not found: {0}")]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Loads the titles dataset, indexed by an identifier column.
#[derive(Debug, Clone)]
pub struct DataLoader {
    index_column: String,
    null_fill: String,
}

impl DataLoader {
    pub fn new(index_column: impl Into<String>, null_fill: impl Into<String>) -> Self {
        Self {
            index_column: index_column.into(),
            null_fill: null_fill.into(),
        }
    }

    pub fn index_column(&self) -> &str {
        &self.index_column
    }

    pub fn null_fill(&self) -> &str {
        &self.null_fill
    }

    /// Load the dataset verbatim, with the index column moved to the front.
    pub fn load_raw(&self, path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let df = self.index_first(df)?;
        debug!("Loaded {} with shape {:?}", path.display(), df.shape());
        Ok(df)
    }

    /// Load the dataset and replace every null cell with the fill value.
    ///
    /// When `export_path` is given the cleaned table is also written there.
    pub fn load_clean(
        &self,
        path: impl AsRef<Path>,
        export_path: Option<&Path>,
    ) -> Result<DataFrame, LoaderError> {
        let raw = self.load_raw(path)?;
        let mut cleaned = DataProcessor::fill_nulls(&raw, &self.null_fill)?;

        if let Some(export_path) = export_path {
            let mut file = File::create(export_path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut cleaned)?;
            info!("Exported cleaned dataset to {}", export_path.display());
        }

        Ok(cleaned)
    }

    fn index_first(&self, df: DataFrame) -> Result<DataFrame, LoaderError> {
        DataProcessor::require_columns(&df, &[self.index_column.as_str()])?;

        let mut order: Vec<String> = vec![self.index_column.clone()];
        order.extend(
            df.get_column_names()
                .iter()
                .map(|s| s.to_string())
                .filter(|name| name != &self.index_column),
        );

        Ok(df.select(order)?)
    }
}
