//! Report Module
//! Writes analysis tables as chart and CSV artifacts.

use crate::charts::{ChartRenderer, ChartSpec, RenderError};
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Write `df` as CSV with a header and a leading unnamed row-index column.
///
/// The header starts with a bare comma for the index column. NaN cells are
/// written empty, like nulls.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<(), ReportError> {
    let mut indexed = nan_to_null(&df.with_row_index("".into(), None)?)?;
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(io_error)?;
    let header: Vec<String> = indexed
        .get_column_names()
        .iter()
        .map(|name| header_field(name))
        .collect();
    writeln!(file, "{}", header.join(",")).map_err(io_error)?;

    CsvWriter::new(&mut file)
        .include_header(false)
        .finish(&mut indexed)?;
    Ok(())
}

/// Quote a header name only when it holds a delimiter, quote or line break.
fn header_field(name: &str) -> String {
    if name.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

fn nan_to_null(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut cleared = df.clone();
    for column in df.get_columns() {
        if !matches!(column.dtype(), DataType::Float32 | DataType::Float64) {
            continue;
        }
        let values: Vec<Option<f64>> = column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        cleared.with_column(Column::new(column.name().clone(), values))?;
    }
    Ok(cleared)
}

/// Resolves artifact names to files under the chart and CSV directories.
///
/// The directories must already exist.
#[derive(Debug, Clone)]
pub struct Reporter {
    graphs_dir: PathBuf,
    csv_dir: PathBuf,
}

impl Reporter {
    pub fn new(graphs_dir: impl Into<PathBuf>, csv_dir: impl Into<PathBuf>) -> Self {
        Self {
            graphs_dir: graphs_dir.into(),
            csv_dir: csv_dir.into(),
        }
    }

    pub fn chart_path(&self, name: &str) -> PathBuf {
        self.graphs_dir.join(format!("{}.svg", name))
    }

    /// `name` may already carry the `.csv` extension.
    pub fn csv_path(&self, name: &str) -> PathBuf {
        if name.ends_with(".csv") {
            self.csv_dir.join(name)
        } else {
            self.csv_dir.join(format!("{}.csv", name))
        }
    }

    pub fn render_chart(
        &self,
        df: &DataFrame,
        spec: &ChartSpec,
        name: &str,
    ) -> Result<PathBuf, ReportError> {
        let path = self.chart_path(name);
        ChartRenderer::render(df, spec, &path)?;
        info!("Saved chart {}", path.display());
        Ok(path)
    }

    pub fn render_csv(&self, df: &DataFrame, name: &str) -> Result<PathBuf, ReportError> {
        let path = self.csv_path(name);
        write_csv(df, &path)?;
        info!("Saved table {} ({} rows)", path.display(), df.height());
        Ok(path)
    }
}
