//! Workflow Driver
//! Runs the fixed analysis sequence over the titles dataset and writes every
//! artifact. The first failing step aborts the run.

use crate::charts::{ChartKind, ChartMapping, ChartSpec, FacetStyle};
use crate::config::WorkflowConfig;
use crate::data::{DataLoader, DataProcessor};
use crate::report::Reporter;
use crate::sentiment::{
    LexiconScorer, SentimentClassifier, SENTIMENT_COLUMN, TOTAL_CONTENT,
};
use crate::stats::{Aggregator, TrendQuery, COUNT, COUNTS};
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::PathBuf;
use tracing::info;

const TYPE: &str = "type";
const RATING: &str = "rating";
const RELEASE_YEAR: &str = "release_year";
const DESCRIPTION: &str = "description";
const DURATION: &str = "duration";
const TREND_YEAR: &str = "Release Year";
const TREND_COUNT: &str = "Total Content";

/// `(key, value)` pairs summarised over the movie view.
const SUMMARY_PAIRS: [(&str, &str); 7] = [
    ("listed_in", DURATION),
    ("director", DURATION),
    (TYPE, DURATION),
    ("cast", DURATION),
    ("country", DURATION),
    (RATING, RELEASE_YEAR),
    ("listed_in", RELEASE_YEAR),
];

/// One categorical distribution chart over the movie view.
struct Distribution {
    name: &'static str,
    x: &'static str,
    y: &'static str,
    style: FacetStyle,
    x_label: &'static str,
    y_label: &'static str,
    title: &'static str,
}

const DISTRIBUTIONS: [Distribution; 3] = [
    Distribution {
        name: "dist_plot_of_movie_rating_vrs_duration",
        x: RATING,
        y: DURATION,
        style: FacetStyle::Violin,
        x_label: "Rating",
        y_label: "Movie Duration",
        title: "Distribution of movie rating and duration",
    },
    Distribution {
        name: "dist_plot_of_movie_durations_vrs_countries",
        x: "country",
        y: DURATION,
        style: FacetStyle::Box,
        x_label: "Country",
        y_label: "Duration",
        title: "Distribution of movie duration and countries",
    },
    Distribution {
        name: "dist_plot_of_movie_released-yr_vrs_countries",
        x: "country",
        y: RELEASE_YEAR,
        style: FacetStyle::Violin,
        x_label: "Country",
        y_label: "release_year",
        title: "Distribution of movie released and country",
    },
];

/// File name of a `summary_stats` CSV.
pub fn summary_csv_name(key_column: &str, value_column: &str) -> String {
    format!("mean-std-median of {}-{} columns.csv", key_column, value_column)
}

/// Run every step in order and return the paths of the written artifacts.
pub fn run(config: &WorkflowConfig) -> Result<Vec<PathBuf>> {
    let loader = DataLoader::new(&config.index_column, &config.null_fill);
    let reporter = Reporter::new(&config.graphs_dir, &config.csv_dir);
    let mut artifacts = Vec::new();

    info!("Loading {}", config.input.display());
    let df = loader
        .load_clean(&config.input, Some(&config.cleaned_export))
        .context("Failed to load cleaned dataset")?;
    artifacts.push(config.cleaned_export.clone());
    let raw = loader
        .load_raw(&config.input)
        .context("Failed to load raw dataset")?;
    info!("Loaded {} titles with {} columns", df.height(), df.width());

    artifacts.push(null_heatmap(&raw, &loader, &reporter)?);
    artifacts.extend(ratings(&df, &reporter)?);
    artifacts.push(type_split(&df, &reporter)?);
    artifacts.extend(production_trend(&df, config.min_year, &reporter)?);
    artifacts.extend(sentiment(&df, config.min_year, &reporter)?);

    info!("Building movie view");
    let movies = DataProcessor::movies_only(&df, TYPE, DURATION, &config.null_fill)
        .context("Failed to build movie view")?;
    artifacts.extend(movie_summaries(&movies, &reporter)?);
    artifacts.extend(distributions(
        &movies,
        config.top_n,
        &config.null_fill,
        &reporter,
    )?);

    info!("Workflow finished, {} artifacts written", artifacts.len());
    Ok(artifacts)
}

fn null_heatmap(raw: &DataFrame, loader: &DataLoader, reporter: &Reporter) -> Result<PathBuf> {
    info!("Plotting null values");
    let mask = DataProcessor::null_mask(&raw.drop(loader.index_column())?)?;
    let spec = ChartSpec::new(ChartKind::Heatmap, ChartMapping::new())
        .title("Count of null values in columns")
        .axis_labels("Columns", "Id")
        .figsize(10.4, 10.4);

    Ok(reporter
        .render_chart(&mask, &spec, "sum_of_nulls_in_columns")
        .context("Failed to render null heatmap")?)
}

fn ratings(df: &DataFrame, reporter: &Reporter) -> Result<Vec<PathBuf>> {
    info!("Counting ratings");
    let counts = Aggregator::group_count(df, &[RATING]).context("Failed to count ratings")?;
    let spec = ChartSpec::new(ChartKind::Bar, ChartMapping::new().x(COUNTS).y(RATING))
        .title("Available Netflix Ratings")
        .axis_labels("Total Counts", "Ratings")
        .figsize(16.0, 15.0);

    let name = "netflix_content_ratings";
    Ok(vec![
        reporter.render_chart(&counts, &spec, name)?,
        reporter.render_csv(&counts, name)?,
    ])
}

fn type_split(df: &DataFrame, reporter: &Reporter) -> Result<PathBuf> {
    info!("Counting movies and TV shows");
    let counts = Aggregator::value_counts(df, &[TYPE]).context("Failed to count types")?;
    let spec = ChartSpec::new(ChartKind::Pie, ChartMapping::new().x(COUNT).labels(TYPE))
        .title("Number of Movies and TV shows in the dataset");

    Ok(reporter.render_chart(&counts, &spec, "movies_vrs_series")?)
}

fn production_trend(df: &DataFrame, min_year: i64, reporter: &Reporter) -> Result<Vec<PathBuf>> {
    info!("Computing production trend since {}", min_year);
    DataProcessor::require_columns(df, &[TYPE, RELEASE_YEAR])?;
    let mut projected = df.select([TYPE, RELEASE_YEAR])?;
    projected.rename(RELEASE_YEAR, TREND_YEAR.into())?;

    let query = TrendQuery {
        keep_columns: vec![TYPE.to_string(), TREND_YEAR.to_string()],
        group_columns: vec![TREND_YEAR.to_string(), TYPE.to_string()],
        year_column: TREND_YEAR.to_string(),
        min_year,
        count_column: TREND_COUNT.to_string(),
    };
    let trend = Aggregator::trend(&projected, &query).context("Failed to compute production trend")?;

    let spec = ChartSpec::new(
        ChartKind::Line,
        ChartMapping::new().x(TREND_YEAR).y(TREND_COUNT).hue(TYPE),
    )
    .title("Netflix content production trend over the years")
    .axis_labels("Released Year", TREND_COUNT)
    .figsize(12.0, 12.0);

    let name = "content_prod_trend";
    Ok(vec![
        reporter.render_chart(&trend, &spec, name)?,
        reporter.render_csv(&trend, name)?,
    ])
}

fn sentiment(df: &DataFrame, min_year: i64, reporter: &Reporter) -> Result<Vec<PathBuf>> {
    info!("Classifying description sentiment");
    DataProcessor::require_columns(df, &[RELEASE_YEAR, DESCRIPTION])?;
    let texts = df.select([RELEASE_YEAR, DESCRIPTION])?;

    let scorer = LexiconScorer::new();
    let classified = SentimentClassifier::new(&scorer)
        .classify(&texts, DESCRIPTION)
        .context("Failed to classify descriptions")?;
    let trend = SentimentClassifier::sentiment_trend(&classified, RELEASE_YEAR, min_year)
        .context("Failed to count sentiment per year")?;

    let spec = ChartSpec::new(
        ChartKind::Bar,
        ChartMapping::new()
            .x(RELEASE_YEAR)
            .y(TOTAL_CONTENT)
            .hue(SENTIMENT_COLUMN),
    )
    .title("Sentiment of content on Netflix")
    .axis_labels("Release Year", "Total Content")
    .figsize(10.4, 10.4);

    let name = "content_sentiment";
    Ok(vec![
        reporter.render_chart(&trend, &spec, name)?,
        reporter.render_csv(&trend, name)?,
    ])
}

fn movie_summaries(movies: &DataFrame, reporter: &Reporter) -> Result<Vec<PathBuf>> {
    SUMMARY_PAIRS
        .iter()
        .map(|(key, value)| -> Result<PathBuf> {
            info!("Summarising {} by {}", value, key);
            let summary = Aggregator::summary_stats(movies, key, value)
                .with_context(|| format!("Failed to summarise {} by {}", value, key))?;
            Ok(reporter.render_csv(&summary, &summary_csv_name(key, value))?)
        })
        .collect()
}

fn distributions(
    movies: &DataFrame,
    top_n: usize,
    exclude: &str,
    reporter: &Reporter,
) -> Result<Vec<PathBuf>> {
    DISTRIBUTIONS
        .iter()
        .map(|d| -> Result<PathBuf> {
            info!("Plotting {} distribution over {}", d.y, d.x);
            let frame = Aggregator::distribution_frame(movies, d.x, d.y, top_n, exclude)
                .with_context(|| format!("Failed to build {} distribution", d.name))?;
            let spec = ChartSpec::new(
                ChartKind::CategoricalFacet(d.style),
                ChartMapping::new().x(d.x).y(d.y),
            )
            .title(d.title)
            .axis_labels(d.x_label, d.y_label)
            .figsize(12.0, 6.0);

            Ok(reporter.render_chart(&frame, &spec, d.name)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_csv_names_follow_key_and_value() {
        assert_eq!(
            summary_csv_name("listed_in", "duration"),
            "mean-std-median of listed_in-duration columns.csv"
        );
    }

    #[test]
    fn null_heatmap_skips_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let raw = df!(
            "show_id" => ["s1", "s2"],
            "director" => [Some("Jane Doe"), None],
        )
        .unwrap();
        let loader = DataLoader::new("show_id", "No item specified");
        let reporter = Reporter::new(dir.path(), dir.path());

        let path = null_heatmap(&raw, &loader, &reporter).unwrap();
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("director"));
        assert!(!svg.contains("show_id"));
    }

    #[test]
    fn production_trend_renames_year_column() {
        let dir = tempfile::tempdir().unwrap();
        let df = df!(
            "type" => ["Movie", "Movie", "TV Show", "Movie"],
            "release_year" => [2005i64, 2015, 2015, 2010],
        )
        .unwrap();
        let reporter = Reporter::new(dir.path(), dir.path());

        let paths = production_trend(&df, 2010, &reporter).unwrap();
        let csv = std::fs::read_to_string(&paths[1]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].ends_with(",Release Year,type,Total Content"));
        assert_eq!(lines[1..], ["0,2010,Movie,1", "1,2015,Movie,1", "2,2015,TV Show,1"]);
    }
}
