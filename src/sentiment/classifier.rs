//! # Sentiment Classifier
//!
//! Labels each description and counts labels per release year.

use super::lexicon::PolarityScorer;
use crate::data::{DataProcessor, ShapeError};
use crate::stats::{Aggregator, StatsError, COUNTS};
use polars::prelude::*;
use rayon::prelude::*;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Column holding the label added by [`SentimentClassifier::classify`].
pub const SENTIMENT_COLUMN: &str = "Sentiment";

/// Count column of [`SentimentClassifier::sentiment_trend`].
pub const TOTAL_CONTENT: &str = "total_content";

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Three-way sentiment of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// `p > 0` is positive, `p < 0` negative, anything else neutral.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            SentimentLabel::Positive
        } else if polarity < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies a polarity scorer to a text column.
pub struct SentimentClassifier<'a> {
    scorer: &'a dyn PolarityScorer,
}

impl<'a> SentimentClassifier<'a> {
    pub fn new(scorer: &'a dyn PolarityScorer) -> Self {
        Self { scorer }
    }

    /// Label every text in the slice, preserving order.
    pub fn labels<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<SentimentLabel> {
        texts
            .par_iter()
            .map(|t| SentimentLabel::from_polarity(self.scorer.polarity(t.as_ref())))
            .collect()
    }

    /// Copy of the table with a [`SENTIMENT_COLUMN`] label per row.
    ///
    /// A null text is scored as the empty string.
    pub fn classify(&self, df: &DataFrame, text_column: &str) -> Result<DataFrame, SentimentError> {
        DataProcessor::require_columns(df, &[text_column])?;

        let column = df.column(text_column)?;
        if column.dtype() != &DataType::String {
            return Err(ShapeError::UnexpectedType {
                column: text_column.to_string(),
                dtype: column.dtype().to_string(),
                expected: "text",
            }
            .into());
        }

        let texts: Vec<&str> = column
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect();
        let labels: Vec<&str> = self.labels(&texts).iter().map(|l| l.as_str()).collect();

        let mut classified = df.clone();
        classified.with_column(Column::new(SENTIMENT_COLUMN.into(), labels))?;

        debug!("Classified {} rows of {}", classified.height(), text_column);
        Ok(classified)
    }

    /// Count classified rows per `(year, label)` from `min_year` onwards.
    pub fn sentiment_trend(
        df: &DataFrame,
        year_column: &str,
        min_year: i64,
    ) -> Result<DataFrame, SentimentError> {
        let mut grouped = Aggregator::group_count(df, &[year_column, SENTIMENT_COLUMN])?;
        grouped.rename(COUNTS, TOTAL_CONTENT.into())?;

        Ok(Aggregator::since_year(&grouped, year_column, min_year)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexiconScorer;

    struct FixedScorer;

    impl PolarityScorer for FixedScorer {
        fn polarity(&self, text: &str) -> f64 {
            text.parse().unwrap_or(0.0)
        }
    }

    #[test]
    fn label_rule_is_total() {
        assert_eq!(SentimentLabel::from_polarity(0.4), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(-0.01), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(f64::NAN), SentimentLabel::Neutral);
    }

    #[test]
    fn classify_adds_label_column() {
        let df = df!(
            "release_year" => [2019i64, 2020, 2021],
            "description" => ["0.5", "0", "-0.2"],
        )
        .unwrap();
        let scorer = FixedScorer;

        let classified = SentimentClassifier::new(&scorer)
            .classify(&df, "description")
            .unwrap();

        assert_eq!(
            DataProcessor::string_values(&classified, SENTIMENT_COLUMN).unwrap(),
            vec!["Positive", "Neutral", "Negative"]
        );
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn classify_is_deterministic_with_lexicon() {
        let df = df!(
            "description" => [
                "A brilliant young chef.",
                "A brutal crime lord.",
                "Documentary about trains.",
            ],
        )
        .unwrap();
        let scorer = LexiconScorer::new();
        let classifier = SentimentClassifier::new(&scorer);

        let first = classifier.classify(&df, "description").unwrap();
        let second = classifier.classify(&df, "description").unwrap();

        let labels = DataProcessor::string_values(&first, SENTIMENT_COLUMN).unwrap();
        assert_eq!(labels, vec!["Positive", "Negative", "Neutral"]);
        assert_eq!(
            labels,
            DataProcessor::string_values(&second, SENTIMENT_COLUMN).unwrap()
        );
    }

    #[test]
    fn classify_rejects_numeric_text_column() {
        let df = df!("description" => [1i64, 2]).unwrap();
        let scorer = FixedScorer;
        let err = SentimentClassifier::new(&scorer)
            .classify(&df, "description")
            .unwrap_err();
        assert!(matches!(err, SentimentError::Shape(ShapeError::UnexpectedType { .. })));
    }

    #[test]
    fn sentiment_trend_counts_by_year_and_label() {
        let df = df!(
            "release_year" => [2008i64, 2012, 2012, 2012, 2015],
            "description" => ["1", "1", "1", "-1", "0"],
        )
        .unwrap();
        let scorer = FixedScorer;
        let classified = SentimentClassifier::new(&scorer)
            .classify(&df, "description")
            .unwrap();

        let trend = SentimentClassifier::sentiment_trend(&classified, "release_year", 2010).unwrap();

        assert_eq!(
            DataProcessor::numeric_values(&trend, "release_year").unwrap(),
            vec![2012.0, 2012.0, 2015.0]
        );
        assert_eq!(
            DataProcessor::string_values(&trend, SENTIMENT_COLUMN).unwrap(),
            vec!["Negative", "Positive", "Neutral"]
        );
        assert_eq!(
            DataProcessor::numeric_values(&trend, TOTAL_CONTENT).unwrap(),
            vec![1.0, 2.0, 1.0]
        );
    }
}
