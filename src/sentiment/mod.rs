//! Sentiment module - Polarity scoring and labelling of descriptions

mod classifier;
mod lexicon;

pub use classifier::{
    SentimentClassifier, SentimentError, SentimentLabel, SENTIMENT_COLUMN, TOTAL_CONTENT,
};
pub use lexicon::{LexiconScorer, PolarityScorer};
