//! # Polarity Lexicon
//!
//! Rule-based polarity scoring of short English descriptions.

use std::collections::HashMap;

/// Scores the polarity of a text in `[-1, 1]`.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Multiplier applied to a sentiment word that follows a negation.
const NEGATION_FACTOR: f64 = -0.5;

/// Lexicon scorer: averages the polarity of known words.
///
/// Negations flip and halve the next sentiment word, intensifiers scale it.
/// A text without any known word scores exactly `0.0`.
pub struct LexiconScorer {
    words: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let positive = [
            ("good", 0.7),
            ("great", 0.8),
            ("best", 1.0),
            ("better", 0.5),
            ("love", 0.5),
            ("loving", 0.6),
            ("beautiful", 0.85),
            ("happy", 0.8),
            ("funny", 0.25),
            ("hilarious", 0.5),
            ("fun", 0.3),
            ("charming", 0.5),
            ("heartwarming", 0.6),
            ("inspiring", 0.5),
            ("brilliant", 0.9),
            ("amazing", 0.6),
            ("wonderful", 1.0),
            ("success", 0.3),
            ("successful", 0.75),
            ("famous", 0.5),
            ("young", 0.1),
            ("new", 0.14),
            ("free", 0.4),
            ("true", 0.35),
            ("special", 0.36),
            ("friendly", 0.38),
            ("hope", 0.2),
            ("brave", 0.8),
            ("romantic", 0.5),
            ("epic", 0.3),
            ("talented", 0.7),
            ("powerful", 0.3),
            ("top", 0.5),
            ("unique", 0.38),
            ("perfect", 1.0),
            ("sweet", 0.35),
            ("legendary", 0.5),
            ("fascinating", 0.7),
            ("extraordinary", 0.5),
            ("adventure", 0.2),
        ];

        let negative = [
            ("bad", -0.7),
            ("worst", -1.0),
            ("evil", -1.0),
            ("dark", -0.15),
            ("deadly", -0.2),
            ("dead", -0.2),
            ("dangerous", -0.6),
            ("violent", -0.8),
            ("brutal", -0.88),
            ("cruel", -1.0),
            ("sad", -0.5),
            ("tragic", -0.75),
            ("terrible", -1.0),
            ("horrible", -1.0),
            ("scary", -0.5),
            ("mysterious", -0.1),
            ("strange", -0.05),
            ("poor", -0.4),
            ("lost", -0.2),
            ("lonely", -0.1),
            ("broken", -0.4),
            ("desperate", -0.6),
            ("corrupt", -0.5),
            ("criminal", -0.4),
            ("wrong", -0.5),
            ("difficult", -0.5),
            ("hard", -0.29),
            ("angry", -0.5),
            ("missing", -0.2),
            ("troubled", -0.2),
            ("sinister", -0.5),
            ("ruthless", -0.6),
            ("wicked", -0.5),
            ("fatal", -0.5),
            ("grim", -0.5),
        ];

        let words = positive.into_iter().chain(negative).collect();

        let negations = vec![
            "not", "no", "never", "nor", "neither", "without", "isn't", "wasn't", "aren't",
            "weren't", "don't", "doesn't", "didn't", "can't", "cannot", "won't",
        ];

        let intensifiers = [
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.5),
            ("incredibly", 1.5),
            ("truly", 1.2),
            ("so", 1.3),
            ("most", 1.3),
            ("slightly", 0.5),
            ("somewhat", 0.7),
        ]
        .into_iter()
        .collect();

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .map(|t| t.trim_matches('\'').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let mut scores: Vec<f64> = Vec::new();
        let mut negate = false;
        let mut intensity = 1.0;

        for token in Self::tokens(text) {
            let word = token.as_str();

            if self.negations.iter().any(|n| *n == word) || word.ends_with("n't") {
                negate = true;
                continue;
            }

            if let Some(&mult) = self.intensifiers.get(word) {
                intensity *= mult;
                continue;
            }

            if let Some(&score) = self.words.get(word) {
                let mut score = score * intensity;
                if negate {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score);
                negate = false;
                intensity = 1.0;
            }
        }

        if scores.is_empty() {
            return 0.0;
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unknown_words_are_neutral() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("A chef travels across Peru."), 0.0);
        assert_eq!(scorer.polarity(""), 0.0);
    }

    #[test]
    fn averages_known_words() {
        let scorer = LexiconScorer::new();
        assert_relative_eq!(scorer.polarity("A good and bad day"), 0.0);
        assert_relative_eq!(scorer.polarity("Great, wonderful!"), 0.9);
    }

    #[test]
    fn negation_flips_and_halves() {
        let scorer = LexiconScorer::new();
        assert_relative_eq!(scorer.polarity("This is not good"), -0.35);
        assert_relative_eq!(scorer.polarity("It wasn't bad"), 0.35);
    }

    #[test]
    fn intensifiers_scale_and_clamp() {
        let scorer = LexiconScorer::new();
        assert_relative_eq!(scorer.polarity("a very sad story"), -0.65);
        assert_relative_eq!(scorer.polarity("extremely perfect"), 1.0);
    }

    #[test]
    fn case_and_punctuation_are_ignored() {
        let scorer = LexiconScorer::new();
        assert_eq!(
            scorer.polarity("EVIL returns."),
            scorer.polarity("evil returns")
        );
    }
}
