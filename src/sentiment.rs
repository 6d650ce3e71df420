//! Reflection sentiment scoring
//!
//! The engine only consumes an integer score; anything implementing
//! [`SentimentScorer`] can be plugged in. [`LexiconScorer`] is a small
//! word-list scorer that runs fully on device.

use crate::error::SentimentError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scores free text; negative is sad, positive is happy, 0 is neutral
pub trait SentimentScorer {
    fn score(&self, text: &str) -> Result<i32, SentimentError>;
}

/// Coarse sentiment class of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

pub fn classify(score: i32) -> Sentiment {
    match score {
        s if s > 0 => Sentiment::Positive,
        s if s < 0 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// Word valences on a -5..=5 scale
const LEXICON: &[(&str, i32)] = &[
    ("abandoned", -2),
    ("afraid", -2),
    ("alone", -2),
    ("amazing", 4),
    ("angry", -3),
    ("anxious", -2),
    ("ashamed", -2),
    ("awesome", 4),
    ("awful", -3),
    ("bad", -3),
    ("beautiful", 3),
    ("better", 2),
    ("blessed", 3),
    ("bored", -2),
    ("brilliant", 4),
    ("calm", 2),
    ("cheerful", 2),
    ("confident", 2),
    ("crying", -2),
    ("depressed", -2),
    ("devastated", -2),
    ("disappointed", -2),
    ("down", -1),
    ("drained", -2),
    ("energized", 2),
    ("excellent", 3),
    ("excited", 3),
    ("exhausted", -2),
    ("fantastic", 4),
    ("fine", 2),
    ("frustrated", -2),
    ("fun", 4),
    ("glad", 3),
    ("good", 3),
    ("grateful", 3),
    ("great", 3),
    ("grief", -2),
    ("happy", 3),
    ("hate", -3),
    ("hopeful", 2),
    ("hopeless", -2),
    ("horrible", -3),
    ("hurt", -2),
    ("inspired", 2),
    ("joy", 3),
    ("lonely", -2),
    ("love", 3),
    ("loved", 3),
    ("miserable", -3),
    ("nervous", -2),
    ("nice", 3),
    ("overwhelmed", -2),
    ("pain", -2),
    ("panic", -3),
    ("peaceful", 2),
    ("productive", 2),
    ("proud", 2),
    ("relaxed", 2),
    ("rested", 2),
    ("sad", -2),
    ("scared", -2),
    ("stressed", -2),
    ("strong", 2),
    ("stuck", -2),
    ("terrible", -3),
    ("thankful", 2),
    ("tired", -2),
    ("upset", -2),
    ("useless", -2),
    ("win", 4),
    ("wonderful", 4),
    ("worried", -3),
    ("worse", -3),
    ("worst", -3),
    ("worthless", -2),
];

const NEGATORS: &[&str] = &["not", "no", "never", "don't", "didn't", "isn't", "wasn't", "can't", "cannot"];

/// How many tokens a negator reaches forward
const NEGATION_REACH: usize = 3;

/// Word-list sentiment scorer with simple negation handling
pub struct LexiconScorer {
    valences: HashMap<&'static str, i32>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: LEXICON.iter().copied().collect(),
        }
    }

    /// Sum word valences; a negator flips the next scored word within reach
    pub fn score_text(&self, text: &str) -> i32 {
        let mut total = 0;
        let mut negation_left = 0usize;

        for token in tokenize(text) {
            if NEGATORS.contains(&token.as_str()) {
                negation_left = NEGATION_REACH;
                continue;
            }
            if let Some(valence) = self.valences.get(token.as_str()) {
                total += if negation_left > 0 { -valence } else { *valence };
                negation_left = 0;
            } else {
                negation_left = negation_left.saturating_sub(1);
            }
        }
        total
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<i32, SentimentError> {
        Ok(self.score_text(text))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase().replace('\u{2019}', "'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score_text(""), 0);
        assert_eq!(scorer.score_text("   \n"), 0);
        assert_eq!(classify(0), Sentiment::Neutral);
    }

    #[test]
    fn test_positive_and_negative() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score_text("I feel happy and grateful!"), 6);
        assert_eq!(scorer.score_text("So tired, stressed and lonely."), -6);
        assert_eq!(classify(6), Sentiment::Positive);
        assert_eq!(classify(-6), Sentiment::Negative);
        assert_eq!(classify(-6).as_str(), "negative");
    }

    #[test]
    fn test_case_insensitive() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score_text("GREAT day"), 3);
        assert_eq!(scorer.score_text("I don\u{2019}t feel good"), -3);
    }

    #[test]
    fn test_negation_flips_next_word() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score_text("not good"), -3);
        assert_eq!(scorer.score_text("I'm not feeling very good"), -3);
        // Out of reach
        assert_eq!(scorer.score_text("not that I would say it was good"), 3);
    }

    #[test]
    fn test_trait_object() {
        let scorer: Box<dyn SentimentScorer> = Box::new(LexiconScorer::default());
        assert_eq!(scorer.score("awful").unwrap(), -3);
    }
}
