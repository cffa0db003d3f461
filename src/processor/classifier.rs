#[cfg(test)]
use mockall::automock;

use crate::InputRecord;
use crate::Sentiment;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Sentiment,
    /// Within `[0, 1]`
    pub confidence: f64,
}

#[cfg_attr(test, automock)]
pub trait Classifier: Send + Sync + 'static {
    fn classify(
        &self,
        record: &InputRecord,
    ) -> Classification;
}

pub(crate) const POSITIVE_WORDS: &[&str] = &[
    "amazing",
    "beautiful",
    "brilliant",
    "compelling",
    "engaging",
    "exceeded",
    "excellent",
    "fantastic",
    "good",
    "great",
    "heartwarming",
    "love",
    "loved",
    "masterpiece",
    "outstanding",
    "recommend",
    "superb",
    "touched",
    "touching",
    "unforgettable",
    "wonderful",
];

pub(crate) const NEGATIVE_WORDS: &[&str] = &[
    "awful",
    "bad",
    "boring",
    "disappointing",
    "disappointment",
    "disaster",
    "mediocre",
    "poor",
    "poorly",
    "regret",
    "terrible",
    "waste",
    "weak",
    "worst",
];

/// Counts positive and negative lexicon words in the review text.
///
/// The label follows the majority; confidence grows with the margin, from 0.5
/// on a near tie to 1.0 when every hit agrees. No hits, or a tie, is
/// [`Sentiment::Unknown`] at 0.5.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> (u32, u32) {
        let mut pos = 0;
        let mut neg = 0;
        for word in text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if POSITIVE_WORDS.binary_search(&word.as_str()).is_ok() {
                pos += 1;
            } else if NEGATIVE_WORDS.binary_search(&word.as_str()).is_ok() {
                neg += 1;
            }
        }
        (pos, neg)
    }
}

impl Classifier for LexiconClassifier {
    fn classify(
        &self,
        record: &InputRecord,
    ) -> Classification {
        let (pos, neg) = Self::score(&record.text);
        if pos == neg {
            return Classification {
                label: Sentiment::Unknown,
                confidence: 0.5,
            };
        }

        let label = if pos > neg { Sentiment::Positive } else { Sentiment::Negative };
        let margin = pos.abs_diff(neg) as f64 / (pos + neg) as f64;
        Classification {
            label,
            confidence: 0.5 + 0.5 * margin,
        }
    }
}
