//! Sentiment tagging by counting positive and negative indicator terms.

use crate::engine::lexicon::{distinct_hits, fold};
use crate::models::Sentiment;

#[derive(Debug, Clone)]
pub struct SentimentTagger {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl SentimentTagger {
    /// Both lists must already be folded.
    pub fn new(positive: Vec<String>, negative: Vec<String>) -> Self {
        Self { positive, negative }
    }

    /// Positive when more distinct positive terms occur than negative ones,
    /// Negative for the converse, Neutral on any tie (including 0/0).
    pub fn tag(&self, text: &str) -> Sentiment {
        let text = fold(text);
        let positive = distinct_hits(&text, &self.positive);
        let negative = distinct_hits(&text, &self.negative);

        if positive > negative {
            Sentiment::Positive
        } else if negative > positive {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}
