//! Article matching and classification engine.
//!
//! The engine is a pure, in-memory component. It has no I/O and no cache;
//! every call recomputes from the folded keyword tables.
//!
//! - [`categorizer`]: assigns a [`Category`](crate::models::Category) by keyword voting
//! - [`sentiment`]: assigns a [`Sentiment`](crate::models::Sentiment) by keyword voting
//! - [`scorer`]: ranks the working set against a free-text query
//! - [`lexicon`]: the injectable keyword tables behind all three

pub mod categorizer;
pub mod lexicon;
pub mod scorer;
pub mod sentiment;

pub use lexicon::Lexicon;
pub use scorer::{ScoreWeights, Scored};

use crate::models::{Article, Category, RawArticle, Sentiment};
use categorizer::Categorizer;
use scorer::RelevanceScorer;
use sentiment::SentimentTagger;

/// Ranked results kept when the configuration does not set `top_k`.
pub const DEFAULT_TOP_K: usize = 5;

/// The categorizer, sentiment tagger and relevance scorer built from one [`Lexicon`].
#[derive(Debug, Clone)]
pub struct Engine {
    categorizer: Categorizer,
    tagger: SentimentTagger,
    scorer: RelevanceScorer,
}

impl Engine {
    pub fn new(lexicon: &Lexicon, weights: ScoreWeights, top_k: usize) -> Self {
        let folded = lexicon.folded();
        Self {
            categorizer: Categorizer::new(folded.categories),
            tagger: SentimentTagger::new(folded.positive, folded.negative),
            scorer: RelevanceScorer::new(weights, folded.expansions, folded.compounds, top_k.max(1)),
        }
    }

    pub fn classify(&self, title: &str, content: &str) -> Category {
        self.categorizer.classify(title, content)
    }

    pub fn tag_sentiment(&self, text: &str) -> Sentiment {
        self.tagger.tag(text)
    }

    pub fn rank<'a>(&self, query: &str, articles: &'a [Article]) -> Vec<Scored<'a>> {
        self.scorer.rank(query, articles)
    }

    #[cfg(test)]
    pub fn top_k(&self) -> usize {
        self.scorer.top_k()
    }

    /// Label a raw article. Labels are fixed from here on.
    pub fn ingest(&self, raw: RawArticle) -> Article {
        let category = self.classify(&raw.title, &raw.content);
        let sentiment = self.tag_sentiment(&format!("{} {}", raw.title, raw.content));
        Article {
            title: raw.title,
            content: raw.content,
            published_on: raw.published_on,
            published_at: raw.published_at,
            category,
            sentiment,
            url: raw.url,
            source_url: raw.source_url,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&Lexicon::default(), ScoreWeights::default(), DEFAULT_TOP_K)
    }
}
