//! Topical categorization by keyword-presence voting.

use crate::engine::lexicon::{distinct_hits, fold};
use crate::models::Category;
use std::collections::BTreeMap;

/// Assigns one [`Category`] to an article from its title and content.
#[derive(Debug, Clone)]
pub struct Categorizer {
    /// Folded keyword lists, iterated in category declaration order.
    keywords: BTreeMap<Category, Vec<String>>,
}

impl Categorizer {
    /// `keywords` must already be folded (see [`crate::engine::Lexicon::folded`]).
    pub fn new(keywords: BTreeMap<Category, Vec<String>>) -> Self {
        Self { keywords }
    }

    /// Pick the category whose keyword list has the most distinct hits.
    ///
    /// Ties go to the category declared first in [`Category`]; a text with
    /// no hits at all is [`Category::General`].
    pub fn classify(&self, title: &str, content: &str) -> Category {
        let text = fold(&format!("{title} {content}"));

        let mut best = Category::General;
        let mut best_score = 0usize;
        for (category, terms) in &self.keywords {
            let score = distinct_hits(&text, terms);
            if score > best_score {
                best = *category;
                best_score = score;
            }
        }
        tracing::trace!(category = ?best, score = best_score, "Classified article");
        best
    }
}
