//! Relevance ranking of the working set against a free-text query.
//!
//! The score of an article is the sum of:
//!
//! 1. **Token matches**: every distinct whitespace token of the folded query
//!    earns `weights.title` when found in the title, `weights.content` when
//!    found in the content and `weights.category` when found in the category
//!    label. Title matches must always weigh more than content matches, and
//!    content more than category.
//! 2. **Term expansion**: for every expansion key contained in the query,
//!    `weights.expansion` per related term found in title + content. Users
//!    write "전세대출" where articles write "전세자금대출".
//! 3. **Compound bonus**: a [`CompoundRule`] activated by the query adds its
//!    bonus when all of its terms occur in the article.
//!
//! Articles scoring zero are dropped; the rest are sorted by score with a
//! stable sort, so ties keep working-set order.

use crate::engine::lexicon::{CompoundRule, distinct_hits, fold};
use crate::models::Article;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Per-field weights of the relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub title: u32,
    pub content: u32,
    pub category: u32,
    pub expansion: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title: 3,
            content: 2,
            category: 1,
            expansion: 2,
        }
    }
}

impl ScoreWeights {
    /// Title matches must outweigh content matches, which must outweigh label matches.
    pub fn is_ordered(&self) -> bool {
        self.title > self.content && self.content > self.category
    }
}

/// An article from the working set together with its relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored<'a> {
    pub article: &'a Article,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: ScoreWeights,
    expansions: BTreeMap<String, Vec<String>>,
    compounds: Vec<CompoundRule>,
    top_k: usize,
}

impl RelevanceScorer {
    /// `expansions` and `compounds` must already be folded.
    pub fn new(
        weights: ScoreWeights,
        expansions: BTreeMap<String, Vec<String>>,
        compounds: Vec<CompoundRule>,
        top_k: usize,
    ) -> Self {
        Self {
            weights,
            expansions,
            compounds,
            top_k,
        }
    }

    #[cfg(test)]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rank `articles` against `query` and keep at most `top_k` of them.
    ///
    /// Returns an empty vector when nothing scores above zero; choosing a
    /// fallback is up to the caller.
    pub fn rank<'a>(&self, query: &str, articles: &'a [Article]) -> Vec<Scored<'a>> {
        let query = fold(query);
        let tokens: Vec<&str> = query.split_whitespace().unique().collect();

        let mut ranked: Vec<Scored<'a>> = articles
            .iter()
            .map(|article| Scored {
                article,
                score: self.score(&query, &tokens, article),
            })
            .filter(|s| s.score > 0)
            .collect();
        let matched = ranked.len();

        // sort_by is stable: equal scores keep ingestion order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.top_k);

        debug!(
            candidates = articles.len(),
            matched,
            returned = ranked.len(),
            top_score = ranked.first().map(|s| s.score).unwrap_or(0),
            "Ranked working set"
        );
        ranked
    }

    fn score(&self, query: &str, tokens: &[&str], article: &Article) -> u32 {
        let title = fold(&article.title);
        let content = fold(&article.content);
        let label = fold(article.category.label());
        let combined = format!("{title} {content}");
        let w = self.weights;

        let mut score = 0u32;
        for token in tokens {
            if title.contains(token) {
                score += w.title;
            }
            if content.contains(token) {
                score += w.content;
            }
            if label.contains(token) {
                score += w.category;
            }
        }

        for (key, related) in &self.expansions {
            if query.contains(key.as_str()) {
                score += w.expansion * distinct_hits(&combined, related) as u32;
            }
        }

        for rule in &self.compounds {
            let active = rule
                .activators()
                .iter()
                .any(|t| query.contains(t.as_str()));
            if active && rule.terms.iter().all(|t| combined.contains(t.as_str())) {
                score += rule.bonus;
            }
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Lexicon;
    use crate::models::Category;
    use crate::models::tests::article;

    fn scorer() -> RelevanceScorer {
        let lexicon = Lexicon::default().folded();
        RelevanceScorer::new(
            ScoreWeights::default(),
            lexicon.expansions,
            lexicon.compounds,
            5,
        )
    }

    #[test]
    fn test_empty_working_set() {
        assert!(scorer().rank("금리", &[]).is_empty());
        assert!(scorer().rank("", &[]).is_empty());
    }

    #[test]
    fn test_unrelated_article_is_excluded() {
        let articles = vec![article("날씨 맑음", "주말 나들이", "2025-05-06", Category::General)];
        assert!(scorer().rank("반도체", &articles).is_empty());
    }

    #[test]
    fn test_title_outranks_content() {
        let articles = vec![
            article("오늘의 뉴스", "반도체 업황", "2025-05-06", Category::General),
            article("반도체 업황", "오늘의 뉴스", "2025-05-06", Category::General),
        ];
        let ranked = scorer().rank("반도체", &articles);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].article.title, "반도체 업황");
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[1].score, 2);
    }

    #[test]
    fn test_category_label_match_is_lowest() {
        let articles = vec![article("환율 동향", "수출", "2025-05-06", Category::Economy)];
        let ranked = scorer().rank("경제", &articles);
        assert_eq!(ranked[0].score, 1);
    }

    #[test]
    fn test_expansion_finds_formal_term() {
        let articles = vec![
            article(
                "전세자금대출 한도 축소",
                "은행권 심사 강화",
                "2025-05-06",
                Category::Economy,
            ),
            article("프로야구 개막", "관중 증가", "2025-05-06", Category::Culture),
        ];
        let ranked = scorer().rank("전세대출", &articles);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].article.title, "전세자금대출 한도 축소");
        // +2 expansion (전세자금대출) and +5 compound (전세 + 대출)
        assert_eq!(ranked[0].score, 7);
    }

    #[test]
    fn test_compound_needs_every_term() {
        let articles = vec![
            article("대출 거부 사례 급증", "", "2025-05-06", Category::Economy),
            article("대출 금리 동결", "", "2025-05-06", Category::Economy),
        ];
        let ranked = scorer().rank("대출 거절", &articles);
        // first: 대출 in title (3) + expansion 거부 (2) + compound 대출+거부 (5)
        assert_eq!(ranked[0].score, 10);
        assert_eq!(ranked[1].score, 3);
    }

    #[test]
    fn test_compound_fires_only_on_trigger() {
        let rule = CompoundRule {
            terms: vec!["대출".to_string(), "거부".to_string()],
            triggers: vec!["거절".to_string()],
            bonus: 5,
        };
        let scorer = RelevanceScorer::new(ScoreWeights::default(), BTreeMap::new(), vec![rule], 5);
        let articles = vec![article("대출 거부 사례 급증", "", "2025-05-06", Category::Economy)];

        // a term alone does not activate a rule that has triggers
        assert_eq!(scorer.rank("거부", &articles)[0].score, 3);
        // the trigger activates it even though it appears nowhere in the article
        assert_eq!(scorer.rank("거절", &articles)[0].score, 5);
    }

    #[test]
    fn test_ties_keep_ingestion_order() {
        let articles = vec![
            article("금리 동결", "금리 결정", "2025-05-01", Category::General),
            article("기준금리 발표", "금리 전망", "2025-05-02", Category::General),
            article("금리 관련", "금리 소식", "2025-05-03", Category::General),
        ];
        let ranked = scorer().rank("금리", &articles);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|s| s.score == 5));
        let titles: Vec<&str> = ranked.iter().map(|s| s.article.title.as_str()).collect();
        assert_eq!(titles, vec!["금리 동결", "기준금리 발표", "금리 관련"]);
    }

    #[test]
    fn test_truncates_to_top_k() {
        let articles: Vec<Article> = (0..8)
            .map(|i| article(&format!("AI 소식 {i}"), "", "2025-05-06", Category::General))
            .collect();
        let ranked = scorer().rank("ai", &articles);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].article.title, "AI 소식 0");
    }

    #[test]
    fn test_duplicate_tokens_count_once() {
        let articles = vec![article("반도체", "", "2025-05-06", Category::General)];
        assert_eq!(scorer().rank("반도체 반도체", &articles)[0].score, 3);
    }

    #[test]
    fn test_weight_order() {
        assert!(ScoreWeights::default().is_ordered());
        let flipped = ScoreWeights {
            title: 1,
            content: 5,
            ..ScoreWeights::default()
        };
        assert!(!flipped.is_ordered());
        let flat = ScoreWeights {
            content: 1,
            ..ScoreWeights::default()
        };
        assert!(!flat.is_ordered());
    }
}
