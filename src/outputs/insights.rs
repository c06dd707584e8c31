//! Aggregate statistics over the working set.
//!
//! Everything here is computed on demand from the session; nothing is cached.

use crate::models::{Article, Category, Sentiment};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Tokens never counted as keywords.
pub const STOPWORDS: &[&str] = &[
    "의", "가", "이", "은", "들", "는", "좀", "잘", "과", "를", "으로", "자", "에", "한", "하다",
];

/// Number of keywords kept in the frequency list.
pub const TOP_KEYWORDS: usize = 20;

const MIN_TAG_REM: f64 = 0.8;
const TAG_SPAN_REM: f64 = 1.7;
const MAX_TAG_REM: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Count<T> {
    pub key: T,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordWeight {
    pub word: String,
    pub freq: usize,
    /// Display size in rem, scaled against the most frequent keyword.
    pub size_rem: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub keyword: Option<String>,
    pub total: usize,
    pub latest: Option<NaiveDate>,
    pub dominant_category: Option<Category>,
    /// Categories present in the working set, in enumeration order.
    pub categories: Vec<Count<Category>>,
    pub sentiments: Vec<Count<Sentiment>>,
    /// Articles per calendar date, oldest first.
    pub dates: Vec<Count<NaiveDate>>,
    pub keywords: Vec<KeywordWeight>,
}

impl Insights {
    pub fn compute(keyword: Option<&str>, articles: &[Article]) -> Self {
        let categories: Vec<Count<Category>> = Category::ALL
            .iter()
            .map(|c| Count {
                key: *c,
                count: articles.iter().filter(|a| a.category == *c).count(),
            })
            .filter(|c| c.count > 0)
            .collect();

        // first maximum in enumeration order
        let dominant_category = categories
            .iter()
            .fold(None::<&Count<Category>>, |best, c| match best {
                Some(b) if b.count >= c.count => Some(b),
                _ => Some(c),
            })
            .map(|c| c.key);

        let sentiments = Sentiment::ALL
            .iter()
            .map(|s| Count {
                key: *s,
                count: articles.iter().filter(|a| a.sentiment == *s).count(),
            })
            .collect();

        let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for a in articles {
            *by_date.entry(a.published_on).or_default() += 1;
        }
        let dates = by_date
            .into_iter()
            .map(|(key, count)| Count { key, count })
            .collect();

        Self {
            keyword: keyword.map(str::to_string),
            total: articles.len(),
            latest: articles.iter().map(|a| a.published_on).max(),
            dominant_category,
            categories,
            sentiments,
            dates,
            keywords: keyword_frequencies(articles),
        }
    }
}

/// Top keywords across all titles and contents.
///
/// Tokens are split on whitespace; single-character tokens and
/// [`STOPWORDS`] are dropped. Ties keep first-appearance order.
pub fn keyword_frequencies(articles: &[Article]) -> Vec<KeywordWeight> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let tokens = articles
        .iter()
        .flat_map(|a| a.title.split_whitespace().chain(a.content.split_whitespace()))
        .filter(|w| w.chars().count() > 1 && !STOPWORDS.contains(w));
    for word in tokens {
        match index.get(word) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(word, order.len());
                order.push((word, 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(TOP_KEYWORDS);

    let top = order.first().map(|(_, f)| *f).unwrap_or(1) as f64;
    order
        .into_iter()
        .map(|(word, freq)| KeywordWeight {
            word: word.to_string(),
            freq,
            size_rem: (MIN_TAG_REM + freq as f64 / top * TAG_SPAN_REM).min(MAX_TAG_REM),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::article;

    fn working_set() -> Vec<Article> {
        let mut set = vec![
            article("금리 인상 우려", "한국은행 금리 결정", "2025-05-02", Category::Economy),
            article("금리 동결", "시장 안도", "2025-05-01", Category::Economy),
            article("총선 결과", "국회 의석", "2025-05-02", Category::Politics),
        ];
        set[1].sentiment = Sentiment::Positive;
        set
    }

    #[test]
    fn test_histograms() {
        let insights = Insights::compute(Some("금리"), &working_set());
        assert_eq!(insights.total, 3);
        assert_eq!(insights.latest, NaiveDate::from_ymd_opt(2025, 5, 2));
        assert_eq!(insights.dominant_category, Some(Category::Economy));
        assert_eq!(
            insights.categories,
            vec![
                Count { key: Category::Economy, count: 2 },
                Count { key: Category::Politics, count: 1 },
            ]
        );
        let sentiment_counts: Vec<usize> = insights.sentiments.iter().map(|s| s.count).collect();
        assert_eq!(sentiment_counts, vec![1, 0, 2]);
        let dates: Vec<(String, usize)> = insights
            .dates
            .iter()
            .map(|d| (d.key.to_string(), d.count))
            .collect();
        assert_eq!(
            dates,
            vec![("2025-05-01".to_string(), 1), ("2025-05-02".to_string(), 2)]
        );
    }

    #[test]
    fn test_dominant_category_tie_goes_to_enumeration_order() {
        let set = vec![
            article("총선", "", "2025-05-01", Category::Politics),
            article("증시", "", "2025-05-01", Category::Economy),
        ];
        let insights = Insights::compute(None, &set);
        assert_eq!(insights.dominant_category, Some(Category::Economy));
    }

    #[test]
    fn test_keyword_frequencies_and_tag_sizes() {
        let keywords = keyword_frequencies(&working_set());
        assert_eq!(keywords[0].word, "금리");
        assert_eq!(keywords[0].freq, 3);
        assert!((keywords[0].size_rem - 2.5).abs() < 1e-9);
        // ties keep first appearance: "인상" precedes "우려"
        assert_eq!(keywords[1].word, "인상");
        assert_eq!(keywords[2].word, "우려");
        assert!((keywords[1].size_rem - (0.8 + 1.0 / 3.0 * 1.7)).abs() < 1e-9);
    }

    #[test]
    fn test_short_tokens_and_stopwords_are_dropped() {
        let set = vec![article("a 의 으로 하다 반도체", "", "2025-05-01", Category::TechScience)];
        let words: Vec<String> = keyword_frequencies(&set).into_iter().map(|k| k.word).collect();
        assert_eq!(words, vec!["반도체".to_string()]);
    }

    #[test]
    fn test_empty_working_set() {
        let insights = Insights::compute(None, &[]);
        assert_eq!(insights.total, 0);
        assert_eq!(insights.latest, None);
        assert_eq!(insights.dominant_category, None);
        assert!(insights.keywords.is_empty());
    }
}
