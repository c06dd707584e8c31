//! Keyword tables used by the classification and ranking engine.
//!
//! A [`Lexicon`] bundles every table the engine reads:
//!
//! | Table | Used by | Purpose |
//! |-------|---------|---------|
//! | `categories` | categorizer | keyword list per [`Category`] |
//! | `positive` / `negative` | sentiment tagger | polarity indicator terms |
//! | `expansions` | relevance scorer | colloquial query term -> literal article terms |
//! | `compounds` | relevance scorer | term pairs that mark a topically precise article |
//!
//! The defaults target Korean economic and general news. Every table can be
//! replaced from the YAML configuration file; see [`crate::config`].

use crate::models::Category;
use itertools::Itertools;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bonus for a compound rule when the configuration does not set one.
pub const DEFAULT_COMPOUND_BONUS: u32 = 5;

/// A set of terms that, found together in one article, earn a fixed bonus.
///
/// The rule only fires for queries that mention one of its `triggers`
/// (or, when `triggers` is empty, one of its `terms`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRule {
    pub terms: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default = "default_compound_bonus")]
    pub bonus: u32,
}

fn default_compound_bonus() -> u32 {
    DEFAULT_COMPOUND_BONUS
}

impl CompoundRule {
    /// Terms whose presence in the query activates this rule.
    pub fn activators(&self) -> &[String] {
        if self.triggers.is_empty() {
            &self.terms
        } else {
            &self.triggers
        }
    }
}

/// Injectable keyword tables for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub categories: BTreeMap<Category, Vec<String>>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub expansions: BTreeMap<String, Vec<String>>,
    pub compounds: Vec<CompoundRule>,
}

impl Default for Lexicon {
    fn default() -> Self {
        DEFAULT_LEXICON.clone()
    }
}

impl Lexicon {
    /// Case-fold and de-duplicate every term so lookups compare folded text only.
    ///
    /// Empty terms are dropped: an empty needle would match every text.
    pub fn folded(&self) -> Lexicon {
        Lexicon {
            categories: self
                .categories
                .iter()
                .filter(|(category, _)| **category != Category::General)
                .map(|(category, terms)| (*category, fold_terms(terms)))
                .collect(),
            positive: fold_terms(&self.positive),
            negative: fold_terms(&self.negative),
            expansions: self
                .expansions
                .iter()
                .filter(|(key, _)| !key.trim().is_empty())
                .map(|(key, terms)| (fold(key), fold_terms(terms)))
                .collect(),
            compounds: self
                .compounds
                .iter()
                .map(|rule| CompoundRule {
                    terms: fold_terms(&rule.terms),
                    triggers: fold_terms(&rule.triggers),
                    bonus: rule.bonus,
                })
                .filter(|rule| !rule.terms.is_empty())
                .collect(),
        }
    }
}

/// Case-fold text for substring matching.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn fold_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| fold(t.trim()))
        .filter(|t| !t.is_empty())
        .unique()
        .collect()
}

/// Number of distinct `terms` that occur as a substring of `folded_text`.
///
/// Each term counts once no matter how often it repeats.
pub fn distinct_hits(folded_text: &str, terms: &[String]) -> usize {
    terms.iter().filter(|t| folded_text.contains(t.as_str())).count()
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

static DEFAULT_LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let mut categories = BTreeMap::new();
    categories.insert(
        Category::Economy,
        words(&[
            "경제", "금리", "환율", "주식", "부동산", "물가", "실업", "투자", "증시", "코스피",
            "수출", "금융", "은행", "대출", "전세", "아파트", "기업", "무역",
        ]),
    );
    categories.insert(
        Category::Politics,
        words(&[
            "정치", "국회", "대통령", "선거", "정당", "외교", "정책", "여당", "야당", "의원",
            "장관", "총리", "탄핵", "개헌",
        ]),
    );
    categories.insert(
        Category::TechScience,
        words(&[
            "AI", "인공지능", "반도체", "전기차", "바이오", "우주", "IT", "기술", "로봇",
            "배터리", "소프트웨어", "플랫폼", "데이터", "클라우드", "스마트폰",
        ]),
    );
    categories.insert(
        Category::Culture,
        words(&[
            "문화", "K팝", "드라마", "영화", "스포츠", "게임", "관광", "공연", "전시", "음악",
            "축제", "아이돌", "웹툰", "예능",
        ]),
    );
    categories.insert(
        Category::Society,
        words(&[
            "사회", "교육", "의료", "복지", "범죄", "환경", "노동", "사건", "사고", "경찰",
            "법원", "학교", "저출산", "재난",
        ]),
    );
    categories.insert(
        Category::International,
        words(&[
            "국제", "미국", "중국", "일본", "러시아", "유럽", "UN", "우크라이나", "북한", "중동",
            "이스라엘", "정상회담", "나토",
        ]),
    );

    let positive = words(&[
        "상승", "급등", "개선", "호조", "성장", "증가", "회복", "흑자", "호재", "최고", "돌파",
        "강세", "기대", "반등", "활성화",
    ]);
    let negative = words(&[
        "하락", "급락", "악화", "부진", "감소", "침체", "적자", "악재", "위기", "우려", "약세",
        "손실", "폭락", "둔화", "불안",
    ]);

    let mut expansions = BTreeMap::new();
    expansions.insert("거절".to_string(), words(&["거부", "반려", "불허", "부결", "퇴짜"]));
    expansions.insert("안돼".to_string(), words(&["불가", "거부", "제한", "금지"]));
    expansions.insert(
        "전세대출".to_string(),
        words(&["전세자금대출", "전세 대출", "전세자금 대출", "버팀목"]),
    );
    expansions.insert(
        "주담대".to_string(),
        words(&["주택담보대출", "주택 담보 대출", "주택담보 대출"]),
    );
    expansions.insert(
        "집값".to_string(),
        words(&["아파트 가격", "주택 가격", "매매가", "시세", "호가"]),
    );
    expansions.insert("코인".to_string(), words(&["가상자산", "암호화폐", "비트코인"]));
    expansions.insert("월급".to_string(), words(&["임금", "급여", "연봉"]));

    let compounds = vec![
        CompoundRule {
            terms: words(&["전세", "대출"]),
            triggers: Vec::new(),
            bonus: DEFAULT_COMPOUND_BONUS,
        },
        CompoundRule {
            terms: words(&["대출", "거부"]),
            triggers: words(&["거절", "거부", "안돼", "반려"]),
            bonus: DEFAULT_COMPOUND_BONUS,
        },
        CompoundRule {
            terms: words(&["금리", "인하"]),
            triggers: words(&["금리"]),
            bonus: DEFAULT_COMPOUND_BONUS,
        },
    ];

    Lexicon {
        categories,
        positive,
        negative,
        expansions,
        compounds,
    }
});
