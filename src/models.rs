//! Data models for news articles, labels, and conversation turns.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawArticle`]: Article data as returned by a news source, before labeling
//! - [`Article`]: A labeled article held in the session's working set
//! - [`Category`] and [`Sentiment`]: The closed label sets assigned at ingestion
//! - [`Turn`] and [`Role`]: One entry of the conversation transcript
//! - [`SortMode`]: Result ordering requested from a news source

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A news item as produced by a source, before classification.
///
/// Sources never assign labels; the engine turns a `RawArticle` into an
/// [`Article`] during ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArticle {
    /// Headline with markup already stripped.
    pub title: String,
    /// Short summary or snippet, markup stripped.
    pub content: String,
    /// Calendar date of publication.
    pub published_on: NaiveDate,
    /// Time of day of publication, when the source reports one.
    pub published_at: Option<NaiveTime>,
    /// Link to the article as served by the source.
    pub url: String,
    /// Link to the publisher's original article (equals `url` when unknown).
    pub source_url: String,
}

/// A labeled news article in the working set.
///
/// `category` and `sentiment` are assigned exactly once, at ingestion time,
/// from the title and content. Two fetches of the same story produce two
/// independent entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub published_on: NaiveDate,
    pub published_at: Option<NaiveTime>,
    pub category: Category,
    pub sentiment: Sentiment,
    pub url: String,
    pub source_url: String,
}

impl Article {
    /// Publication date and, when known, time formatted as `YYYY-MM-DD HH:MM`.
    pub fn stamp(&self) -> String {
        match self.published_at {
            Some(t) => format!("{} {}", self.published_on, t.format("%H:%M")),
            None => self.published_on.to_string(),
        }
    }

    /// Extract the domain name (before .com/.co.kr/etc) from the original link.
    ///
    /// For example: `"https://www.hankyung.com/article/1"` -> `"hankyung"`.
    pub fn source_tag(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.source_url).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host
            .split('.')
            .filter(|p| !matches!(*p, "www" | "co" | "or" | "ne" | "kr" | "com" | "net" | "org"))
            .collect();
        parts.last().map(|p| p.to_string())
    }
}

/// Topical category of an article.
///
/// The declaration order is the evaluation order used by the categorizer:
/// on a tie, the category declared first wins. [`Category::General`] is the
/// default and owns no keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Economy,
    Politics,
    TechScience,
    Culture,
    Society,
    International,
    General,
}

impl Category {
    /// All categories, including the default, in evaluation order.
    pub const ALL: [Category; 7] = [
        Category::Economy,
        Category::Politics,
        Category::TechScience,
        Category::Culture,
        Category::Society,
        Category::International,
        Category::General,
    ];

    /// Display label; also the text the relevance scorer matches query tokens against.
    pub fn label(self) -> &'static str {
        match self {
            Category::Economy => "경제",
            Category::Politics => "정치",
            Category::TechScience => "IT/과학",
            Category::Culture => "문화",
            Category::Society => "사회",
            Category::International => "국제",
            Category::General => "일반",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::Economy => "💹",
            Category::Politics => "🏛️",
            Category::TechScience => "💻",
            Category::Culture => "🎭",
            Category::Society => "👥",
            Category::International => "🌍",
            Category::General => "📰",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

/// Coarse polarity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "긍정",
            Sentiment::Negative => "부정",
            Sentiment::Neutral => "중립",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat-completion APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One (role, text) entry of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Ordering requested from a news source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Newest first.
    #[default]
    Date,
    /// Most relevant first.
    Sim,
}

impl SortMode {
    /// Query-string value understood by the search API.
    pub fn as_param(self) -> &'static str {
        match self {
            SortMode::Date => "date",
            SortMode::Sim => "sim",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Date => "최신순",
            SortMode::Sim => "정확도순",
        }
    }
}
