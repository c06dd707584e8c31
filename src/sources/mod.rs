//! News sources that turn a keyword into raw articles.
//!
//! Each source implements [`NewsSource`] and returns [`RawArticle`]s with
//! markup already stripped. Labels are assigned later by the engine.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Naver News Search | [`naver`] | JSON search API | Requires client id + secret |
//! | Google News | [`rss`] | RSS search feed | No credentials; sort/paging applied locally |
//! | Naver News portal | [`portal`] | HTML scraping | Keeps price-related items only |
//!
//! Fetches are sequential. [`cache::CachedSource`] memoizes identical
//! requests for a short time.

pub mod cache;
pub mod naver;
pub mod portal;
pub mod rss;

use crate::errors::FetchError;
use crate::models::{RawArticle, SortMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One search against a news source.
///
/// `start` is 1-based, as in the search API. Used as the cache key, so two
/// requests are "identical" only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    pub query: String,
    pub display: u32,
    pub start: u32,
    pub sort: SortMode,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, display: u32, sort: SortMode) -> Self {
        Self {
            query: query.into(),
            display,
            start: 1,
            sort,
        }
    }
}

/// A provider of raw news articles.
pub trait NewsSource {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fetch up to `request.display` articles for `request.query`.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>, FetchError>;
}

/// Which source to search with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Naver,
    Rss,
    Portal,
}

/// Runtime-selected source.
pub enum AnySource {
    Naver(naver::NaverNewsApi),
    Rss(rss::GoogleNewsRss),
    Portal(portal::PortalScraper),
}

impl NewsSource for AnySource {
    fn name(&self) -> &'static str {
        match self {
            AnySource::Naver(s) => s.name(),
            AnySource::Rss(s) => s.name(),
            AnySource::Portal(s) => s.name(),
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>, FetchError> {
        match self {
            AnySource::Naver(s) => s.search(request).await,
            AnySource::Rss(s) => s.search(request).await,
            AnySource::Portal(s) => s.search(request).await,
        }
    }
}

/// Shared HTTP client for every source.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        "Mozilla/5.0 (compatible; awful_news_hub/",
        env!("CARGO_PKG_VERSION"),
        ")"
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Sort newest first (date mode) or keep feed order (sim mode), then apply
/// the 1-based `start` offset and `display` page size.
pub(crate) fn page_locally(mut items: Vec<RawArticle>, request: &SearchRequest) -> Vec<RawArticle> {
    if request.sort == SortMode::Date {
        items.sort_by(|a, b| {
            (b.published_on, b.published_at).cmp(&(a.published_on, a.published_at))
        });
    }
    items
        .into_iter()
        .skip(request.start.saturating_sub(1) as usize)
        .take(request.display as usize)
        .collect()
}
