//! Google News RSS search feed client.
//!
//! Needs no credentials, which makes it the fallback when the search API
//! keys are not configured. The feed ignores sort and paging parameters, so
//! both are applied locally after parsing.

use crate::errors::FetchError;
use crate::models::RawArticle;
use crate::sources::{NewsSource, SearchRequest, page_locally};
use crate::utils::strip_markup;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://news.google.com/rss/search";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: String,
    link: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "@url", default)]
    url: Option<String>,
}

/// Feed timestamps are GMT; articles are dated in Korea Standard Time.
const KST_OFFSET_HOURS: i64 = 9;

pub struct GoogleNewsRss {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleNewsRss {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn feed_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&hl=ko&gl=KR&ceid=KR:ko",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

fn to_kst(ts: DateTime<FixedOffset>) -> NaiveDateTime {
    ts.naive_utc() + Duration::hours(KST_OFFSET_HOURS)
}

impl NewsSource for GoogleNewsRss {
    fn name(&self) -> &'static str {
        "rss"
    }

    #[instrument(level = "info", skip_all, fields(query = %request.query, display = request.display))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>, FetchError> {
        let response = self.http.get(self.feed_url(&request.query)).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }
        let xml = response.text().await?;
        let items = parse_feed(&xml)?;
        let total = items.len();
        let articles = page_locally(items, request);
        info!(total, kept = articles.len(), "Fetched Google News RSS");
        Ok(articles)
    }
}

/// Parse an RSS 2.0 document into raw articles in feed order.
///
/// Items without a parseable `pubDate` are skipped with a warning.
pub fn parse_feed(xml: &str) -> Result<Vec<RawArticle>, FetchError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut articles = Vec::with_capacity(rss.channel.items.len());
    for item in rss.channel.items {
        let Some(published) = item
            .pub_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
            .map(to_kst)
        else {
            warn!(title = %item.title, "Skipping RSS item without a valid pubDate");
            continue;
        };
        let source_url = item
            .source
            .and_then(|s| s.url)
            .unwrap_or_else(|| item.link.clone());
        articles.push(RawArticle {
            title: strip_markup(&item.title),
            content: strip_markup(&item.description),
            published_on: published.date(),
            published_at: Some(published.time()),
            url: item.link,
            source_url,
        });
    }
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>"금리" - Google 뉴스</title>
    <link>https://news.google.com/</link>
    <item>
      <title>한은, 기준금리 동결 - 연합뉴스</title>
      <link>https://news.google.com/rss/articles/abc</link>
      <pubDate>Mon, 05 May 2025 23:10:00 GMT</pubDate>
      <description>&lt;a href="https://www.yna.co.kr/1"&gt;한은, 기준금리 동결&lt;/a&gt;</description>
      <source url="https://www.yna.co.kr">연합뉴스</source>
    </item>
    <item>
      <title>날짜 없는 기사</title>
      <link>https://news.google.com/rss/articles/def</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let articles = parse_feed(FEED).unwrap();
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "한은, 기준금리 동결 - 연합뉴스");
        assert_eq!(a.content, "한은, 기준금리 동결");
        // 23:10 GMT is 08:10 the next day in Seoul
        assert_eq!(a.published_on, NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
        assert_eq!(a.published_at, NaiveTime::from_hms_opt(8, 10, 0));
        assert_eq!(a.source_url, "https://www.yna.co.kr");
    }

    #[test]
    fn test_malformed_feed_is_parse_error() {
        assert!(matches!(
            parse_feed("<rss><channel>"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_feed_url_encodes_query() {
        let rss = GoogleNewsRss::new(reqwest::Client::new(), DEFAULT_BASE_URL);
        assert_eq!(
            rss.feed_url("AI 반도체"),
            "https://news.google.com/rss/search?q=AI%20%EB%B0%98%EB%8F%84%EC%B2%B4&hl=ko&gl=KR&ceid=KR:ko"
        );
    }
}
