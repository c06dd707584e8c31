//! Naver News Search API client.
//!
//! Calls `GET /v1/search/news.json` with the client id and secret headers.
//! Titles and descriptions come back with `<b>` highlight tags and HTML
//! entities, which are stripped before the article leaves this module.
//!
//! # Limits
//!
//! The API accepts `display` in `1..=100` and `start` in `1..=1000`; values
//! outside those ranges are clamped.

use crate::errors::FetchError;
use crate::models::RawArticle;
use crate::sources::{NewsSource, SearchRequest};
use crate::utils::strip_markup;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{info, instrument, warn};

pub const DEFAULT_ENDPOINT: &str = "https://openapi.naver.com/v1/search/news.json";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    #[serde(default)]
    description: String,
    link: String,
    #[serde(default)]
    originallink: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: String,
}

/// Client for the Naver News Search API.
pub struct NaverNewsApi {
    http: reqwest::Client,
    endpoint: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl NaverNewsApi {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            client_id: non_blank(client_id),
            client_secret: non_blank(client_secret),
        }
    }

    /// Whether both credentials are present.
    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewsSource for NaverNewsApi {
    fn name(&self) -> &'static str {
        "naver"
    }

    #[instrument(level = "info", skip_all, fields(query = %request.query, display = request.display, sort = request.sort.as_param()))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>, FetchError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(FetchError::MissingCredential("NAVER_CLIENT_ID"))?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or(FetchError::MissingCredential("NAVER_CLIENT_SECRET"))?;

        let display = request.display.clamp(1, 100).to_string();
        let start = request.start.clamp(1, 1000).to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .header("X-Naver-Client-Id", client_id)
            .header("X-Naver-Client-Secret", client_secret)
            .query(&[
                ("query", request.query.as_str()),
                ("display", display.as_str()),
                ("start", start.as_str()),
                ("sort", request.sort.as_param()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let articles = parse_response(&body)?;
        info!(count = articles.len(), "Fetched Naver news");
        Ok(articles)
    }
}

/// Parse a search response body into raw articles.
///
/// Items whose `pubDate` cannot be parsed are skipped with a warning.
pub fn parse_response(body: &str) -> Result<Vec<RawArticle>, FetchError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut articles = Vec::with_capacity(parsed.items.len());
    for item in parsed.items {
        let published = match DateTime::parse_from_rfc2822(&item.pub_date) {
            Ok(ts) => ts.naive_local(),
            Err(e) => {
                warn!(pub_date = %item.pub_date, error = %e, "Skipping item with unparseable pubDate");
                continue;
            }
        };
        let source_url = item
            .originallink
            .filter(|l| !l.trim().is_empty())
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
    use crate::models::SortMode;
    use chrono::{NaiveDate, NaiveTime};

    const SAMPLE: &str = r#"{
        "lastBuildDate": "Tue, 06 May 2025 15:00:00 +0900",
        "total": 2,
        "start": 1,
        "display": 2,
        "items": [
            {
                "title": "<b>전세대출</b> 규제 강화 &quot;서민 부담&quot;",
                "originallink": "https://www.hankyung.com/article/1",
                "link": "https://n.news.naver.com/mnews/article/015/1",
                "description": "은행권 <b>전세대출</b> 심사가 깐깐해진다",
                "pubDate": "Tue, 06 May 2025 14:30:00 +0900"
            },
            {
                "title": "금리 동결",
                "originallink": "",
                "link": "https://n.news.naver.com/mnews/article/009/2",
                "description": "한국은행 기준금리 동결",
                "pubDate": "Mon, 05 May 2025 09:05:00 +0900"
            }
        ]
    }"#;

    #[test]
    fn test_parse_response_strips_markup_and_parses_dates() {
        let articles = parse_response(SAMPLE).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "전세대출 규제 강화 \"서민 부담\"");
        assert_eq!(articles[0].content, "은행권 전세대출 심사가 깐깐해진다");
        assert_eq!(
            articles[0].published_on,
            NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
        );
        assert_eq!(articles[0].published_at, NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(articles[0].source_url, "https://www.hankyung.com/article/1");
    }

    #[test]
    fn test_blank_originallink_falls_back_to_link() {
        let articles = parse_response(SAMPLE).unwrap();
        assert_eq!(articles[1].source_url, articles[1].url);
    }

    #[test]
    fn test_bad_date_is_skipped() {
        let body = r#"{"items":[{"title":"t","description":"d","link":"l","pubDate":"yesterday"}]}"#;
        assert!(parse_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(parse_response("<html>"), Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        let api = NaverNewsApi::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/unused",
            Some("id".to_string()),
            Some("  ".to_string()),
        );
        assert!(!api.has_credentials());
        let request = SearchRequest::new("금리", 20, SortMode::Date);
        let err = api.search(&request).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingCredential("NAVER_CLIENT_SECRET")));
    }
}
