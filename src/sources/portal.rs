//! Naver News portal search page scraper.
//!
//! Walks the HTML search result pages one after another and extracts
//! title, link, date and snippet with fixed selectors. Result pages hold ten
//! items each; at most [`MAX_PAGES`] pages are read per search.
//!
//! # Price filter
//!
//! The scraper is used for housing and price questions, so by default it
//! keeps only items whose title + snippet mention a price keyword or a
//! Korean currency amount such as `3억` or `1,200만 원`.
//!
//! # Dates
//!
//! The portal prints either an absolute date (`2025.05.06.`) or a relative
//! one (`5분 전`, `3시간 전`, `2일 전`, `1주 전`). Relative dates are resolved
//! against the local clock at scrape time.

use crate::errors::FetchError;
use crate::models::{RawArticle, SortMode};
use crate::sources::{NewsSource, SearchRequest};
use crate::utils::strip_markup;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://search.naver.com/search.naver";

/// Items per result page.
const PAGE_SIZE: u32 = 10;
/// Upper bound on pages read for one search.
pub const MAX_PAGES: u32 = 5;

const ITEM_SELECTOR: &str = "div.news_area";
const TITLE_SELECTOR: &str = "a.news_tit";
const SNIPPET_SELECTOR: &str = "div.news_dsc";
const INFO_SELECTOR: &str = "span.info";

/// Terms that mark an item as price related.
pub const PRICE_KEYWORDS: &[&str] = &[
    "가격", "시세", "집값", "매매가", "전셋값", "전세가", "분양가", "호가", "실거래가", "상승",
    "하락", "급등", "급락", "폭등", "폭락",
];

static CURRENCY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,.]*\s*(만|억)").expect("currency regex"));
static ABSOLUTE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\.(\d{1,2})\.(\d{1,2})\.?$").expect("date regex"));
static RELATIVE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*(분|시간|일|주)\s*전$").expect("relative date regex"));

/// Scraper for the portal's news search pages.
pub struct PortalScraper {
    http: reqwest::Client,
    base_url: String,
    price_filter: bool,
}

impl PortalScraper {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, price_filter: bool) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            price_filter,
        }
    }

    fn page_url(&self, query: &str, sort: SortMode, page: u32) -> String {
        // the portal uses 0 for relevance and 1 for newest first
        let sort = match sort {
            SortMode::Sim => 0,
            SortMode::Date => 1,
        };
        format!(
            "{}?where=news&query={}&sort={}&start={}",
            self.base_url,
            urlencoding::encode(query),
            sort,
            (page - 1) * PAGE_SIZE + 1
        )
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

impl NewsSource for PortalScraper {
    fn name(&self) -> &'static str {
        "portal"
    }

    #[instrument(level = "info", skip_all, fields(query = %request.query, display = request.display))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>, FetchError> {
        let first_page = request.start.saturating_sub(1) / PAGE_SIZE + 1;
        let pages = request.display.div_ceil(PAGE_SIZE).clamp(1, MAX_PAGES);
        let base = Url::parse(&self.base_url).map_err(|e| FetchError::Parse(e.to_string()))?;
        let now = Local::now().naive_local();

        // One page at a time: `then` awaits each fetch before starting the next.
        let pages: Vec<Result<String, FetchError>> = stream::iter(first_page..first_page + pages)
            .then(|page| {
                let url = self.page_url(&request.query, request.sort, page);
                async move { self.fetch_page(&url).await }
            })
            .collect()
            .await;

        let mut articles = Vec::new();
        for (i, page) in pages.into_iter().enumerate() {
            match page {
                Ok(html) => articles.extend(parse_results_page(&html, &base, now)),
                // a later page failing keeps what earlier pages produced
                Err(e) if i > 0 => {
                    warn!(error = %e, page = first_page + i as u32, "Portal page fetch failed");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        let scraped = articles.len();

        if self.price_filter {
            articles.retain(|a| is_price_related(&format!("{} {}", a.title, a.content)));
        }
        articles.truncate(request.display as usize);

        info!(scraped, kept = articles.len(), "Scraped portal news");
        Ok(articles)
    }
}

/// Extract every result item from one search result page.
///
/// Items missing a title or link are skipped. An item without a readable
/// date is stamped with `now`'s date.
pub fn parse_results_page(html: &str, base: &Url, now: NaiveDateTime) -> Vec<RawArticle> {
    let document = Html::parse_document(html);
    let (Ok(item_sel), Ok(title_sel), Ok(snippet_sel), Ok(info_sel)) = (
        Selector::parse(ITEM_SELECTOR),
        Selector::parse(TITLE_SELECTOR),
        Selector::parse(SNIPPET_SELECTOR),
        Selector::parse(INFO_SELECTOR),
    ) else {
        return Vec::new();
    };

    let mut articles = Vec::new();
    for item in document.select(&item_sel) {
        let Some(title_el) = item.select(&title_sel).next() else {
            continue;
        };
        let Some(href) = title_el.value().attr("href") else {
            continue;
        };
        let Ok(link) = base.join(href) else {
            debug!(%href, "Unresolvable result link");
            continue;
        };

        let title = element_text(&title_el);
        if title.is_empty() {
            continue;
        }
        let content = item
            .select(&snippet_sel)
            .next()
            .map(|e| element_text(&e))
            .unwrap_or_default();
        let (published_on, published_at) = item
            .select(&info_sel)
            .find_map(|e| parse_portal_date(&element_text(&e), now))
            .unwrap_or((now.date(), None));

        articles.push(RawArticle {
            title,
            content,
            published_on,
            published_at,
            url: link.to_string(),
            source_url: link.to_string(),
        });
    }
    articles
}

fn element_text(element: &ElementRef<'_>) -> String {
    let text = element.text().collect::<Vec<_>>().join(" ");
    strip_markup(&text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Parse an absolute or relative portal date.
///
/// Minute and hour offsets also yield a time of day; day and week offsets
/// and absolute dates yield a date only.
pub fn parse_portal_date(text: &str, now: NaiveDateTime) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let text = text.trim();
    if text == "방금 전" {
        return Some((now.date(), Some(now.time())));
    }
    if let Some(caps) = ABSOLUTE_DATE.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).map(|d| (d, None));
    }
    let caps = RELATIVE_DATE.captures(text)?;
    let amount: i64 = caps[1].parse().ok()?;
    // out-of-range offsets yield None so the caller falls back to today
    let (offset, with_time) = match &caps[2] {
        "분" => (Duration::try_minutes(amount)?, true),
        "시간" => (Duration::try_hours(amount)?, true),
        "일" => (Duration::try_days(amount)?, false),
        "주" => (Duration::try_weeks(amount)?, false),
        _ => return None,
    };
    let at = now.checked_sub_signed(offset)?;
    Some((at.date(), with_time.then(|| at.time())))
}

/// Whether text mentions a price keyword or a currency amount.
pub fn is_price_related(text: &str) -> bool {
    PRICE_KEYWORDS.iter().any(|k| text.contains(k)) || CURRENCY_PATTERN.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap()
    }

    const PAGE: &str = r#"
        <html><body><ul class="list_news">
          <li><div class="news_area">
            <div class="info_group">
              <a class="info press">한국경제</a>
              <span class="info">A12면</span>
              <span class="info">3시간 전</span>
            </div>
            <a class="news_tit" href="https://www.hankyung.com/article/1" title="강남 아파트값">강남 <mark>아파트</mark>값 5억 뛰었다</a>
            <div class="news_dsc"><div class="dsc_wrap">매매가가 연일 최고치</div></div>
          </div></li>
          <li><div class="news_area">
            <span class="info">2025.04.30.</span>
            <a class="news_tit" href="/relative/2">신도시 교통 대책 발표</a>
            <div class="news_dsc">광역버스 노선 신설</div>
          </div></li>
          <li><div class="news_area">
            <span class="info">1일 전</span>
            <div class="news_dsc">제목 없는 항목</div>
          </div></li>
        </ul></body></html>
    "#;

    #[test]
    fn test_parse_results_page() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        let articles = parse_results_page(PAGE, &base, now());
        assert_eq!(articles.len(), 2);

        assert_eq!(articles[0].title, "강남 아파트 값 5억 뛰었다");
        assert_eq!(articles[0].content, "매매가가 연일 최고치");
        // 3 hours before 01:30 on May 6th
        assert_eq!(articles[0].published_on, NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
        assert_eq!(articles[0].published_at, NaiveTime::from_hms_opt(22, 30, 0));

        assert_eq!(articles[1].url, "https://search.naver.com/relative/2");
        assert_eq!(articles[1].published_on, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
        assert_eq!(articles[1].published_at, None);
    }

    #[test]
    fn test_parse_portal_date_variants() {
        let n = now();
        assert_eq!(
            parse_portal_date("2025.01.09.", n),
            Some((NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(), None))
        );
        assert_eq!(
            parse_portal_date("2일 전", n),
            Some((NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(), None))
        );
        assert_eq!(
            parse_portal_date("1주 전", n),
            Some((NaiveDate::from_ymd_opt(2025, 4, 29).unwrap(), None))
        );
        assert_eq!(
            parse_portal_date("10분 전", n),
            Some((n.date(), NaiveTime::from_hms_opt(1, 20, 0)))
        );
        assert_eq!(parse_portal_date("방금 전", n), Some((n.date(), Some(n.time()))));
        assert_eq!(parse_portal_date("A12면", n), None);
        assert_eq!(parse_portal_date("2025.13.40.", n), None);
    }

    #[test]
    fn test_huge_relative_offsets_do_not_panic() {
        let n = now();
        assert_eq!(parse_portal_date("99999999일 전", n), None);
        assert_eq!(parse_portal_date("9999999999999999분 전", n), None);
        assert_eq!(parse_portal_date("99999999999999999999주 전", n), None);

        let page = r#"<div class="news_area">
            <span class="info">99999999일 전</span>
            <a class="news_tit" href="/a/1">아파트 시세 급등</a>
        </div>"#;
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        let articles = parse_results_page(page, &base, n);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].published_on, n.date());
        assert_eq!(articles[0].published_at, None);
    }

    #[test]
    fn test_price_filter() {
        assert!(is_price_related("서울 아파트 매매가 상승"));
        assert!(is_price_related("전용 84㎡ 12억에 거래"));
        assert!(is_price_related("보증금 3,500만 원"));
        assert!(!is_price_related("신도시 교통 대책 발표 광역버스 노선 신설"));
    }

    #[test]
    fn test_page_url() {
        let scraper = PortalScraper::new(reqwest::Client::new(), DEFAULT_BASE_URL, true);
        assert_eq!(
            scraper.page_url("집값 전망", SortMode::Date, 2),
            "https://search.naver.com/search.naver?where=news&query=%EC%A7%91%EA%B0%92%20%EC%A0%84%EB%A7%9D&sort=1&start=11"
        );
    }
}
