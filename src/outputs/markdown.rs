//! Markdown rendering for the terminal.
//!
//! Every renderer returns a `String`; printing is left to the caller.

use crate::desk::Answer;
use crate::models::{Article, Role, Turn};
use crate::outputs::insights::Insights;
use crate::utils::truncate_chars;
use std::fmt::Write;

/// Characters of content shown per article in the templated summary.
pub const SUMMARY_SNIPPET_CHARS: usize = 200;
/// Characters of content shown per reference under an answer.
pub const REFERENCE_SNIPPET_CHARS: usize = 150;
/// Articles included in the templated summary.
pub const SUMMARY_ARTICLES: usize = 3;

pub const NOTHING_FOUND: &str = "관련 뉴스를 찾을 수 없습니다. 😔";

const BAR_WIDTH: usize = 30;

/// Keyword-only answer used when no completion is available.
///
/// Lists the first three articles with title, date, category, the first
/// 200 characters of content and a link.
pub fn render_template_summary(query: &str, articles: &[Article]) -> String {
    if articles.is_empty() {
        return NOTHING_FOUND.to_string();
    }

    let mut md = String::new();
    let _ = writeln!(md, "📰 **'{}'에 대한 검색 결과:**\n", query);
    for (i, a) in articles.iter().take(SUMMARY_ARTICLES).enumerate() {
        let _ = writeln!(md, "### {}. {}", i + 1, a.title);
        let _ = writeln!(md, "📅 {} | 🏷️ {}\n", a.stamp(), a.category);
        let _ = writeln!(
            md,
            "{}...\n",
            truncate_chars(&a.content, SUMMARY_SNIPPET_CHARS, "")
        );
        let _ = writeln!(md, "🔗 [기사 전문 보기]({})\n", a.url);
    }
    md
}

/// An answer followed by its reference articles.
pub fn render_answer(answer: &Answer) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "{}", answer.text.trim_end());
    if answer.references.is_empty() {
        return md;
    }

    let _ = writeln!(md, "\n#### 📎 참고 기사\n");
    for (i, a) in answer.references.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(md, "---");
        }
        let _ = writeln!(md, "**{}. [{}]({})**", i + 1, a.title, a.url);
        let _ = writeln!(md, "_{} | {}_", a.published_on, a.category);
        let _ = writeln!(
            md,
            "{}...\n",
            truncate_chars(&a.content, REFERENCE_SNIPPET_CHARS, "")
        );
    }
    md
}

/// Full article list of the working set.
pub fn render_article_list(keyword: Option<&str>, articles: &[Article]) -> String {
    let mut md = String::new();
    match keyword {
        Some(k) => {
            let _ = writeln!(md, "## 📰 '{}' 전체 기사 목록 ({}건)\n", k, articles.len());
        }
        None => {
            let _ = writeln!(md, "## 📰 전체 기사 목록 ({}건)\n", articles.len());
        }
    }
    for (i, a) in articles.iter().enumerate() {
        let source = a
            .source_tag()
            .map(|tag| format!(" `{}`", tag))
            .unwrap_or_default();
        let _ = writeln!(md, "{}. **{}**{}", i + 1, a.title, source);
        let _ = writeln!(
            md,
            "   📅 {} | 🏷️ {} | {}",
            a.stamp(),
            a.category,
            a.sentiment
        );
        if !a.content.is_empty() {
            let _ = writeln!(md, "   {}", a.content);
        }
        let _ = writeln!(md, "   🔗 [기사 원문]({})\n", a.url);
    }
    md
}

/// Headline metrics, histograms and the keyword list as text bars.
pub fn render_insights(insights: &Insights) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "## 📊 데이터 시각화\n");
    let _ = writeln!(
        md,
        "- 🔍 검색 키워드: {}",
        insights.keyword.as_deref().unwrap_or("-")
    );
    let _ = writeln!(md, "- 📰 수집 기사: {}건", insights.total);
    let _ = writeln!(
        md,
        "- 📅 최신 기사: {}",
        insights
            .latest
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(
        md,
        "- 🏷️ 주요 카테고리: {}\n",
        insights
            .dominant_category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    let widest = insights
        .categories
        .iter()
        .map(|c| c.count)
        .chain(insights.dates.iter().map(|d| d.count))
        .max()
        .unwrap_or(0);

    let _ = writeln!(md, "### 📈 카테고리별 분포\n");
    for c in &insights.categories {
        let _ = writeln!(md, "    {:<12} {} {}", c.key.to_string(), bar(c.count, widest), c.count);
    }

    let _ = writeln!(md, "\n### 😊 감정 분포\n");
    for s in &insights.sentiments {
        let _ = writeln!(md, "- {}: {}건", s.key, s.count);
    }

    let _ = writeln!(md, "\n### 📅 날짜별 분포\n");
    for d in &insights.dates {
        let _ = writeln!(md, "    {} {} {}", d.key, bar(d.count, widest), d.count);
    }

    let _ = writeln!(md, "\n### ☁️ 주요 키워드\n");
    let tags: Vec<String> = insights
        .keywords
        .iter()
        .map(|k| format!("{}({}, {:.1}rem)", k.word, k.freq, k.size_rem))
        .collect();
    let _ = writeln!(md, "{}", tags.join(" · "));
    md
}

fn bar(count: usize, widest: usize) -> String {
    if widest == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH).div_ceil(widest);
    "█".repeat(width)
}

/// The conversation so far.
pub fn render_transcript(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "_대화 기록이 없습니다._\n".to_string();
    }
    let mut md = String::new();
    for turn in turns {
        let speaker = match turn.role {
            Role::User => "🙋 **사용자**",
            Role::Assistant => "🤖 **AI**",
        };
        let _ = writeln!(md, "{}\n\n{}\n", speaker, turn.text.trim_end());
    }
    md
}
