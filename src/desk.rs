//! The answer desk: runs one user action against a [`Session`].
//!
//! # Pipeline
//!
//! 1. **Search**: fetch through the TTL cache, label every article, replace the working set
//! 2. **Rank**: score the working set against the question (recent articles when nothing matches)
//! 3. **Answer**: ask the completion endpoint, or fall back to a templated summary
//!
//! Every step runs to completion before the next starts. Failures at the
//! network boundaries degrade the result; they never abort the session.

use crate::api::{AskAsync, ChatRequest, RetryAsk, ask_with_backoff};
use crate::config::HubConfig;
use crate::engine::Engine;
use crate::errors::FetchError;
use crate::models::{Article, SortMode, Turn};
use crate::outputs::markdown::render_template_summary;
use crate::session::Session;
use crate::sources::cache::CachedSource;
use crate::sources::{NewsSource, SearchRequest};
use std::fmt::Write;
use tracing::{info, instrument, warn};

/// Reference articles attached to an answer.
pub const MAX_REFERENCES: usize = 3;
/// Articles included in the completion context block.
pub const MAX_CONTEXT_ARTICLES: usize = 5;

/// One-click keywords offered at the prompt.
pub const TRENDING_KEYWORDS: [&str; 7] = ["삼성전자", "테슬라", "AI", "부동산", "금리", "우크라이나", "K팝"];

/// Canned questions as (button label, question text).
pub const QUICK_QUESTIONS: [(&str, &str); 4] = [
    ("📈 이 주제의 최신 동향은?", "이 주제에 대한 최신 동향은 무엇인가요?"),
    ("💭 전문가들의 의견은?", "이 주제에 대한 전문가들의 의견은 어떤가요?"),
    ("🔮 향후 전망은?", "이 주제의 향후 전망은 어떻게 되나요?"),
    ("⚡ 주요 이슈는?", "현재 가장 중요한 이슈는 무엇인가요?"),
];

/// Kinds of one-off analysis run over the current keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AnalysisKind {
    Overview,
    Trend,
    Sentiment,
    Forecast,
}

impl AnalysisKind {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::Overview => "종합 분석",
            AnalysisKind::Trend => "트렌드 분석",
            AnalysisKind::Sentiment => "감정 분석",
            AnalysisKind::Forecast => "예측 분석",
        }
    }
}

/// Sampling and fallback settings for answering.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSettings {
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub fallback_count: usize,
}

impl AnswerSettings {
    pub fn from_config(config: &HubConfig) -> Self {
        Self {
            system_prompt: config.completion.system_prompt.clone(),
            temperature: config.completion.temperature,
            max_tokens: config.completion.max_tokens,
            fallback_count: config.engine.fallback_count,
        }
    }
}

/// Result of a search action.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The working set now holds this many articles.
    Found(usize),
    /// The source answered with nothing; the previous working set is kept.
    NothingFound,
    /// The source failed; treated as zero results.
    Failed(FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOrigin {
    Completion,
    Template,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub references: Vec<Article>,
    pub origin: AnswerOrigin,
}

pub struct Desk<S, C> {
    engine: Engine,
    source: CachedSource<S>,
    completion: Option<RetryAsk<C>>,
    settings: AnswerSettings,
}

impl<S, C> Desk<S, C>
where
    S: NewsSource,
    C: AskAsync,
{
    pub fn new(
        engine: Engine,
        source: CachedSource<S>,
        completion: Option<RetryAsk<C>>,
        settings: AnswerSettings,
    ) -> Self {
        Self {
            engine,
            source,
            completion,
            settings,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Fetch articles for `keyword` and make them the working set.
    #[instrument(level = "info", skip_all, fields(keyword = %keyword, display = display_count, sort = sort.as_param()))]
    pub async fn search(
        &mut self,
        session: &mut Session,
        keyword: &str,
        display_count: u32,
        sort: SortMode,
    ) -> SearchOutcome {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return SearchOutcome::NothingFound;
        }

        let request = SearchRequest::new(keyword, display_count, sort);
        let raw = match self.source.search(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "Search failed; treating as zero results");
                return SearchOutcome::Failed(e);
            }
        };
        if raw.is_empty() {
            info!("Search returned nothing; keeping previous working set");
            return SearchOutcome::NothingFound;
        }

        let articles: Vec<Article> = raw.into_iter().map(|r| self.engine.ingest(r)).collect();
        let count = articles.len();
        session.replace_working_set(keyword, articles);
        info!(count, "Working set replaced");
        SearchOutcome::Found(count)
    }

    /// Answer a free-text question and record both turns in the transcript.
    #[instrument(level = "info", skip_all, fields(question = %question))]
    pub async fn ask(&self, session: &mut Session, question: &str) -> Answer {
        let answer = self.answer(session, question).await;
        session.push_turn(Turn::user(question));
        session.push_turn(Turn::assistant(answer.text.clone()));
        answer
    }

    /// Route quick question `index` through [`Desk::ask`].
    pub async fn quick(&self, session: &mut Session, index: usize) -> Option<Answer> {
        let (_, question) = QUICK_QUESTIONS.get(index)?;
        Some(self.ask(session, question).await)
    }

    /// Run a one-off analysis of the current keyword. The transcript is untouched.
    pub async fn analyze(&self, session: &Session, kind: AnalysisKind) -> Option<Answer> {
        let keyword = session.keyword()?;
        let query = format!("{}: {}", kind.label(), keyword);
        Some(self.answer(session, &query).await)
    }

    /// Articles that back an answer to `query`.
    ///
    /// The ranked top-K, or the most recent articles when nothing scores.
    pub fn context_for(&self, query: &str, articles: &[Article]) -> Vec<Article> {
        let ranked = self.engine.rank(query, articles);
        if !ranked.is_empty() {
            return ranked.into_iter().map(|s| s.article.clone()).collect();
        }
        most_recent(articles, self.settings.fallback_count)
    }

    async fn answer(&self, session: &Session, query: &str) -> Answer {
        let context = self.context_for(query, session.articles());
        let references: Vec<Article> = context.iter().take(MAX_REFERENCES).cloned().collect();

        if context.is_empty() {
            return Answer {
                text: render_template_summary(query, &context),
                references,
                origin: AnswerOrigin::Template,
            };
        }

        if let Some(client) = &self.completion {
            let request = self.chat_request(session.transcript(), query, &context);
            match ask_with_backoff(client, &request).await {
                Ok(text) => {
                    return Answer {
                        text,
                        references,
                        origin: AnswerOrigin::Completion,
                    };
                }
                Err(e) => warn!(error = %e, "Completion failed; using templated summary"),
            }
        }

        Answer {
            text: render_template_summary(query, &context),
            references,
            origin: AnswerOrigin::Template,
        }
    }

    fn chat_request(&self, prior: &[Turn], query: &str, context: &[Article]) -> ChatRequest {
        let mut turns = prior.to_vec();
        turns.push(Turn::user(format!(
            "{}\n사용자 질문: {}\n\n위 기사들을 분석하여 답변해주세요.",
            context_block(context),
            query
        )));
        ChatRequest {
            system: self.settings.system_prompt.clone(),
            turns,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

/// The `n` newest articles, newest first; equal timestamps keep working-set order.
pub fn most_recent(articles: &[Article], n: usize) -> Vec<Article> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by(|a, b| (b.published_on, b.published_at).cmp(&(a.published_on, a.published_at)));
    sorted.into_iter().take(n).cloned().collect()
}

/// Numbered article context sent ahead of the question.
pub fn context_block(articles: &[Article]) -> String {
    let mut block = String::from("관련 뉴스 기사:\n\n");
    for (i, a) in articles.iter().take(MAX_CONTEXT_ARTICLES).enumerate() {
        let _ = writeln!(block, "[기사 {}]", i + 1);
        let _ = writeln!(block, "제목: {}", a.title);
        let _ = writeln!(block, "날짜: {}", a.stamp());
        let _ = writeln!(block, "내용: {}", a.content);
        let _ = writeln!(block, "출처: {}\n", a.source_url);
    }
    block
}
