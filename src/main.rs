//! # Awful News Hub
//!
//! A keyword-driven news analysis desk for the terminal. It fetches Korean
//! news for a keyword, labels every article with a category and a sentiment,
//! ranks the articles against free-text questions, and answers those
//! questions through an OpenAI-compatible chat-completion API.
//!
//! ## Features
//!
//! - Fetches articles from the Naver News Search API, the Google News RSS
//!   search feed, or the Naver portal search page (price-related items)
//! - Classifies articles into categories and sentiments by keyword voting
//! - Ranks articles with weighted keyword overlap, term expansion and compound bonuses
//! - Answers questions with an LLM, falling back to a templated summary
//! - Renders chat, statistics and article lists as Markdown; exports JSON snapshots
//!
//! ## Usage
//!
//! ```sh
//! awful_news_hub -k 금리
//! awful_news_hub --source rss -k 반도체 -q "향후 전망은?"
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: A [`sources::NewsSource`] behind a TTL cache returns raw articles
//! 2. **Labeling**: The [`engine::Engine`] assigns category and sentiment once, at ingestion
//! 3. **Ranking**: Each question ranks the working set; no match falls back to the newest articles
//! 4. **Answering**: The completion client (with retry) or a templated summary produces the reply

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod desk;
mod engine;
mod errors;
mod models;
mod outputs;
mod repl;
mod session;
mod sources;
mod utils;

use api::{OpenAiChat, RetryAsk};
use cli::Cli;
use config::{HubConfig, load_config};
use desk::{AnswerSettings, Desk};
use engine::Engine;
use outputs::markdown;
use repl::SearchPrefs;
use session::Session;
use sources::cache::CachedSource;
use sources::{AnySource, SourceKind, http_client, naver, portal, rss};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("awful_news_hub starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.keyword, ?args.source, "Parsed CLI arguments");

    // An explicit config path that cannot be read is the only fatal error
    let mut config = load_config(args.config.as_deref())?;
    if let Some(source) = args.source {
        config.search.source = source;
    }
    if let Some(display) = args.display {
        config.search.display = display;
    }
    if let Some(sort) = args.sort {
        config.search.sort = sort;
    }

    // ---- Build the desk ----
    let source = build_source(&config, &args)?;
    let completion = build_completion(&config, args.openai_api_key.clone())?;
    let engine = Engine::new(
        &config.engine.lexicon,
        config.engine.weights,
        config.engine.top_k,
    );
    let mut desk = Desk::new(
        engine,
        CachedSource::new(source, Duration::from_secs(config.search.cache_ttl_secs)),
        completion,
        AnswerSettings::from_config(&config),
    );
    info!(
        source = desk.source_name(),
        completion = desk.has_completion(),
        display = config.search.display,
        sort = config.search.sort.as_param(),
        "Desk ready"
    );

    let mut session = Session::new();
    let prefs = SearchPrefs {
        display: config.search.display,
        sort: config.search.sort,
    };

    if let Some(keyword) = args.keyword.as_deref() {
        repl::run_search(&mut desk, &mut session, keyword, prefs).await;
    }

    match args.question.as_deref() {
        // ---- One-shot mode ----
        Some(question) => {
            let answer = desk.ask(&mut session, question).await;
            println!("{}", markdown::render_answer(&answer));
        }
        None => {
            if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
                warn!(
                    path = %args.json_output_dir,
                    error = %e,
                    "Snapshot directory is not writable; :save will fail"
                );
            }
            repl::run(&mut desk, &mut session, prefs, &args.json_output_dir).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Instantiate the configured news source, warning about missing credentials.
fn build_source(config: &HubConfig, args: &Cli) -> Result<AnySource, Box<dyn Error>> {
    let http = http_client(Some(Duration::from_secs(config.search.timeout_secs)))?;
    let source = match config.search.source {
        SourceKind::Naver => {
            let api = naver::NaverNewsApi::new(
                http,
                config.search.naver_endpoint.clone(),
                args.naver_client_id.clone(),
                args.naver_client_secret.clone(),
            );
            if !api.has_credentials() {
                warn!("NAVER_CLIENT_ID / NAVER_CLIENT_SECRET not set; searches will return nothing (try --source rss)");
            }
            AnySource::Naver(api)
        }
        SourceKind::Rss => AnySource::Rss(rss::GoogleNewsRss::new(
            http,
            config.search.rss_base_url.clone(),
        )),
        SourceKind::Portal => AnySource::Portal(portal::PortalScraper::new(
            http,
            config.search.portal_base_url.clone(),
            config.search.price_filter,
        )),
    };
    Ok(source)
}

/// The retrying completion client, or `None` when no API key is configured.
fn build_completion(
    config: &HubConfig,
    api_key: Option<String>,
) -> Result<Option<RetryAsk<OpenAiChat>>, Box<dyn Error>> {
    let http = http_client(Some(Duration::from_secs(config.completion.timeout_secs)))?;
    let chat = OpenAiChat::new(
        http,
        config.completion.api_base.clone(),
        api_key,
        config.completion.model.clone(),
    );
    if !chat.has_credentials() {
        warn!("OPENAI_API_KEY not set; answers will use the templated summary");
        return Ok(None);
    }
    Ok(Some(RetryAsk::new(
        chat,
        config.completion.max_retries,
        Duration::from_millis(config.completion.retry_base_delay_ms),
    )))
}
