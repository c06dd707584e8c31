//! Line-oriented interactive session on stdin.
//!
//! Lines starting with `:` are commands; anything else is a question about
//! the current working set.

use crate::api::AskAsync;
use crate::desk::{AnalysisKind, Desk, QUICK_QUESTIONS, SearchOutcome, TRENDING_KEYWORDS};
use crate::errors::FetchError;
use crate::models::SortMode;
use crate::outputs::insights::Insights;
use crate::outputs::{json, markdown};
use crate::session::Session;
use crate::sources::NewsSource;
use clap::ValueEnum;
use std::error::Error;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

pub const HELP: &str = "\
## 📖 사용 방법

| 명령 | 설명 |
|------|------|
| `:search <키워드>` | 뉴스 수집 (작업 기사 목록 교체) |
| `:display <1-100>` | 수집할 기사 수 |
| `:sort date\\|sim` | 정렬 방식 (최신순/정확도순) |
| `:trend [번호]` | 실시간 트렌드 키워드 보기/검색 |
| `:quick [번호]` | 빠른 질문 보기/실행 |
| `:analyze overview\\|trend\\|sentiment\\|forecast` | 심층 분석 |
| `:stats` | 데이터 시각화 |
| `:list` | 전체 기사 목록 |
| `:history` | 대화 기록 |
| `:reset` | 대화 및 기사 초기화 |
| `:save` | JSON 스냅샷 저장 |
| `:help` | 도움말 |
| `:quit` | 종료 |

그 밖의 입력은 수집한 뉴스에 대한 질문으로 처리됩니다.
";

/// Search preferences adjustable during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPrefs {
    pub display: u32,
    pub sort: SortMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Display(u32),
    Sort(SortMode),
    /// List trending keywords, or search the 1-based entry.
    Trending(Option<usize>),
    /// List quick questions, or ask the 1-based entry.
    Quick(Option<usize>),
    Analyze(AnalysisKind),
    Stats,
    List,
    History,
    Reset,
    Save,
    Help,
    Quit,
    Ask(String),
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Ask(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match (name, arg) {
            ("search" | "s", "") => Command::Invalid("검색할 키워드를 입력하세요.".to_string()),
            ("search" | "s", keyword) => Command::Search(keyword.to_string()),
            ("display" | "d", n) => match n.parse::<u32>() {
                Ok(n) if (1..=100).contains(&n) => Command::Display(n),
                _ => Command::Invalid("기사 수는 1에서 100 사이여야 합니다.".to_string()),
            },
            ("sort", mode) => match SortMode::from_str(mode, true) {
                Ok(sort) => Command::Sort(sort),
                Err(_) => Command::Invalid("정렬 방식은 date 또는 sim 입니다.".to_string()),
            },
            ("trend" | "t", n) => parse_index(n).map_or_else(Command::Invalid, Command::Trending),
            ("quick" | "k", n) => parse_index(n).map_or_else(Command::Invalid, Command::Quick),
            ("analyze" | "a", kind) => match AnalysisKind::from_str(kind, true) {
                Ok(kind) => Command::Analyze(kind),
                Err(_) => Command::Invalid(
                    "분석 유형은 overview, trend, sentiment, forecast 중 하나입니다.".to_string(),
                ),
            },
            ("stats", _) => Command::Stats,
            ("list" | "l", _) => Command::List,
            ("history" | "h", _) => Command::History,
            ("reset", _) => Command::Reset,
            ("save", _) => Command::Save,
            ("help" | "?", _) => Command::Help,
            ("quit" | "q" | "exit", _) => Command::Quit,
            (other, _) => Command::Invalid(format!("알 수 없는 명령입니다: :{other} (:help 참고)")),
        }
    }
}

fn parse_index(arg: &str) -> Result<Option<usize>, String> {
    if arg.is_empty() {
        return Ok(None);
    }
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Some(n - 1)),
        _ => Err(format!("번호가 올바르지 않습니다: {arg}")),
    }
}

/// User-facing text for a search outcome.
pub fn describe_search(keyword: &str, outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Found(n) => {
            format!("✅ '{}' 관련 뉴스 {}건을 수집했습니다. 질문을 입력해보세요!", keyword.trim(), n)
        }
        SearchOutcome::NothingFound => {
            format!("🔍 '{}'에 대한 뉴스를 찾을 수 없습니다.", keyword.trim())
        }
        SearchOutcome::Failed(FetchError::MissingCredential(name)) => {
            format!("⚠️ {name}이(가) 설정되지 않아 뉴스를 수집할 수 없습니다. --source rss 로 시도해보세요.")
        }
        SearchOutcome::Failed(e) => format!("⚠️ 뉴스 수집에 실패했습니다: {e}"),
    }
}

/// Run one search and print the outcome.
pub async fn run_search<S: NewsSource, C: AskAsync>(
    desk: &mut Desk<S, C>,
    session: &mut Session,
    keyword: &str,
    prefs: SearchPrefs,
) {
    let outcome = desk.search(session, keyword, prefs.display, prefs.sort).await;
    println!("{}\n", describe_search(keyword, &outcome));
}

/// Read commands from stdin until `:quit` or end of input.
pub async fn run<S: NewsSource, C: AskAsync>(
    desk: &mut Desk<S, C>,
    session: &mut Session,
    mut prefs: SearchPrefs,
    json_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(session)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = Command::parse(&line);
        debug!(?command, "Parsed command");

        match command {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Invalid(msg) => println!("❓ {msg}\n"),
            Command::Search(keyword) => run_search(desk, session, &keyword, prefs).await,
            Command::Display(n) => {
                prefs.display = n;
                println!("📊 수집할 기사 수: {n}\n");
            }
            Command::Sort(sort) => {
                prefs.sort = sort;
                println!("🔄 정렬 방식: {}\n", sort.label());
            }
            Command::Trending(None) => {
                println!("### 🔥 실시간 트렌드\n");
                for (i, k) in TRENDING_KEYWORDS.iter().enumerate() {
                    println!("{}. {}", i + 1, k);
                }
                println!();
            }
            Command::Trending(Some(i)) => match TRENDING_KEYWORDS.get(i) {
                Some(keyword) => run_search(desk, session, keyword, prefs).await,
                None => println!("❓ 트렌드 키워드는 1에서 {}번까지입니다.\n", TRENDING_KEYWORDS.len()),
            },
            Command::Quick(None) => {
                println!("### 💡 빠른 질문하기\n");
                for (i, (label, _)) in QUICK_QUESTIONS.iter().enumerate() {
                    println!("{}. {}", i + 1, label);
                }
                println!();
            }
            Command::Quick(Some(i)) => {
                if !session.has_articles() {
                    println!("👈 먼저 :search 로 뉴스를 수집하세요.\n");
                    continue;
                }
                match desk.quick(session, i).await {
                    Some(answer) => println!("{}", markdown::render_answer(&answer)),
                    None => println!("❓ 빠른 질문은 1에서 {}번까지입니다.\n", QUICK_QUESTIONS.len()),
                }
            }
            Command::Analyze(kind) => match desk.analyze(session, kind).await {
                Some(answer) => println!("## 🔍 {}\n\n{}", kind.label(), answer.text),
                None => println!("👈 먼저 :search 로 뉴스를 수집하세요.\n"),
            },
            Command::Stats => {
                let insights = Insights::compute(session.keyword(), session.articles());
                println!("{}", markdown::render_insights(&insights));
            }
            Command::List => println!(
                "{}",
                markdown::render_article_list(session.keyword(), session.articles())
            ),
            Command::History => println!("{}", markdown::render_transcript(session.transcript())),
            Command::Reset => {
                session.reset();
                println!("🔄 대화와 기사 목록을 초기화했습니다.\n");
            }
            Command::Save => match json::write_snapshot(session, json_output_dir).await {
                Ok(path) => println!("💾 저장했습니다: {}\n", path.display()),
                Err(e) => {
                    error!(error = %e, "Failed to write snapshot");
                    println!("⚠️ 스냅샷 저장에 실패했습니다: {e}\n");
                }
            },
            Command::Ask(question) => {
                if !session.has_articles() {
                    println!("👈 먼저 :search 로 뉴스를 수집하세요.\n");
                    continue;
                }
                let answer = desk.ask(session, &question).await;
                println!("{}", markdown::render_answer(&answer));
            }
        }
    }

    info!(turns = session.transcript().len(), "Session ended");
    Ok(())
}

fn prompt(session: &Session) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    match session.keyword() {
        Some(k) => write!(stdout, "[{} · {}건] > ", k, session.articles().len())?,
        None => write!(stdout, "> ")?,
    }
    stdout.flush()
}
