//! Command-line interface definitions for Awful News Hub.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials can be provided via command-line flags or environment variables.

use crate::models::SortMode;
use crate::sources::SourceKind;
use clap::Parser;

/// Command-line arguments for the Awful News Hub application.
///
/// Without `--question` the application starts an interactive session;
/// with both `--keyword` and `--question` it answers once and exits.
///
/// # Examples
///
/// ```sh
/// # Interactive session, credentials from the environment
/// awful_news_hub
///
/// # Start with a search already loaded
/// awful_news_hub -k 금리 --display 30 --sort sim
///
/// # One-shot answer without any API keys
/// awful_news_hub --source rss -k 반도체 -q "향후 전망은?"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Keyword to search for at startup
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Question to answer once, then exit (requires --keyword)
    #[arg(short, long, requires = "keyword")]
    pub question: Option<String>,

    /// Number of articles to fetch per search (overrides config)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub display: Option<u32>,

    /// Result ordering (overrides config)
    #[arg(short, long, value_enum)]
    pub sort: Option<SortMode>,

    /// News source (overrides config)
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Output directory for JSON session snapshots
    #[arg(short, long, default_value = "./snapshots")]
    pub json_output_dir: String,

    /// Naver search API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub naver_client_id: Option<String>,

    /// Naver search API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub naver_client_secret: Option<String>,

    /// OpenAI-compatible API key for answering questions
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["awful_news_hub"]);

        assert_eq!(cli.json_output_dir, "./snapshots");
        assert!(cli.keyword.is_none());
        assert!(cli.display.is_none());
        assert!(cli.source.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "awful_news_hub",
            "-k",
            "금리",
            "-q",
            "전망은?",
            "-d",
            "30",
            "-s",
            "sim",
            "-j",
            "/tmp/json",
        ]);

        assert_eq!(cli.keyword.as_deref(), Some("금리"));
        assert_eq!(cli.question.as_deref(), Some("전망은?"));
        assert_eq!(cli.display, Some(30));
        assert_eq!(cli.sort, Some(SortMode::Sim));
        assert_eq!(cli.json_output_dir, "/tmp/json");
    }

    #[test]
    fn test_cli_source_and_credentials() {
        let cli = Cli::parse_from([
            "awful_news_hub",
            "--source",
            "portal",
            "--naver-client-id",
            "id",
            "--naver-client-secret",
            "secret",
        ]);

        assert_eq!(cli.source, Some(SourceKind::Portal));
        assert_eq!(cli.naver_client_id.as_deref(), Some("id"));
        assert_eq!(cli.naver_client_secret.as_deref(), Some("secret"));
    }

    #[test]
    fn test_question_requires_keyword() {
        assert!(Cli::try_parse_from(["awful_news_hub", "-q", "전망은?"]).is_err());
    }

    #[test]
    fn test_display_out_of_range() {
        assert!(Cli::try_parse_from(["awful_news_hub", "-d", "0"]).is_err());
        assert!(Cli::try_parse_from(["awful_news_hub", "-d", "101"]).is_err());
    }
}
