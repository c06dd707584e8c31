//! YAML configuration for the completion client, news sources and engine.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. Credentials never live here; they come from the
//! command line or the environment.
//!
//! ```yaml
//! completion:
//!   model: gpt-4o-mini
//!   max_tokens: 800
//! search:
//!   source: rss
//!   display: 30
//! engine:
//!   top_k: 5
//!   lexicon:
//!     expansions:
//!       코인: [비트코인, 가상자산]
//! ```

use crate::engine::{DEFAULT_TOP_K, Lexicon, ScoreWeights};
use crate::errors::ConfigError;
use crate::models::SortMode;
use crate::sources::{SourceKind, cache, naver, portal, rss};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const DEFAULT_SYSTEM_PROMPT: &str = "당신은 뉴스 분석 전문가입니다.
사용자의 질문에 대해 제공된 뉴스 기사를 분석하여 명확하고 통찰력 있는 답변을 제공하세요.
답변에는 다음을 포함하세요:
1. 핵심 요약
2. 주요 트렌드나 패턴
3. 실용적인 인사이트
이모지를 적절히 사용하여 읽기 쉽게 만드세요.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_retries: 2,
            retry_base_delay_ms: 1000,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub source: SourceKind,
    pub display: u32,
    pub sort: SortMode,
    pub cache_ttl_secs: u64,
    /// Portal scraping only keeps price-related items when set.
    pub price_filter: bool,
    pub timeout_secs: u64,
    pub naver_endpoint: String,
    pub rss_base_url: String,
    pub portal_base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            display: 20,
            sort: SortMode::default(),
            cache_ttl_secs: cache::DEFAULT_TTL.as_secs(),
            price_filter: true,
            timeout_secs: 15,
            naver_endpoint: naver::DEFAULT_ENDPOINT.to_string(),
            rss_base_url: rss::DEFAULT_BASE_URL.to_string(),
            portal_base_url: portal::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub top_k: usize,
    /// Most recent articles used when ranking finds nothing.
    pub fallback_count: usize,
    pub weights: ScoreWeights,
    pub lexicon: Lexicon,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            fallback_count: 3,
            weights: ScoreWeights::default(),
            lexicon: Lexicon::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub completion: CompletionConfig,
    pub search: SearchConfig,
    pub engine: EngineConfig,
}

/// `<config dir>/awful_news_hub/config.yaml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("awful_news_hub").join("config.yaml"))
}

/// Load the configuration.
///
/// An explicit path must be readable. Without one, the default location is
/// used if the file exists; otherwise built-in defaults apply.
#[instrument(level = "info")]
pub fn load_config(explicit: Option<&str>) -> Result<HubConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(Path::new(path)),
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => read_config(&path),
            None => {
                info!("No configuration file found; using defaults");
                Ok(HubConfig::default())
            }
        },
    }
}

fn read_config(path: &Path) -> Result<HubConfig, ConfigError> {
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: shown.clone(),
        source,
    })?;
    let config = parse_config(&text).map_err(|source| ConfigError::Yaml {
        path: shown.clone(),
        source,
    })?;
    validate(&config).map_err(|reason| ConfigError::Invalid {
        path: shown.clone(),
        reason,
    })?;
    info!(path = %shown, "Loaded configuration");
    Ok(config)
}

fn validate(config: &HubConfig) -> Result<(), String> {
    let w = config.engine.weights;
    if !w.is_ordered() {
        return Err(format!(
            "engine.weights must satisfy title > content > category (got {} / {} / {})",
            w.title, w.content, w.category
        ));
    }
    Ok(())
}

fn parse_config(text: &str) -> Result<HubConfig, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(HubConfig::default());
    }
    serde_yaml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, HubConfig::default());
        assert_eq!(config.completion.max_tokens, 800);
        assert_eq!(config.search.cache_ttl_secs, 1800);
        assert_eq!(config.engine.fallback_count, 3);
    }

    #[test]
    fn test_partial_overrides_keep_other_defaults() {
        let yaml = r#"
search:
  source: rss
  display: 30
engine:
  weights:
    title: 4
  lexicon:
    categories:
      culture: [quidditch]
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.search.source, SourceKind::Rss);
        assert_eq!(config.search.display, 30);
        assert_eq!(config.search.sort, SortMode::Date);
        assert_eq!(config.engine.weights.title, 4);
        assert_eq!(config.engine.weights.content, 2);
        assert_eq!(
            config.engine.lexicon.categories.get(&Category::Culture),
            Some(&vec!["quidditch".to_string()])
        );
        assert_eq!(config.completion.model, "gpt-4o-mini");
    }

    #[test]
    fn test_explicit_path_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "completion:\n  model: local-llm\n  api_base: http://localhost:8080/v1").unwrap();
        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.completion.model, "local-llm");
        assert_eq!(config.completion.api_base, "http://localhost:8080/v1");
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = load_config(missing.to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_misordered_weights_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine:\n  weights:\n    title: 1\n    content: 5").unwrap();
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("title > content > category"));
    }

    #[test]
    fn test_equal_weights_are_rejected() {
        let config = parse_config("engine:\n  weights:\n    content: 1\n    category: 1").unwrap();
        assert!(validate(&config).is_err());
        assert!(validate(&HubConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "search: [not, a, map").unwrap();
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
