//! Typed failures for every external boundary.
//!
//! Nothing here is fatal to the process. Callers branch on the kind:
//!
//! | Kind | Boundary | Degraded behavior |
//! |------|----------|-------------------|
//! | `MissingCredential` | search, completion | warning; zero results / templated answer |
//! | `Network`, `Status`, `Parse` | search, scrape | notice; zero results |
//! | any [`CompletionError`] | completion | templated summary of the top articles |

use thiserror::Error;

/// Failure while fetching articles from a news source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("news source returned HTTP {status}")]
    Status { status: u16 },

    #[error("could not parse news source response: {0}")]
    Parse(String),
}

/// Failure while asking the completion endpoint for an answer.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response had no choices")]
    EmptyReply,
}

impl CompletionError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::MissingCredential(_) | CompletionError::EmptyReply => false,
            CompletionError::Network(_) => true,
            CompletionError::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Failure while loading the YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration in {path}: {reason}")]
    Invalid { path: String, reason: String },
}
