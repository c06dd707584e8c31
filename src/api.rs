//! Chat-completion API interaction with exponential backoff retry logic.
//!
//! This module provides the interface for asking an OpenAI-compatible
//! chat-completion endpoint to answer a question about the working set.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`OpenAiChat`]: Talks to `POST {api_base}/chat/completions`
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - Only transient failures (network errors, HTTP 429, HTTP 5xx) are retried
//! - Exponential backoff starting at `base_delay`
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::errors::CompletionError;
use crate::models::Turn;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Everything one completion call needs, independent of the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System instruction, sent first and never stored in the transcript.
    pub system: String,
    /// Prior transcript turns followed by the new user turn.
    pub turns: Vec<Turn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for async LLM interaction.
///
/// Implementors send a [`ChatRequest`] and return the completion text.
/// This abstraction allows for different backends or decorators (like retry logic).
pub trait AskAsync {
    /// Send the request and receive the completion text.
    async fn ask(&self, request: &ChatRequest) -> Result<String, CompletionError>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper around an existing [`AskAsync`] implementation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = OpenAiChat::new(http, "https://api.openai.com/v1", Some(key), "gpt-4o-mini");
    /// let retry_client = RetryAsk::new(client, 2, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, request: &ChatRequest) -> Result<String, CompletionError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(request).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !e.is_transient() || attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            transient = e.is_transient(),
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "ask() giving up"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
pub struct OpenAiChat {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChat {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            model: model.into(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("has_key", &self.api_key.is_some())
            .finish()
    }
}

impl AskAsync for OpenAiChat {
    #[instrument(level = "info", skip_all, fields(model = %self.model, turns = request.turns.len()))]
    async fn ask(&self, request: &ChatRequest) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredential("OPENAI_API_KEY"))?;

        let body = WireRequest {
            model: &self.model,
            messages: wire_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let t0 = Instant::now();
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis(),
                status = status.as_u16(),
                body = %truncate_for_log(&text, 300),
                "API call failed"
            );
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&text, 300),
            });
        }

        let parsed: WireResponse = response.json().await?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CompletionError::EmptyReply)?;
        info!(elapsed_ms = t0.elapsed().as_millis(), chars = reply.chars().count(), "Completion received");
        Ok(reply)
    }
}

fn wire_messages(request: &ChatRequest) -> Vec<WireMessage<'_>> {
    std::iter::once(WireMessage {
        role: "system",
        content: &request.system,
    })
    .chain(request.turns.iter().map(|t| WireMessage {
        role: t.role.as_str(),
        content: &t.text,
    }))
    .collect()
}

/// Ask with exponential backoff retry logic.
///
/// This is the primary entry point for answering a question. Logs the
/// outcome and total time; the caller decides how to degrade on failure.
#[instrument(level = "info", skip_all)]
pub async fn ask_with_backoff<C: AskAsync>(
    client: &RetryAsk<C>,
    request: &ChatRequest,
) -> Result<String, CompletionError> {
    let t0 = Instant::now();
    let res = client.ask(request).await;
    let dt = t0.elapsed();

    match &res {
        Ok(_) => info!(elapsed_ms_total = dt.as_millis(), "ask_with_backoff succeeded"),
        Err(e) => error!(elapsed_ms_total = dt.as_millis(), error = %e, "ask_with_backoff failed"),
    }
    res
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Replays scripted outcomes and records every request it sees.
    pub(crate) struct ScriptedAsk {
        pub(crate) outcomes: RefCell<VecDeque<Result<String, CompletionError>>>,
        pub(crate) calls: Cell<usize>,
        pub(crate) seen: RefCell<Vec<ChatRequest>>,
    }

    impl ScriptedAsk {
        pub(crate) fn new(outcomes: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                calls: Cell::new(0),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl AskAsync for ScriptedAsk {
        async fn ask(&self, request: &ChatRequest) -> Result<String, CompletionError> {
            self.calls.set(self.calls.get() + 1);
            self.seen.borrow_mut().push(request.clone());
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(CompletionError::EmptyReply))
        }
    }

    fn request() -> ChatRequest {
        ChatRequest {
            system: "sys".to_string(),
            turns: vec![Turn::user("earlier"), Turn::assistant("reply"), Turn::user("now")],
            temperature: 0.7,
            max_tokens: 800,
        }
    }

    fn server_error() -> CompletionError {
        CompletionError::Status {
            status: 503,
            body: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_errors() {
        let client = RetryAsk::new(
            ScriptedAsk::new(vec![Err(server_error()), Ok("answer".to_string())]),
            2,
            StdDuration::from_millis(10),
        );
        assert_eq!(client.ask(&request()).await.unwrap(), "answer");
        assert_eq!(client.inner().calls.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_retries() {
        let client = RetryAsk::new(
            ScriptedAsk::new(vec![Err(server_error()), Err(server_error()), Err(server_error())]),
            2,
            StdDuration::from_millis(10),
        );
        assert!(ask_with_backoff(&client, &request()).await.is_err());
        assert_eq!(client.inner().calls.get(), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let client = RetryAsk::new(
            ScriptedAsk::new(vec![Err(CompletionError::MissingCredential("OPENAI_API_KEY"))]),
            5,
            StdDuration::from_millis(10),
        );
        assert!(client.ask(&request()).await.is_err());
        assert_eq!(client.inner().calls.get(), 1);
    }

    #[test]
    fn test_wire_messages_put_system_first() {
        let req = request();
        let messages = wire_messages(&req);
        let roles: Vec<&str> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        let json = serde_json::to_string(&WireRequest {
            model: "gpt-4o-mini",
            messages,
            temperature: 0.7,
            max_tokens: 800,
        })
        .unwrap();
        assert!(json.contains("\"max_tokens\":800"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let chat = OpenAiChat::new(reqwest::Client::new(), "http://127.0.0.1:9/v1/", None, "m");
        assert!(!chat.has_credentials());
        assert_eq!(chat.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
        let err = chat.ask(&request()).await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential(_)));
    }
}
