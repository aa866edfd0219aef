/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call OpenRouter directly.
/// All LLM interactions MUST go through this module.
///
/// Model: openai/gpt-4o-mini (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

/// The model used for all LLM calls.
pub const MODEL: &str = "openai/gpt-4o-mini";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 400;
const APP_TITLE: &str = "Job Tracker App";
const APP_REFERER: &str = "http://localhost:3000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response body is not JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result of a completion call that did not fail hard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Text of the first choice. Empty when the response had no content.
    Answer(String),
    /// The upstream kept refusing (rate limit or error status) until the
    /// attempt ceiling was reached.
    GaveUp { status: u16 },
}

/// Attempt ceiling and exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given 1-based attempt: base, 2x base, 4x base, ... capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// What one round-trip produced, before the retry decision.
enum Attempt {
    Answer(String),
    RateLimited { retry_after: Option<Duration> },
    Rejected { status: StatusCode, body: String },
}

/// The single LLM client used by the analysis service.
/// Wraps the OpenRouter chat-completions API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    url: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            url: url.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sends `prompt` as a single user message and returns the model's text.
    ///
    /// 429s wait for the server's `Retry-After` (or backoff) and retry; other
    /// error statuses back off and retry. Once the ceiling is hit, a refusing
    /// upstream yields `Completion::GaveUp` while a transport or decode error
    /// is returned as `Err`.
    pub async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let is_last = attempt >= max_attempts;

            let delay = match self.send(prompt).await {
                Ok(Attempt::Answer(text)) => {
                    debug!("LLM call succeeded on attempt {attempt} ({} chars)", text.len());
                    return Ok(Completion::Answer(text));
                }
                Ok(Attempt::RateLimited { .. }) if is_last => {
                    warn!("LLM still rate limited after {max_attempts} attempts, giving up");
                    return Ok(Completion::GaveUp {
                        status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                    });
                }
                Ok(Attempt::RateLimited { retry_after }) => {
                    let delay = retry_after.unwrap_or_else(|| self.retry.backoff(attempt));
                    warn!(
                        "Rate limited (attempt {attempt}/{max_attempts}), waiting {}ms...",
                        delay.as_millis()
                    );
                    delay
                }
                Ok(Attempt::Rejected { status, body }) if is_last => {
                    error!("LLM API failed after {max_attempts} attempts with status {status}: {body}");
                    return Ok(Completion::GaveUp {
                        status: status.as_u16(),
                    });
                }
                Ok(Attempt::Rejected { status, body }) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "LLM API returned {status} (attempt {attempt}/{max_attempts}), retrying after {}ms: {body}",
                        delay.as_millis()
                    );
                    delay
                }
                Err(e) if is_last => return Err(e),
                Err(e) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "LLM call attempt {attempt} failed ({e}), retrying after {}ms...",
                        delay.as_millis()
                    );
                    delay
                }
            };

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send(&self, prompt: &str) -> Result<Attempt, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut request = self
            .client
            .post(&self.url)
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Ok(Attempt::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(Attempt::Rejected { status, body });
        }

        let body = response.text().await?;
        let data: Value = serde_json::from_str(&body)?;
        Ok(Attempt::Answer(first_choice_text(&data)))
    }
}

/// `Retry-After` in delta-seconds. HTTP-date values are not honoured.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// `choices[0].message.content`, or `""` when any part of that path is missing.
fn first_choice_text(data: &Value) -> String {
    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// The opening and closing fences are removed independently.
pub fn strip_json_fences(text: &str) -> &str {
    let mut text = text.trim();

    if text.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("```json")) {
        text = text[7..].trim_start();
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped.trim_start();
    }

    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped.trim_end();
    }

    text
}
