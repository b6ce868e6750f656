//! Reddit HTTP client
//!
//! Every request carries a fixed User-Agent. Transient failures (network,
//! 5xx, 429) are retried with linear backoff; a 429 honours `Retry-After`
//! (clamped) and draws from the same retry budget. Other 4xx responses are
//! terminal.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "web:com.karmicup.app:v1.0.0 (by /u/karmicup)";

/// Read access to Reddit's public JSON API
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// GET a path (relative to the API base, or an absolute URL) and decode JSON
    async fn get_json(&self, path: &str) -> Result<Value, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Non-429 4xx; never retried
    #[error("Reddit returned HTTP {status}: {message}")]
    ClientError { status: u16, message: String },

    /// Network failure, 5xx or rate limiting that outlasted the retry budget
    #[error("Reddit unavailable: {0}")]
    Unavailable(String),

    /// 2xx with a body that is not the expected JSON shape
    #[error("Unexpected Reddit response: {0}")]
    Malformed(String),
}

/// Retry budget and delays
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Linear backoff unit: retry `n` waits `n * retry_delay`
    pub retry_delay: Duration,
    /// Ceiling applied to server-supplied `Retry-After`
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
            max_retry_after: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        self.retry_delay.saturating_mul(retry)
    }

    /// Delay before retry number `retry` after a 429
    pub fn rate_limit_delay(&self, retry_after: Option<Duration>, retry: u32) -> Duration {
        match retry_after {
            Some(wait) => wait.min(self.max_retry_after),
            None => self.backoff(retry),
        }
    }
}

/// Outcome of a single HTTP attempt
#[derive(Debug)]
pub(crate) enum Attempt {
    Success(Value),
    RateLimited { retry_after: Option<Duration> },
    ClientError { status: u16, message: String },
    Retryable(String),
    Malformed(String),
}

/// Drive `send` until it succeeds, fails terminally, or the budget runs out
pub(crate) async fn run_with_retries<F, Fut>(
    policy: &RetryPolicy,
    path: &str,
    mut send: F,
) -> Result<Value, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt>,
{
    let mut last_error = String::from("no attempt made");

    for attempt in 0..=policy.max_retries {
        let retry = attempt + 1;
        let has_budget = attempt < policy.max_retries;

        match send().await {
            Attempt::Success(value) => return Ok(value),
            Attempt::ClientError { status, message } => {
                return Err(GatewayError::ClientError { status, message });
            }
            Attempt::Malformed(detail) => return Err(GatewayError::Malformed(detail)),
            Attempt::RateLimited { retry_after } => {
                last_error = "rate limited (HTTP 429)".to_string();
                if has_budget {
                    let delay = policy.rate_limit_delay(retry_after, retry);
                    warn!(path = %path, retry, delay_ms = delay.as_millis() as u64, "Reddit rate limited, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
            Attempt::Retryable(reason) => {
                if has_budget {
                    let delay = policy.backoff(retry);
                    warn!(path = %path, retry, error = %reason, delay_ms = delay.as_millis() as u64, "Reddit request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                last_error = reason;
            }
        }
    }

    Err(GatewayError::Unavailable(last_error))
}

/// Parse a `Retry-After` value given in seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct RedditClientConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Timeout for a single HTTP attempt
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RedditClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// reqwest-backed [`ContentGateway`]
pub struct RedditClient {
    config: RedditClientConfig,
    http_client: reqwest::Client,
}

impl RedditClient {
    pub fn new(config: RedditClientConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();

        Self { config, http_client }
    }

    pub fn config(&self) -> &RedditClientConfig {
        &self.config
    }

    /// Resolve a path against the configured base URL
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
        }
    }

    async fn send_once(&self, url: &str) -> Attempt {
        let response = match self
            .http_client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retryable(format!("network error: {}", e)),
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Attempt::RateLimited { retry_after };
        }

        if status.is_client_error() {
            return Attempt::ClientError {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("client error").to_string(),
            };
        }

        if !status.is_success() {
            return Attempt::Retryable(format!("HTTP {}", status));
        }

        match response.json::<Value>().await {
            Ok(value) => Attempt::Success(value),
            Err(e) => Attempt::Malformed(format!("invalid JSON body: {}", e)),
        }
    }
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new(RedditClientConfig::default())
    }
}

#[async_trait]
impl ContentGateway for RedditClient {
    async fn get_json(&self, path: &str) -> Result<Value, GatewayError> {
        let url = self.url_for(path);
        debug!(url = %url, "Fetching from Reddit");
        run_with_retries(&self.config.retry, path, || self.send_once(&url)).await
    }
}
