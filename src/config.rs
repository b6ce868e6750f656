//! Configuration for Karmicup
//!
//! CLI arguments with environment variable fallbacks (clap). A `.env` file is
//! loaded by `main` before parsing.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::JwtValidator;
use crate::reddit::{RedditClientConfig, RetryPolicy};
use crate::services::LedgerConfig;
use crate::types::KarmaError;

/// Upper bound for `REDDIT_MAX_RETRIES`
pub const MAX_REDDIT_RETRIES: u32 = 10;

/// Upper bound for `REDDIT_RETRY_DELAY_MS` (one minute)
pub const MAX_REDDIT_RETRY_DELAY_MS: u64 = 60_000;

/// Karmicup - points ledger and engagement verification for Reddit
#[derive(Parser, Debug, Clone)]
#[command(name = "karmicup")]
#[command(about = "Points ledger and Reddit engagement verification service")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Development mode: dev JWT secret, in-memory store fallback
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "karmicup")]
    pub mongodb_db: String,

    /// Secret for validating session tokens (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Token expiry for tokens minted in dev mode
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    #[command(flatten)]
    pub reddit: RedditArgs,

    #[command(flatten)]
    pub ledger: LedgerArgs,
}

/// Reddit API client settings
#[derive(Parser, Debug, Clone)]
pub struct RedditArgs {
    /// Base URL for Reddit's JSON API
    #[arg(long = "reddit-base-url", env = "REDDIT_BASE_URL", default_value = crate::reddit::client::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// User-Agent sent with every Reddit request
    #[arg(long = "reddit-user-agent", env = "REDDIT_USER_AGENT", default_value = crate::reddit::client::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in milliseconds
    #[arg(long = "reddit-timeout-ms", env = "REDDIT_TIMEOUT_MS", default_value = "10000")]
    pub timeout_ms: u64,

    /// Retries after the first attempt
    #[arg(long = "reddit-max-retries", env = "REDDIT_MAX_RETRIES", default_value = "2")]
    pub max_retries: u32,

    /// Linear backoff unit in milliseconds
    #[arg(long = "reddit-retry-delay-ms", env = "REDDIT_RETRY_DELAY_MS", default_value = "500")]
    pub retry_delay_ms: u64,

    /// Ceiling for server-supplied Retry-After, in seconds
    #[arg(long = "reddit-max-retry-after-secs", env = "REDDIT_MAX_RETRY_AFTER_SECS", default_value = "10")]
    pub max_retry_after_secs: u64,
}

/// Ledger tunables
#[derive(Parser, Debug, Clone)]
pub struct LedgerArgs {
    /// Points debited per submission
    #[arg(long, env = "SUBMIT_COST", default_value = "10")]
    pub submit_cost: i64,

    /// Balance granted to new accounts
    #[arg(long, env = "STARTING_POINTS", default_value = "20")]
    pub starting_points: i64,

    /// Top-level comments fetched with a post during verification
    #[arg(long, env = "POST_COMMENT_WINDOW", default_value = "50")]
    pub post_comment_window: u32,

    /// Helper's recent comments fetched during verification
    #[arg(long, env = "USER_COMMENT_WINDOW", default_value = "25")]
    pub user_comment_window: u32,
}

impl Args {
    /// Build the token validator (dev secret when none is configured in dev mode)
    pub fn jwt_validator(&self) -> Result<JwtValidator, KarmaError> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => JwtValidator::new(secret.clone(), self.jwt_expiry_seconds),
            (None, true) => Ok(JwtValidator::new_dev()),
            (None, false) => Err(KarmaError::Config(
                "JWT_SECRET is required in production mode".into(),
            )),
        }
    }

    pub fn reddit_config(&self) -> RedditClientConfig {
        RedditClientConfig {
            base_url: self.reddit.base_url.trim_end_matches('/').to_string(),
            user_agent: self.reddit.user_agent.clone(),
            request_timeout: Duration::from_millis(self.reddit.timeout_ms),
            retry: RetryPolicy {
                max_retries: self.reddit.max_retries,
                retry_delay: Duration::from_millis(self.reddit.retry_delay_ms),
                max_retry_after: Duration::from_secs(self.reddit.max_retry_after_secs),
            },
        }
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            submit_cost: self.ledger.submit_cost,
            starting_points: self.ledger.starting_points,
            post_comment_window: self.ledger.post_comment_window,
            user_comment_window: self.ledger.user_comment_window,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match &self.jwt_secret {
                None => return Err("JWT_SECRET is required in production mode".to_string()),
                Some(s) if s.len() < 32 => {
                    return Err("JWT_SECRET must be at least 32 characters".to_string())
                }
                _ => {}
            }
        }

        if self.ledger.submit_cost <= 0 {
            return Err("SUBMIT_COST must be positive".to_string());
        }

        if self.ledger.starting_points < 0 {
            return Err("STARTING_POINTS must not be negative".to_string());
        }

        // Reddit caps listings at 100
        for (name, window) in [
            ("POST_COMMENT_WINDOW", self.ledger.post_comment_window),
            ("USER_COMMENT_WINDOW", self.ledger.user_comment_window),
        ] {
            if window == 0 || window > 100 {
                return Err(format!("{} must be between 1 and 100", name));
            }
        }

        if self.reddit.max_retries > MAX_REDDIT_RETRIES {
            return Err(format!("REDDIT_MAX_RETRIES must be at most {}", MAX_REDDIT_RETRIES));
        }

        if self.reddit.retry_delay_ms > MAX_REDDIT_RETRY_DELAY_MS {
            return Err(format!(
                "REDDIT_RETRY_DELAY_MS must be at most {}",
                MAX_REDDIT_RETRY_DELAY_MS
            ));
        }

        if !self.reddit.base_url.starts_with("http://") && !self.reddit.base_url.starts_with("https://") {
            return Err("REDDIT_BASE_URL must be an http(s) URL".to_string());
        }

        Ok(())
    }
}
