//! Reddit read API access
//!
//! - `url`: resolves submitted Reddit links into a [`ContentTarget`]
//! - `client`: the [`ContentGateway`] seam and its reqwest-backed implementation
//!   with bounded retries and rate-limit handling
//! - `listing`: typed snapshots (post, comment, user history) parsed from the
//!   raw listing JSON

pub mod client;
pub mod listing;
pub mod url;

pub use client::{ContentGateway, GatewayError, RedditClient, RedditClientConfig, RetryPolicy};
pub use listing::{
    fetch_comment, fetch_post, fetch_user_comments, fetch_user_id, CommentSnapshot, PostSnapshot,
    RedditComment,
};
pub use self::url::{ContentTarget, UrlError};
