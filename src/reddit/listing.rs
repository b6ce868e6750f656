//! Typed views over Reddit listing JSON
//!
//! Listing shape: `{ "data": { "children": [{ "kind": "t1", "data": {...} }] } }`.
//! Thread endpoints return a two-element array: the target object's listing
//! followed by its comment tree. A comment's `replies` is either a listing or
//! an empty string.

use serde::Deserialize;
use serde_json::Value;

use super::client::{ContentGateway, GatewayError};
use super::url::ContentTarget;

const COMMENT_KIND: &str = "t1";

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    kind: String,
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct PostData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    ups: Option<i64>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    num_comments: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct CommentData {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    link_id: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    replies: Value,
}

#[derive(Debug, Default, Deserialize)]
struct UserAbout {
    #[serde(default)]
    id: Option<String>,
}

/// A comment as seen in a listing or a user's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditComment {
    pub author: String,
    /// Fullname of the post the comment belongs to (`t3_...`)
    pub link_id: String,
    /// Fullname of the direct parent (`t3_...` for top-level, `t1_...` for replies)
    pub parent_id: String,
}

impl RedditComment {
    pub fn is_authored_by(&self, handle: &str) -> bool {
        self.author.eq_ignore_ascii_case(handle)
    }
}

/// Post state at fetch time
#[derive(Debug, Clone)]
pub struct PostSnapshot {
    pub title: Option<String>,
    pub score: i64,
    pub num_comments: i64,
    /// Newest top-level comments, bounded by the requested window
    pub comments: Vec<RedditComment>,
}

/// Comment state at fetch time
#[derive(Debug, Clone)]
pub struct CommentSnapshot {
    pub score: i64,
    /// Direct replies to the comment
    pub replies: Vec<RedditComment>,
}

impl From<CommentData> for RedditComment {
    fn from(data: CommentData) -> Self {
        Self {
            author: data.author.unwrap_or_default(),
            link_id: data.link_id.unwrap_or_default(),
            parent_id: data.parent_id.unwrap_or_default(),
        }
    }
}

fn parse<T: for<'de> Deserialize<'de>>(value: Value, what: &str) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Malformed(format!("{}: {}", what, e)))
}

/// Keep only real comments (`t1`), dropping "more" placeholders
fn comments_of(listing: Listing<CommentData>) -> Vec<RedditComment> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == COMMENT_KIND)
        .map(|thing| thing.data.into())
        .collect()
}

fn split_thread(value: Value) -> Result<(Value, Value), GatewayError> {
    match value {
        Value::Array(mut parts) if !parts.is_empty() => {
            let comments = if parts.len() > 1 { parts.remove(1) } else { Value::Null };
            let target = parts.remove(0);
            Ok((target, comments))
        }
        _ => Err(GatewayError::Malformed("thread response is not a listing pair".into())),
    }
}

/// Fetch a post with its newest top-level comments
pub async fn fetch_post(
    gateway: &dyn ContentGateway,
    target: &ContentTarget,
    limit: u32,
) -> Result<PostSnapshot, GatewayError> {
    let path = ContentTarget {
        comment_id: None,
        ..target.clone()
    }
    .thread_path(limit);
    let (post_part, comments_part) = split_thread(gateway.get_json(&path).await?)?;

    let post_listing: Listing<PostData> = parse(post_part, "post listing")?;
    let post = post_listing
        .data
        .children
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Malformed("post data missing".into()))?
        .data;

    let comments = if comments_part.is_null() {
        Vec::new()
    } else {
        comments_of(parse(comments_part, "comment listing")?)
    };

    Ok(PostSnapshot {
        title: post.title.filter(|t| !t.trim().is_empty()),
        score: post.ups.or(post.score).unwrap_or(0),
        num_comments: post.num_comments.unwrap_or(0),
        comments,
    })
}

/// Fetch a specific comment with its direct replies
pub async fn fetch_comment(
    gateway: &dyn ContentGateway,
    target: &ContentTarget,
    limit: u32,
) -> Result<CommentSnapshot, GatewayError> {
    if target.comment_id.is_none() {
        return Err(GatewayError::Malformed("target does not name a comment".into()));
    }

    let (_, comments_part) = split_thread(gateway.get_json(&target.thread_path(limit)).await?)?;
    let listing: Listing<CommentData> = parse(comments_part, "comment listing")?;

    let node = listing
        .data
        .children
        .into_iter()
        .next()
        .filter(|thing| thing.kind == COMMENT_KIND)
        .ok_or_else(|| GatewayError::Malformed("could not read comment data".into()))?
        .data;

    // `replies` is "" when there are none
    let replies = match node.replies {
        Value::Object(_) => comments_of(parse(node.replies, "reply listing")?),
        _ => Vec::new(),
    };

    Ok(CommentSnapshot {
        score: node.score.unwrap_or(0),
        replies,
    })
}

/// Fetch a user's most recent comments across Reddit
pub async fn fetch_user_comments(
    gateway: &dyn ContentGateway,
    username: &str,
    limit: u32,
) -> Result<Vec<RedditComment>, GatewayError> {
    let path = format!("/user/{}/comments.json?sort=new&limit={}", username, limit);
    let listing: Listing<CommentData> = parse(gateway.get_json(&path).await?, "user comments")?;
    Ok(comments_of(listing))
}

/// Look up a user's Reddit account id; `None` if the response carries none
pub async fn fetch_user_id(
    gateway: &dyn ContentGateway,
    username: &str,
) -> Result<Option<String>, GatewayError> {
    let path = format!("/user/{}/about.json", username);
    let value = gateway.get_json(&path).await?;
    let about = value
        .get("data")
        .cloned()
        .map(|data| parse::<UserAbout>(data, "user about"))
        .transpose()?
        .unwrap_or_default();
    Ok(about.id.filter(|id| !id.is_empty()))
}
