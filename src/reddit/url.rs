//! Reddit URL resolution
//!
//! Accepted shapes:
//!
//! ```text
//! https://reddit.com/r/{sub}/comments/{post_id}
//! https://www.reddit.com/r/{sub}/comments/{post_id}/{slug}/
//! https://old.reddit.com/r/{sub}/comments/{post_id}/{slug}/{comment_id}/
//! ```
//!
//! Query strings and fragments are ignored.

use url::Url;

const ALLOWED_HOSTS: &[&str] = &["reddit.com", "www.reddit.com", "old.reddit.com"];

/// A post or a specific comment on Reddit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTarget {
    pub subreddit: String,
    pub post_id: String,
    pub comment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("not a valid URL")]
    Unparseable,

    #[error("URL must use http or https")]
    UnsupportedScheme,

    #[error("URL must point at reddit.com, got {0}")]
    UnsupportedHost(String),

    #[error("URL must link to a post or comment (/r/{{sub}}/comments/{{id}}/...)")]
    UnsupportedPath,
}

impl ContentTarget {
    /// Parse a Reddit post or comment URL
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let url = Url::parse(raw.trim()).map_err(|_| UrlError::Unparseable)?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::UnsupportedScheme);
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if !ALLOWED_HOSTS.contains(&host.as_str()) {
            return Err(UrlError::UnsupportedHost(host));
        }

        let mut segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();

        // At most one trailing slash
        if segments.last() == Some(&"") {
            segments.pop();
        }

        let (subreddit, post_id, rest) = match segments.as_slice() {
            ["r", sub, "comments", id, rest @ ..] => (*sub, *id, rest),
            _ => return Err(UrlError::UnsupportedPath),
        };

        if subreddit.is_empty() || !is_reddit_id(post_id) {
            return Err(UrlError::UnsupportedPath);
        }

        let comment_id = match rest {
            [] | [_] => None,
            [_, comment] if is_reddit_id(comment) => Some(comment.to_string()),
            _ => return Err(UrlError::UnsupportedPath),
        };

        Ok(Self {
            subreddit: subreddit.to_string(),
            post_id: post_id.to_string(),
            comment_id,
        })
    }

    /// Whether this target names a specific comment rather than a post
    pub fn is_comment(&self) -> bool {
        self.comment_id.is_some()
    }

    /// Reddit fullname of the post (`t3_...`)
    pub fn post_fullname(&self) -> String {
        format!("t3_{}", self.post_id)
    }

    /// Reddit fullname of the target object: the comment if named, else the post
    pub fn fullname(&self) -> String {
        match &self.comment_id {
            Some(comment_id) => format!("t1_{}", comment_id),
            None => self.post_fullname(),
        }
    }

    /// Listing path for the post thread, or for the comment and its replies
    pub fn thread_path(&self, limit: u32) -> String {
        match &self.comment_id {
            Some(comment_id) => format!(
                "/r/{}/comments/{}/_/{}.json?sort=new&limit={}",
                self.subreddit, self.post_id, comment_id, limit
            ),
            None => format!(
                "/r/{}/comments/{}.json?sort=new&limit={}",
                self.subreddit, self.post_id, limit
            ),
        }
    }
}

fn is_reddit_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url() {
        let target = ContentTarget::parse("https://www.reddit.com/r/rust/comments/abc123/my_post/").unwrap();
        assert_eq!(target.subreddit, "rust");
        assert_eq!(target.post_id, "abc123");
        assert_eq!(target.comment_id, None);
        assert_eq!(target.fullname(), "t3_abc123");
    }

    #[test]
    fn test_bare_post_url() {
        let target = ContentTarget::parse("https://reddit.com/r/webdev/comments/abc123").unwrap();
        assert_eq!(target.post_id, "abc123");
        assert!(!target.is_comment());
    }

    #[test]
    fn test_comment_url() {
        let target =
            ContentTarget::parse("https://old.reddit.com/r/rust/comments/abc123/title/def456/").unwrap();
        assert_eq!(target.comment_id.as_deref(), Some("def456"));
        assert_eq!(target.fullname(), "t1_def456");
        assert_eq!(target.post_fullname(), "t3_abc123");
        assert_eq!(
            target.thread_path(50),
            "/r/rust/comments/abc123/_/def456.json?sort=new&limit=50"
        );
    }

    #[test]
    fn test_query_string_is_ignored() {
        let target =
            ContentTarget::parse("https://www.reddit.com/r/rust/comments/abc123/title/?utm_source=share").unwrap();
        assert_eq!(target.post_id, "abc123");
        assert_eq!(target.comment_id, None);
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert_eq!(
            ContentTarget::parse("https://evil.example.com/r/rust/comments/abc123"),
            Err(UrlError::UnsupportedHost("evil.example.com".into()))
        );
        assert!(ContentTarget::parse("https://np.reddit.com/r/rust/comments/abc123").is_err());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(ContentTarget::parse("not a url"), Err(UrlError::Unparseable));
        assert_eq!(
            ContentTarget::parse("ftp://reddit.com/r/rust/comments/abc123"),
            Err(UrlError::UnsupportedScheme)
        );
        assert_eq!(
            ContentTarget::parse("https://reddit.com/r/rust/"),
            Err(UrlError::UnsupportedPath)
        );
        assert_eq!(
            ContentTarget::parse("https://reddit.com/user/someone/comments/abc123"),
            Err(UrlError::UnsupportedPath)
        );
        assert_eq!(
            ContentTarget::parse("https://reddit.com/r/rust/comments/abc-123"),
            Err(UrlError::UnsupportedPath)
        );
        assert_eq!(
            ContentTarget::parse("https://reddit.com/r/rust/comments/abc123/title/def456/extra"),
            Err(UrlError::UnsupportedPath)
        );
    }
}
