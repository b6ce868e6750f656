//! Submission document schema
//!
//! A Reddit post or comment a member has paid to get engagement on.
//! `metrics` is the baseline the verification engine compares fresh Reddit
//! state against; the `*_received` counters count credited helpers, not raw
//! Reddit numbers.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for submissions
pub const SUBMISSION_COLLECTION: &str = "user_submissions";

/// What the submitted link points at
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    #[default]
    Post,
    Comment,
}

impl SubmissionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(Self::Post),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

/// Feed visibility
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Active,
    Completed,
}

impl SubmissionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Reddit numbers as of the last credited verification
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsBaseline {
    /// Advanced by exactly one per credited upvote
    pub upvotes: i64,
    /// Set to the fresh comment count on each credited comment
    pub comments: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SubmissionDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata; `created_at` is the submission time
    #[serde(default)]
    pub metadata: Metadata,

    /// Public id (UUID v4)
    pub submission_id: String,

    /// Account that paid for the submission
    pub owner_id: String,

    #[serde(rename = "type", default)]
    pub kind: SubmissionKind,

    pub subreddit: String,

    /// Title as reported by Reddit at submission time
    pub title: String,

    pub reddit_url: String,

    /// Optional instructions for helpers
    #[serde(default)]
    pub context: Option<String>,

    #[serde(default, rename = "reddit_metrics")]
    pub metrics: MetricsBaseline,

    #[serde(default)]
    pub upvotes_received: i64,

    #[serde(default)]
    pub comments_received: i64,

    #[serde(default)]
    pub status: SubmissionStatus,
}

impl SubmissionDoc {
    /// A fresh, active submission with a zero baseline
    pub fn new(
        owner_id: String,
        kind: SubmissionKind,
        subreddit: String,
        title: String,
        reddit_url: String,
        context: Option<String>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            submission_id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            kind,
            subreddit,
            title,
            reddit_url,
            context,
            metrics: MetricsBaseline::default(),
            upvotes_received: 0,
            comments_received: 0,
            status: SubmissionStatus::Active,
        }
    }
}

impl IntoIndexes for SubmissionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "submission_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("submission_id_unique".to_string())
                        .build(),
                ),
            ),
            // "My submissions" view
            (
                doc! { "owner_id": 1, "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("owner_created_index".to_string())
                        .build(),
                ),
            ),
            // Community feed
            (
                doc! { "status": 1, "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("status_created_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for SubmissionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
