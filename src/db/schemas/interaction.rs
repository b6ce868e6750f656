//! Interaction record schema
//!
//! One per (helper, submission) pair. Records which actions have already been
//! credited so a helper is paid at most once per action type.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for interaction records
pub const INTERACTION_COLLECTION: &str = "user_submission_interactions";

/// Credited action(s) on a submission
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    Upvote,
    Comment,
    Both,
}

impl Interaction {
    /// Combine detection flags; `None` if nothing was detected
    pub fn from_flags(upvote: bool, comment: bool) -> Option<Self> {
        match (upvote, comment) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Upvote),
            (false, true) => Some(Self::Comment),
            (false, false) => None,
        }
    }

    pub fn includes_upvote(&self) -> bool {
        matches!(self, Self::Upvote | Self::Both)
    }

    pub fn includes_comment(&self) -> bool {
        matches!(self, Self::Comment | Self::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Comment => "comment",
            Self::Both => "both",
        }
    }
}

/// Credited state for one (helper, submission) pair
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InteractionDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Helper account
    #[serde(rename = "user_id")]
    pub helper_id: String,

    pub submission_id: String,

    pub interaction: Interaction,
}

impl InteractionDoc {
    pub fn new(helper_id: String, submission_id: String, interaction: Interaction) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            helper_id,
            submission_id,
            interaction,
        }
    }
}

impl IntoIndexes for InteractionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1, "submission_id": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("helper_submission_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for InteractionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
