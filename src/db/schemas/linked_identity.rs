//! Linked Reddit identity schema
//!
//! At most one per account. Written by the onboarding/settings flows only.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for linked Reddit accounts
pub const LINKED_IDENTITY_COLLECTION: &str = "reddit_accounts";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LinkedIdentityDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owning account
    pub user_id: String,

    /// Reddit username, without the `u/` prefix
    pub username: String,

    /// Reddit's own account id, as returned by `about.json`
    pub reddit_user_id: String,
}

impl LinkedIdentityDoc {
    pub fn new(user_id: String, username: String, reddit_user_id: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            user_id,
            username,
            reddit_user_id,
        }
    }
}

impl IntoIndexes for LinkedIdentityDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "user_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("user_id_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "username": 1 },
                Some(
                    IndexOptions::builder()
                        .name("username_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for LinkedIdentityDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
