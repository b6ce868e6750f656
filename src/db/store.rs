//! Ledger storage seam
//!
//! Services only talk to storage through [`LedgerStore`]. Every `put` is a
//! whole-document upsert keyed by the entity's natural key; there are no
//! multi-document transactions, so callers order their writes.

use async_trait::async_trait;

use crate::db::schemas::{AccountDoc, InteractionDoc, LinkedIdentityDoc, SubmissionDoc, SubmissionStatus};
use crate::types::Result;

/// Which submissions to list. Results are always newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionQuery {
    /// Everything a member owns, any status
    OwnedBy(String),
    /// The community feed as seen by a member
    ActiveNotOwnedBy(String),
}

impl SubmissionQuery {
    pub fn matches(&self, doc: &SubmissionDoc) -> bool {
        match self {
            Self::OwnedBy(owner) => doc.owner_id == *owner,
            Self::ActiveNotOwnedBy(viewer) => {
                doc.status == SubmissionStatus::Active && doc.owner_id != *viewer
            }
        }
    }
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_account(&self, user_id: &str) -> Result<Option<AccountDoc>>;
    async fn put_account(&self, account: AccountDoc) -> Result<()>;

    async fn get_linked_identity(&self, user_id: &str) -> Result<Option<LinkedIdentityDoc>>;
    async fn put_linked_identity(&self, identity: LinkedIdentityDoc) -> Result<()>;

    async fn get_submission(&self, submission_id: &str) -> Result<Option<SubmissionDoc>>;
    async fn put_submission(&self, submission: SubmissionDoc) -> Result<()>;
    async fn list_submissions(&self, query: SubmissionQuery) -> Result<Vec<SubmissionDoc>>;

    async fn get_interaction(
        &self,
        helper_id: &str,
        submission_id: &str,
    ) -> Result<Option<InteractionDoc>>;
    async fn put_interaction(&self, interaction: InteractionDoc) -> Result<()>;
    async fn list_interactions(&self, helper_id: &str) -> Result<Vec<InteractionDoc>>;

    /// Human-readable backend name for startup logs
    fn backend_name(&self) -> &'static str;
}
