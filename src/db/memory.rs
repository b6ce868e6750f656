//! In-process ledger store
//!
//! Backs dev mode when MongoDB is unavailable, and every service test.
//! Data lives only as long as the process.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::db::mongo::MutMetadata;
use crate::db::schemas::{AccountDoc, InteractionDoc, LinkedIdentityDoc, SubmissionDoc};
use crate::db::store::{LedgerStore, SubmissionQuery};
use crate::types::Result;

#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<String, AccountDoc>,
    identities: DashMap<String, LinkedIdentityDoc>,
    submissions: DashMap<String, SubmissionDoc>,
    interactions: DashMap<(String, String), InteractionDoc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stamp metadata, keeping the creation time of any existing entry
fn stamped<T: MutMetadata + Clone>(mut item: T, existing: Option<&T>) -> T {
    if let Some(prev) = existing {
        let created = prev.clone().mut_metadata().created_at;
        if created.is_some() {
            item.mut_metadata().created_at = created;
        }
    }
    item.mut_metadata().stamp();
    item
}

fn newest_first(docs: &mut [SubmissionDoc]) {
    docs.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_account(&self, user_id: &str) -> Result<Option<AccountDoc>> {
        Ok(self.accounts.get(user_id).map(|e| e.value().clone()))
    }

    async fn put_account(&self, account: AccountDoc) -> Result<()> {
        let key = account.user_id.clone();
        let doc = stamped(account, self.accounts.get(&key).as_deref());
        self.accounts.insert(key, doc);
        Ok(())
    }

    async fn get_linked_identity(&self, user_id: &str) -> Result<Option<LinkedIdentityDoc>> {
        Ok(self.identities.get(user_id).map(|e| e.value().clone()))
    }

    async fn put_linked_identity(&self, identity: LinkedIdentityDoc) -> Result<()> {
        let key = identity.user_id.clone();
        let doc = stamped(identity, self.identities.get(&key).as_deref());
        self.identities.insert(key, doc);
        Ok(())
    }

    async fn get_submission(&self, submission_id: &str) -> Result<Option<SubmissionDoc>> {
        Ok(self.submissions.get(submission_id).map(|e| e.value().clone()))
    }

    async fn put_submission(&self, submission: SubmissionDoc) -> Result<()> {
        let key = submission.submission_id.clone();
        let doc = stamped(submission, self.submissions.get(&key).as_deref());
        self.submissions.insert(key, doc);
        Ok(())
    }

    async fn list_submissions(&self, query: SubmissionQuery) -> Result<Vec<SubmissionDoc>> {
        let mut docs: Vec<SubmissionDoc> = self
            .submissions
            .iter()
            .filter(|e| query.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        newest_first(&mut docs);
        Ok(docs)
    }

    async fn get_interaction(
        &self,
        helper_id: &str,
        submission_id: &str,
    ) -> Result<Option<InteractionDoc>> {
        let key = (helper_id.to_string(), submission_id.to_string());
        Ok(self.interactions.get(&key).map(|e| e.value().clone()))
    }

    async fn put_interaction(&self, interaction: InteractionDoc) -> Result<()> {
        let key = (
            interaction.helper_id.clone(),
            interaction.submission_id.clone(),
        );
        let doc = stamped(interaction, self.interactions.get(&key).as_deref());
        self.interactions.insert(key, doc);
        Ok(())
    }

    async fn list_interactions(&self, helper_id: &str) -> Result<Vec<InteractionDoc>> {
        Ok(self
            .interactions
            .iter()
            .filter(|e| e.value().helper_id == helper_id)
            .map(|e| e.value().clone())
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
