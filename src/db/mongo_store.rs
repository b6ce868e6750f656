//! MongoDB-backed ledger store

use async_trait::async_trait;
use bson::doc;
use tracing::debug;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    AccountDoc, InteractionDoc, LinkedIdentityDoc, SubmissionDoc, SubmissionStatus,
    ACCOUNT_COLLECTION, INTERACTION_COLLECTION, LINKED_IDENTITY_COLLECTION, SUBMISSION_COLLECTION,
};
use crate::db::store::{LedgerStore, SubmissionQuery};
use crate::types::Result;

#[derive(Clone)]
pub struct MongoStore {
    accounts: MongoCollection<AccountDoc>,
    identities: MongoCollection<LinkedIdentityDoc>,
    submissions: MongoCollection<SubmissionDoc>,
    interactions: MongoCollection<InteractionDoc>,
}

impl MongoStore {
    /// Open all ledger collections, creating indexes as needed
    pub async fn open(client: &MongoClient) -> Result<Self> {
        let store = Self {
            accounts: client.collection(ACCOUNT_COLLECTION).await?,
            identities: client.collection(LINKED_IDENTITY_COLLECTION).await?,
            submissions: client.collection(SUBMISSION_COLLECTION).await?,
            interactions: client.collection(INTERACTION_COLLECTION).await?,
        };
        debug!("Ledger collections ready");
        Ok(store)
    }
}

#[async_trait]
impl LedgerStore for MongoStore {
    async fn get_account(&self, user_id: &str) -> Result<Option<AccountDoc>> {
        self.accounts.find_one(doc! { "user_id": user_id }).await
    }

    async fn put_account(&self, account: AccountDoc) -> Result<()> {
        let filter = doc! { "user_id": account.user_id.as_str() };
        self.accounts.upsert_one(filter, account).await
    }

    async fn get_linked_identity(&self, user_id: &str) -> Result<Option<LinkedIdentityDoc>> {
        self.identities.find_one(doc! { "user_id": user_id }).await
    }

    async fn put_linked_identity(&self, identity: LinkedIdentityDoc) -> Result<()> {
        let filter = doc! { "user_id": identity.user_id.as_str() };
        self.identities.upsert_one(filter, identity).await
    }

    async fn get_submission(&self, submission_id: &str) -> Result<Option<SubmissionDoc>> {
        self.submissions
            .find_one(doc! { "submission_id": submission_id })
            .await
    }

    async fn put_submission(&self, submission: SubmissionDoc) -> Result<()> {
        let filter = doc! { "submission_id": submission.submission_id.as_str() };
        self.submissions.upsert_one(filter, submission).await
    }

    async fn list_submissions(&self, query: SubmissionQuery) -> Result<Vec<SubmissionDoc>> {
        let filter = match query {
            SubmissionQuery::OwnedBy(owner) => doc! { "owner_id": owner },
            SubmissionQuery::ActiveNotOwnedBy(viewer) => doc! {
                "status": SubmissionStatus::Active.as_str(),
                "owner_id": { "$ne": viewer },
            },
        };
        self.submissions
            .find_many(filter, doc! { "metadata.created_at": -1 })
            .await
    }

    async fn get_interaction(
        &self,
        helper_id: &str,
        submission_id: &str,
    ) -> Result<Option<InteractionDoc>> {
        self.interactions
            .find_one(doc! { "user_id": helper_id, "submission_id": submission_id })
            .await
    }

    async fn put_interaction(&self, interaction: InteractionDoc) -> Result<()> {
        let filter = doc! {
            "user_id": interaction.helper_id.as_str(),
            "submission_id": interaction.submission_id.as_str(),
        };
        self.interactions.upsert_one(filter, interaction).await
    }

    async fn list_interactions(&self, helper_id: &str) -> Result<Vec<InteractionDoc>> {
        self.interactions
            .find_many(doc! { "user_id": helper_id }, doc! {})
            .await
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
