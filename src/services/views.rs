//! Read models
//!
//! Recomputed from the ledger on every request. Clients may cache these, but
//! a cached copy is never used as the precondition of a mutation.

use serde::Serialize;
use std::collections::HashMap;

use crate::db::schemas::{Interaction, MetricsBaseline, SubmissionDoc, SubmissionKind, SubmissionStatus};
use crate::db::{LedgerStore, SubmissionQuery};
use crate::types::{KarmaError, Result};

/// A submission as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: SubmissionKind,
    pub subreddit: String,
    pub title: String,
    pub reddit_url: String,
    pub context: Option<String>,
    pub reddit_metrics: MetricsBaseline,
    pub upvotes_received: i64,
    pub comments_received: i64,
    pub status: SubmissionStatus,
    pub created_at: Option<String>,
}

impl From<SubmissionDoc> for SubmissionView {
    fn from(doc: SubmissionDoc) -> Self {
        Self {
            created_at: doc.metadata.created_at_utc().map(|t| t.to_rfc3339()),
            id: doc.submission_id,
            user_id: doc.owner_id,
            kind: doc.kind,
            subreddit: doc.subreddit,
            title: doc.title,
            reddit_url: doc.reddit_url,
            context: doc.context,
            reddit_metrics: doc.metrics,
            upvotes_received: doc.upvotes_received,
            comments_received: doc.comments_received,
            status: doc.status,
        }
    }
}

/// Feed entry: a submission plus who posted it and what the viewer has done
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub submission: SubmissionView,
    pub reddit_username: Option<String>,
    pub interaction: Option<Interaction>,
}

/// The caller's own summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub points: i64,
    pub reddit_username: Option<String>,
    pub onboarded: bool,
}

pub async fn my_submissions(store: &dyn LedgerStore, user_id: &str) -> Result<Vec<SubmissionView>> {
    let docs = store
        .list_submissions(SubmissionQuery::OwnedBy(user_id.to_string()))
        .await?;
    Ok(docs.into_iter().map(SubmissionView::from).collect())
}

pub async fn feed(store: &dyn LedgerStore, user_id: &str) -> Result<Vec<FeedItem>> {
    let docs = store
        .list_submissions(SubmissionQuery::ActiveNotOwnedBy(user_id.to_string()))
        .await?;

    let interactions: HashMap<String, Interaction> = store
        .list_interactions(user_id)
        .await?
        .into_iter()
        .map(|r| (r.submission_id, r.interaction))
        .collect();

    let mut usernames: HashMap<String, Option<String>> = HashMap::new();
    let mut items = Vec::with_capacity(docs.len());
    for doc in docs {
        if !usernames.contains_key(&doc.owner_id) {
            let username = store
                .get_linked_identity(&doc.owner_id)
                .await?
                .map(|i| i.username);
            usernames.insert(doc.owner_id.clone(), username);
        }
        let reddit_username = usernames.get(&doc.owner_id).cloned().flatten();
        let interaction = interactions.get(&doc.submission_id).copied();
        items.push(FeedItem {
            submission: doc.into(),
            reddit_username,
            interaction,
        });
    }

    Ok(items)
}

pub async fn me(store: &dyn LedgerStore, user_id: &str) -> Result<MeView> {
    let account = store
        .get_account(user_id)
        .await?
        .ok_or_else(|| KarmaError::NotFound("User not found".into()))?;
    let reddit_username = store
        .get_linked_identity(user_id)
        .await?
        .map(|i| i.username);

    Ok(MeView {
        id: account.user_id,
        email: account.email,
        name: account.name,
        points: account.points,
        onboarded: reddit_username.is_some(),
        reddit_username,
    })
}
