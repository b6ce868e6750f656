//! Shared fixtures: a scripted Reddit and a store with injectable write failures

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use karmicup::db::schemas::{AccountDoc, InteractionDoc, LinkedIdentityDoc, SubmissionDoc};
use karmicup::db::{LedgerStore, MemoryStore, SubmissionQuery};
use karmicup::reddit::{ContentGateway, GatewayError};
use karmicup::KarmaError;

pub const POST_URL: &str = "https://www.reddit.com/r/rust/comments/abc123/hello_world/";
pub const POST_FULLNAME: &str = "t3_abc123";

// =============================================================================
// Scripted Reddit
// =============================================================================

#[derive(Default)]
struct RedditState {
    title: String,
    score: i64,
    num_comments: i64,
    /// Top-level comment authors, oldest first
    comment_authors: Vec<String>,
    /// username -> (author, parent_id) pairs
    histories: HashMap<String, Vec<(String, String)>>,
    failure: Option<GatewayError>,
    /// Failure for `/user/...` requests only
    user_failure: Option<GatewayError>,
}

/// In-memory stand-in for one Reddit post and its commenters
pub struct FakeReddit {
    state: Mutex<RedditState>,
    calls: AtomicUsize,
}

impl FakeReddit {
    pub fn new(title: &str) -> Self {
        Self {
            state: Mutex::new(RedditState {
                title: title.to_string(),
                ..RedditState::default()
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_score(&self, score: i64) {
        self.state.lock().unwrap().score = score;
    }

    /// A top-level comment that shows up in both the listing and the author's history
    pub fn comment(&self, author: &str) {
        let mut state = self.state.lock().unwrap();
        state.comment_authors.push(author.to_string());
        state.num_comments += 1;
        state
            .histories
            .entry(author.to_lowercase())
            .or_default()
            .push((author.to_string(), POST_FULLNAME.to_string()));
    }

    /// A comment visible only in the author's own history (listing lag)
    pub fn comment_history_only(&self, author: &str, parent_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .histories
            .entry(author.to_lowercase())
            .or_default()
            .push((author.to_string(), parent_id.to_string()));
    }

    /// Every subsequent request fails with `err`
    pub fn fail_with(&self, err: GatewayError) {
        self.state.lock().unwrap().failure = Some(err);
    }

    /// Requests under `/user/` fail with `err`; the thread still loads
    pub fn fail_user_requests(&self, err: GatewayError) {
        self.state.lock().unwrap().user_failure = Some(err);
    }

    pub fn recover(&self) {
        let mut state = self.state.lock().unwrap();
        state.failure = None;
        state.user_failure = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn thread_json(state: &RedditState) -> Value {
        let comments: Vec<Value> = state
            .comment_authors
            .iter()
            .rev()
            .map(|author| {
                json!({ "kind": "t1", "data": {
                    "author": author,
                    "link_id": POST_FULLNAME,
                    "parent_id": POST_FULLNAME,
                    "replies": ""
                } })
            })
            .collect();

        json!([
            { "kind": "Listing", "data": { "children": [
                { "kind": "t3", "data": {
                    "title": state.title,
                    "ups": state.score,
                    "score": state.score,
                    "num_comments": state.num_comments
                } }
            ] } },
            { "kind": "Listing", "data": { "children": comments } }
        ])
    }

    fn history_json(state: &RedditState, username: &str) -> Value {
        let children: Vec<Value> = state
            .histories
            .get(&username.to_lowercase())
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .map(|(author, parent)| {
                        json!({ "kind": "t1", "data": {
                            "author": author,
                            "link_id": POST_FULLNAME,
                            "parent_id": parent,
                            "replies": ""
                        } })
                    })
                    .collect()
            })
            .unwrap_or_default();

        json!({ "kind": "Listing", "data": { "children": children } })
    }
}

#[async_trait]
impl ContentGateway for FakeReddit {
    async fn get_json(&self, path: &str) -> Result<Value, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();

        if let Some(err) = &state.failure {
            return Err(err.clone());
        }

        if let Some(rest) = path.strip_prefix("/user/") {
            if let Some(err) = &state.user_failure {
                return Err(err.clone());
            }
            let username = rest.split('/').next().unwrap_or_default();
            if rest.contains("/about.json") {
                return Ok(json!({ "kind": "t2", "data": { "id": format!("id_{}", username) } }));
            }
            return Ok(Self::history_json(&state, username));
        }

        if path.starts_with("/r/rust/comments/abc123") {
            return Ok(Self::thread_json(&state));
        }

        Err(GatewayError::ClientError {
            status: 404,
            message: "Not Found".into(),
        })
    }
}

// =============================================================================
// Store with injectable failures
// =============================================================================

/// Wraps a [`MemoryStore`]; selected writes can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_submission_puts: AtomicBool,
    pub fail_interaction_puts: AtomicBool,
    /// Scripted outcomes for upcoming account writes (`true` = fail)
    pub account_put_script: Mutex<VecDeque<bool>>,
    pub account_puts: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_account_puts(&self, outcomes: &[bool]) {
        self.account_put_script
            .lock()
            .unwrap()
            .extend(outcomes.iter().copied());
    }
}

fn injected(what: &str) -> KarmaError {
    KarmaError::Database(format!("injected {} failure", what))
}

#[async_trait]
impl LedgerStore for FlakyStore {
    async fn get_account(&self, user_id: &str) -> karmicup::Result<Option<AccountDoc>> {
        self.inner.get_account(user_id).await
    }

    async fn put_account(&self, account: AccountDoc) -> karmicup::Result<()> {
        self.account_puts.fetch_add(1, Ordering::SeqCst);
        let fail = self.account_put_script.lock().unwrap().pop_front().unwrap_or(false);
        if fail {
            return Err(injected("account"));
        }
        self.inner.put_account(account).await
    }

    async fn get_linked_identity(&self, user_id: &str) -> karmicup::Result<Option<LinkedIdentityDoc>> {
        self.inner.get_linked_identity(user_id).await
    }

    async fn put_linked_identity(&self, identity: LinkedIdentityDoc) -> karmicup::Result<()> {
        self.inner.put_linked_identity(identity).await
    }

    async fn get_submission(&self, submission_id: &str) -> karmicup::Result<Option<SubmissionDoc>> {
        self.inner.get_submission(submission_id).await
    }

    async fn put_submission(&self, submission: SubmissionDoc) -> karmicup::Result<()> {
        if self.fail_submission_puts.load(Ordering::SeqCst) {
            return Err(injected("submission"));
        }
        self.inner.put_submission(submission).await
    }

    async fn list_submissions(&self, query: SubmissionQuery) -> karmicup::Result<Vec<SubmissionDoc>> {
        self.inner.list_submissions(query).await
    }

    async fn get_interaction(
        &self,
        helper_id: &str,
        submission_id: &str,
    ) -> karmicup::Result<Option<InteractionDoc>> {
        self.inner.get_interaction(helper_id, submission_id).await
    }

    async fn put_interaction(&self, interaction: InteractionDoc) -> karmicup::Result<()> {
        if self.fail_interaction_puts.load(Ordering::SeqCst) {
            return Err(injected("interaction"));
        }
        self.inner.put_interaction(interaction).await
    }

    async fn list_interactions(&self, helper_id: &str) -> karmicup::Result<Vec<InteractionDoc>> {
        self.inner.list_interactions(helper_id).await
    }

    fn backend_name(&self) -> &'static str {
        "flaky-memory"
    }
}

// =============================================================================
// Seeding helpers
// =============================================================================

pub async fn seed_member(
    store: &dyn LedgerStore,
    user_id: &str,
    points: i64,
    reddit_username: Option<&str>,
) {
    store
        .put_account(AccountDoc::new(user_id.to_string(), None, None, points))
        .await
        .unwrap();
    if let Some(username) = reddit_username {
        store
            .put_linked_identity(LinkedIdentityDoc::new(
                user_id.to_string(),
                username.to_string(),
                format!("id_{}", username),
            ))
            .await
            .unwrap();
    }
}

pub async fn balance(store: &dyn LedgerStore, user_id: &str) -> i64 {
    store.get_account(user_id).await.unwrap().unwrap().points
}
