//! Submission intake
//!
//! Debit first, then persist. If persisting fails the debit is written back,
//! retrying a bounded number of times. There is no transaction underneath, so
//! a balance change by another request between the debit and the compensation
//! can be overwritten.

use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::db::schemas::{AccountDoc, SubmissionDoc, SubmissionKind};
use crate::db::LedgerStore;
use crate::reddit::{fetch_post, ContentGateway, ContentTarget};
use crate::services::points::LedgerConfig;
use crate::types::{KarmaError, Result};

/// Attempts made to restore a debit before giving up
const COMPENSATION_ATTEMPTS: u32 = 3;
const COMPENSATION_DELAY: Duration = Duration::from_millis(100);

/// Body of a submission request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSubmission {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

/// Validated submission request
#[derive(Debug, Clone)]
struct Intake {
    url: String,
    kind: SubmissionKind,
    target: ContentTarget,
    context: Option<String>,
}

impl NewSubmission {
    fn validate(self) -> Result<Intake> {
        let (url, kind) = match (self.url, self.kind) {
            (Some(url), Some(kind)) if !url.trim().is_empty() && !kind.is_empty() => (url, kind),
            _ => return Err(KarmaError::Validation("URL and type are required".into())),
        };

        let kind = SubmissionKind::parse(&kind)
            .ok_or_else(|| KarmaError::Validation("Type must be 'post' or 'comment'".into()))?;

        let target = ContentTarget::parse(&url).map_err(|_| {
            KarmaError::Validation(
                "Invalid Reddit URL. Must link to a post or comment on reddit.com.".into(),
            )
        })?;

        match (kind, target.is_comment()) {
            (SubmissionKind::Comment, false) => {
                return Err(KarmaError::Validation(
                    "Comment submissions must link to a specific comment.".into(),
                ))
            }
            (SubmissionKind::Post, true) => {
                return Err(KarmaError::Validation(
                    "Post submissions must link to the post, not a comment.".into(),
                ))
            }
            _ => {}
        }

        let context = self
            .context
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Intake {
            url: url.trim().to_string(),
            kind,
            target,
            context,
        })
    }
}

/// Create a submission, paying `config.submit_cost` from the requester's balance.
///
/// Returns the stored submission and the requester's new balance.
pub async fn create_submission(
    store: &dyn LedgerStore,
    gateway: &dyn ContentGateway,
    config: &LedgerConfig,
    requester: &str,
    request: NewSubmission,
) -> Result<(SubmissionDoc, i64)> {
    let intake = request.validate()?;

    let account = store
        .get_account(requester)
        .await?
        .ok_or_else(|| KarmaError::NotFound("User not found".into()))?;

    if account.points < config.submit_cost {
        return Err(KarmaError::InsufficientBalance {
            required: config.submit_cost,
        });
    }

    let post = fetch_post(gateway, &intake.target, 1)
        .await
        .map_err(|e| KarmaError::from_gateway(e, "Reddit post"))?;
    let title = post
        .title
        .ok_or_else(|| KarmaError::Unverifiable("Could not read post data".into()))?;

    let original_balance = account.points;
    let new_balance = original_balance - config.submit_cost;
    let mut debited = account.clone();
    debited.points = new_balance;
    store.put_account(debited).await.map_err(|e| {
        error!(user_id = %requester, error = %e, "Failed to deduct points");
        e
    })?;

    let submission = SubmissionDoc::new(
        requester.to_string(),
        intake.kind,
        intake.target.subreddit.clone(),
        title,
        intake.url,
        intake.context,
    );

    if let Err(e) = store.put_submission(submission.clone()).await {
        error!(user_id = %requester, error = %e, "Failed to persist submission, restoring points");
        restore_balance(store, account).await;
        return Err(e);
    }

    info!(
        user_id = %requester,
        submission_id = %submission.submission_id,
        kind = intake.kind.as_str(),
        subreddit = %submission.subreddit,
        balance = new_balance,
        "Submission created"
    );

    Ok((submission, new_balance))
}

/// Write back the pre-debit account, retrying with linear backoff
async fn restore_balance(store: &dyn LedgerStore, original: AccountDoc) {
    for attempt in 1..=COMPENSATION_ATTEMPTS {
        match store.put_account(original.clone()).await {
            Ok(()) => {
                info!(user_id = %original.user_id, points = original.points, "Restored points");
                return;
            }
            Err(e) => {
                warn!(
                    user_id = %original.user_id,
                    attempt,
                    error = %e,
                    "Points restore attempt failed"
                );
                if attempt < COMPENSATION_ATTEMPTS {
                    tokio::time::sleep(COMPENSATION_DELAY * attempt).await;
                }
            }
        }
    }

    error!(
        user_id = %original.user_id,
        owed_balance = original.points,
        "Could not restore points after failed submission"
    );
}
