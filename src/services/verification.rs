//! Engagement verification
//!
//! A helper claims to have upvoted and/or commented on someone else's
//! submission. We fetch fresh Reddit state, decide what is new since the
//! submission's baseline, and credit each action type at most once per
//! (helper, submission) pair.
//!
//! ## Detection
//!
//! - Upvote: fresh score `>= baseline.upvotes + 1`. The baseline moves by
//!   exactly one per credited upvote, never to the raw score.
//! - Comment: the helper authors a reply in the fetched listing, or a comment
//!   in their own recent history whose parent is the submission's target. The
//!   listing can lag behind the helper's profile, so both are checked.
//!
//! ## Write order
//!
//! 1. Credit the helper's balance
//! 2. Upsert the interaction record
//! 3. Advance the submission counters and baseline
//!
//! A failure aborts the remaining steps. Eligibility is re-derived from the
//! stored interaction record on every call, so retrying is safe.

use serde::Serialize;
use tracing::{debug, info};

use crate::db::schemas::{
    Interaction, InteractionDoc, MetricsBaseline, SubmissionDoc, SubmissionKind,
};
use crate::db::LedgerStore;
use crate::reddit::{
    fetch_comment, fetch_post, fetch_user_comments, ContentGateway, ContentTarget, GatewayError,
    RedditComment,
};
use crate::services::points::{points_for, LedgerConfig};
use crate::types::{KarmaError, Result};

/// Result of a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    /// Actions credited by this call
    pub detected: Interaction,
    pub points_earned: i64,
    /// Helper's balance after the credit
    pub new_balance: i64,
    /// Stored interaction after this call
    pub interaction: Interaction,
}

/// Reddit state relevant to a submission
#[derive(Debug, Clone)]
struct FreshState {
    score: i64,
    comment_count: i64,
    replies: Vec<RedditComment>,
}

/// Which actions may still be credited, and which were seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Detection {
    can_check_upvote: bool,
    can_check_comment: bool,
    upvote: bool,
    comment: bool,
}

impl Detection {
    fn eligible(existing: Option<Interaction>) -> Self {
        Self {
            can_check_upvote: matches!(existing, None | Some(Interaction::Comment)),
            can_check_comment: matches!(existing, None | Some(Interaction::Upvote)),
            ..Self::default()
        }
    }

    fn run(
        mut self,
        baseline: &MetricsBaseline,
        fresh: &FreshState,
        history: &[RedditComment],
        handle: &str,
        target_fullname: &str,
    ) -> Self {
        self.upvote = self.can_check_upvote && fresh.score >= baseline.upvotes + 1;

        if self.can_check_comment {
            let in_listing = fresh.replies.iter().any(|c| c.is_authored_by(handle));
            let in_history = history
                .iter()
                .any(|c| c.parent_id == target_fullname && c.is_authored_by(handle));
            self.comment = in_listing || in_history;
        }

        self
    }

    /// Message for a call that detected nothing new
    fn hint(&self, noun: &str) -> String {
        let hint = if !self.can_check_upvote {
            format!("Leave a comment on the {} and try again.", noun)
        } else if !self.can_check_comment {
            format!("Upvote the {} and try again.", noun)
        } else {
            format!("Upvote and/or comment on the {} and try again.", noun)
        };
        format!("No new interaction detected. {}", hint)
    }
}

fn gateway_error(kind: SubmissionKind) -> impl Fn(GatewayError) -> KarmaError {
    move |e| match kind {
        SubmissionKind::Post => KarmaError::from_gateway(e, "Reddit post"),
        SubmissionKind::Comment => KarmaError::from_gateway(e, "Reddit comment"),
    }
}

/// The helper's own history failed to load. A 404 means the linked handle no
/// longer resolves on Reddit.
fn history_error(err: GatewayError, handle: &str) -> KarmaError {
    match err {
        GatewayError::ClientError { status: 404, .. } => KarmaError::UpstreamNotFound(format!(
            "Reddit user u/{} not found. Please re-link your Reddit account.",
            handle
        )),
        other => KarmaError::from_gateway(other, "Reddit user history"),
    }
}

async fn fetch_fresh(
    gateway: &dyn ContentGateway,
    target: &ContentTarget,
    window: u32,
) -> std::result::Result<FreshState, GatewayError> {
    if target.is_comment() {
        let comment = fetch_comment(gateway, target, window).await?;
        Ok(FreshState {
            score: comment.score,
            comment_count: comment.replies.len() as i64,
            replies: comment.replies,
        })
    } else {
        let post = fetch_post(gateway, target, window).await?;
        Ok(FreshState {
            score: post.score,
            comment_count: post.num_comments,
            replies: post.comments,
        })
    }
}

/// Verify `helper`'s engagement on a submission and credit anything new
pub async fn verify(
    store: &dyn LedgerStore,
    gateway: &dyn ContentGateway,
    config: &LedgerConfig,
    helper: &str,
    submission_id: &str,
) -> Result<VerificationOutcome> {
    let identity = store.get_linked_identity(helper).await?.ok_or_else(|| {
        KarmaError::Validation(
            "No Reddit account linked. Please connect your Reddit account first.".into(),
        )
    })?;

    let submission = store
        .get_submission(submission_id)
        .await?
        .ok_or_else(|| KarmaError::NotFound("Submission not found".into()))?;

    if submission.owner_id == helper {
        return Err(KarmaError::Forbidden(
            "You cannot verify your own submission.".into(),
        ));
    }

    let target = ContentTarget::parse(&submission.reddit_url).map_err(|e| {
        KarmaError::Internal(format!(
            "stored URL for submission {} is invalid: {}",
            submission.submission_id, e
        ))
    })?;

    let (fresh, history) = tokio::try_join!(
        async {
            fetch_fresh(gateway, &target, config.post_comment_window)
                .await
                .map_err(gateway_error(submission.kind))
        },
        async {
            fetch_user_comments(gateway, &identity.username, config.user_comment_window)
                .await
                .map_err(|e| history_error(e, &identity.username))
        },
    )?;

    let existing = store.get_interaction(helper, submission_id).await?;
    let eligibility = Detection::eligible(existing.as_ref().map(|r| r.interaction));
    if !eligibility.can_check_upvote && !eligibility.can_check_comment {
        return Err(KarmaError::Conflict(
            "You have already performed both actions on this submission.".into(),
        ));
    }

    let detection = eligibility.run(
        &submission.metrics,
        &fresh,
        &history,
        &identity.username,
        &target.fullname(),
    );

    debug!(
        helper = %helper,
        submission_id = %submission_id,
        score = fresh.score,
        baseline_upvotes = submission.metrics.upvotes,
        comment_count = fresh.comment_count,
        listing_authors = ?fresh.replies.iter().map(|c| c.author.as_str()).collect::<Vec<_>>(),
        upvote = detection.upvote,
        comment = detection.comment,
        "Verification decision"
    );

    let detected = Interaction::from_flags(detection.upvote, detection.comment)
        .ok_or_else(|| KarmaError::Conflict(detection.hint(submission.kind.as_str())))?;
    let points_earned = points_for(detected);

    let new_balance = credit(store, helper, points_earned).await?;

    let interaction = match existing {
        Some(mut record) => {
            record.interaction = Interaction::Both;
            store.put_interaction(record).await?;
            Interaction::Both
        }
        None => {
            let record = InteractionDoc::new(
                helper.to_string(),
                submission_id.to_string(),
                detected,
            );
            store.put_interaction(record).await?;
            detected
        }
    };

    store
        .put_submission(advance(submission, detected, fresh.comment_count))
        .await?;

    info!(
        helper = %helper,
        submission_id = %submission_id,
        detected = detected.as_str(),
        points_earned,
        balance = new_balance,
        "Engagement verified"
    );

    Ok(VerificationOutcome {
        detected,
        points_earned,
        new_balance,
        interaction,
    })
}

/// Read-then-write credit; returns the new balance
async fn credit(store: &dyn LedgerStore, user_id: &str, points: i64) -> Result<i64> {
    let mut account = store
        .get_account(user_id)
        .await?
        .ok_or_else(|| KarmaError::NotFound("User not found".into()))?;
    account.points += points;
    let balance = account.points;
    store.put_account(account).await?;
    Ok(balance)
}

/// Apply credited actions to the submission's counters and baseline
fn advance(mut submission: SubmissionDoc, detected: Interaction, fresh_comments: i64) -> SubmissionDoc {
    if detected.includes_upvote() {
        submission.upvotes_received += 1;
        submission.metrics.upvotes += 1;
    }
    if detected.includes_comment() {
        submission.comments_received += 1;
        submission.metrics.comments = fresh_comments;
    }
    submission
}
