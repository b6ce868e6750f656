//! Submission status toggle (feed visibility only)

use tracing::info;

use crate::db::schemas::{SubmissionDoc, SubmissionStatus};
use crate::db::LedgerStore;
use crate::types::{KarmaError, Result};

/// Set a submission's status. Only the owner may do this.
///
/// `None` leaves the submission untouched; setting the current status again
/// succeeds without a write.
pub async fn set_status(
    store: &dyn LedgerStore,
    owner: &str,
    submission_id: &str,
    status: Option<SubmissionStatus>,
) -> Result<SubmissionDoc> {
    let mut submission = store
        .get_submission(submission_id)
        .await?
        .ok_or_else(|| KarmaError::NotFound("Submission not found".into()))?;

    if submission.owner_id != owner {
        return Err(KarmaError::Forbidden("Forbidden".into()));
    }

    let Some(status) = status else {
        return Ok(submission);
    };
    if submission.status == status {
        return Ok(submission);
    }

    submission.status = status;
    store.put_submission(submission.clone()).await?;
    info!(
        submission_id = %submission_id,
        status = status.as_str(),
        "Submission status changed"
    );
    Ok(submission)
}
