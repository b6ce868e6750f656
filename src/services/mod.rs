//! Ledger services
//!
//! Business logic between the HTTP routes, the ledger store and Reddit.
//!
//! ## Services
//!
//! - **Accounts**: provisioning and Reddit identity linking
//! - **Intake**: paid submission creation with compensating rollback
//! - **Verification**: engagement detection and crediting
//! - **Status**: owner-only visibility toggle
//! - **Views**: read models for the dashboard

pub mod accounts;
pub mod intake;
pub mod points;
pub mod status;
pub mod verification;
pub mod views;

pub use accounts::{ensure_account, link_reddit_account, normalize_username};
pub use intake::{create_submission, NewSubmission};
pub use points::{points_for, LedgerConfig, POINTS_BOTH, POINTS_COMMENT, POINTS_UPVOTE};
pub use status::set_status;
pub use verification::{verify, VerificationOutcome};
pub use views::{feed, me, my_submissions, FeedItem, MeView, SubmissionView};
