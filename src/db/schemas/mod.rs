//! Database schemas for Karmicup
//!
//! Document structures for the four ledger entities.

mod account;
mod interaction;
mod linked_identity;
mod metadata;
mod submission;

pub use account::{AccountDoc, ACCOUNT_COLLECTION};
pub use interaction::{Interaction, InteractionDoc, INTERACTION_COLLECTION};
pub use linked_identity::{LinkedIdentityDoc, LINKED_IDENTITY_COLLECTION};
pub use metadata::Metadata;
pub use submission::{
    MetricsBaseline, SubmissionDoc, SubmissionKind, SubmissionStatus, SUBMISSION_COLLECTION,
};
