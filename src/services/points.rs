//! Point schedule
//!
//! Fixed rewards per credited action. Submission cost and the starting balance
//! are configurable and live in [`LedgerConfig`].

use crate::db::schemas::Interaction;

pub const POINTS_UPVOTE: i64 = 1;
pub const POINTS_COMMENT: i64 = 5;
pub const POINTS_BOTH: i64 = POINTS_UPVOTE + POINTS_COMMENT;

pub const DEFAULT_SUBMIT_COST: i64 = 10;
pub const DEFAULT_STARTING_POINTS: i64 = 20;
pub const DEFAULT_POST_COMMENT_WINDOW: u32 = 50;
pub const DEFAULT_USER_COMMENT_WINDOW: u32 = 25;

/// Points earned for a detected action
pub fn points_for(interaction: Interaction) -> i64 {
    match interaction {
        Interaction::Upvote => POINTS_UPVOTE,
        Interaction::Comment => POINTS_COMMENT,
        Interaction::Both => POINTS_BOTH,
    }
}

/// Ledger tunables shared by the services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Points debited per submission
    pub submit_cost: i64,
    /// Balance of a newly provisioned account
    pub starting_points: i64,
    /// Top-level comments fetched with a post
    pub post_comment_window: u32,
    /// Recent comments fetched from a helper's history
    pub user_comment_window: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            submit_cost: DEFAULT_SUBMIT_COST,
            starting_points: DEFAULT_STARTING_POINTS,
            post_comment_window: DEFAULT_POST_COMMENT_WINDOW,
            user_comment_window: DEFAULT_USER_COMMENT_WINDOW,
        }
    }
}
