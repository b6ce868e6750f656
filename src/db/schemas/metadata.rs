//! Common metadata for all documents
//!
//! Tracks creation and last-write timestamps. Both stores stamp these on every
//! `put`; the creation time survives overwrites.

use bson::DateTime;
use chrono::{DateTime as ChronoDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    /// When the document was first written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    /// When the document was last written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl Metadata {
    /// Create new metadata with current timestamp
    pub fn new() -> Self {
        let now = DateTime::now();
        Self {
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Record a write: keep the creation time, refresh the update time
    pub fn stamp(&mut self) {
        let now = DateTime::now();
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }

    /// Creation time as chrono, for API views
    pub fn created_at_utc(&self) -> Option<ChronoDateTime<Utc>> {
        self.created_at.map(|dt| dt.to_chrono())
    }
}
