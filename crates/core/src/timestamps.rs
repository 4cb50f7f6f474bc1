//! Record timestamps with soft-deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation / update / soft-deletion timestamps of a persisted record.
///
/// A record without `Timestamps` has never been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Timestamps of a record persisted for the first time at `now`.
    pub fn created(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Flag the record as deleted. Deleting twice keeps the first deletion time.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(now);
        }
        self.updated_at = now;
    }

    pub fn restore(&mut self, now: DateTime<Utc>) {
        self.deleted_at = None;
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
