use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Notification;

/// Archived result of a finished focus session. Created exactly once per
/// `end()`; immutable afterwards except for the single write-once
/// `annotation` enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub total_duration_secs: u64,
    /// Notifications held for review (`priority == high`).
    pub queued_count: u32,
    /// Notifications silently muted (everything else).
    pub muted_count: u32,
    /// Synthetic productivity proxy in [70, 100]; not a behavioral signal.
    pub focus_score: u8,
    /// Snapshot copied at end time, newest-first.
    pub notifications: Vec<Notification>,
    pub annotation: Option<String>,
    pub ended_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn notification_count(&self) -> u32 {
        self.queued_count + self.muted_count
    }
}
