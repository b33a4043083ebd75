use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Notification;

/// The live focus session. Exactly one exists per process; only the
/// `SessionController` mutates it, everything else reads clones.
///
/// Invariant: `active == false` implies `id` and `started_at` are absent and
/// `notifications` is empty. Notifications from finished sessions survive
/// only inside the derived `SessionSummary`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: Option<String>,
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    /// Placeholder carried in the persisted blob. The authoritative elapsed
    /// time is always recomputed from `started_at` (see `clock`).
    pub duration_secs: u64,
    /// Newest-first, append-only while active.
    pub notifications: Vec<Notification>,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::idle()
    }
}

impl FocusSession {
    pub fn idle() -> Self {
        Self {
            id: None,
            active: false,
            started_at: None,
            duration_secs: 0,
            notifications: Vec::new(),
        }
    }

    /// Reinitialize into a fresh active session.
    pub fn begin(&mut self, id: String, started_at: DateTime<Utc>) {
        *self = Self {
            id: Some(id),
            active: true,
            started_at: Some(started_at),
            duration_secs: 0,
            notifications: Vec::new(),
        };
    }

    /// Prepend a notification; consumers rely on newest-first ordering.
    pub fn prepend(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    pub fn reset(&mut self) {
        *self = Self::idle();
    }
}
