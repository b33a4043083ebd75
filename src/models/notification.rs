use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of notification sources, named by what they carry rather than
/// by vendor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    CommunicationUrgent,
    CommunicationCasual,
    Broadcast,
    Scheduling,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CommunicationUrgent => "communication-urgent",
            Category::CommunicationCasual => "communication-casual",
            Category::Broadcast => "broadcast",
            Category::Scheduling => "scheduling",
        }
    }

    /// Routing lane derived from the category alone, independent of priority.
    pub fn lane(&self) -> Lane {
        match self {
            Category::CommunicationUrgent | Category::Scheduling => Lane::Allowed,
            Category::CommunicationCasual | Category::Broadcast => Lane::Queued,
        }
    }

    pub const ALL: [Category; 4] = [
        Category::CommunicationUrgent,
        Category::CommunicationCasual,
        Category::Broadcast,
        Category::Scheduling,
    ];
}

/// Routing bucket for an incoming notification while a session is active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Lane {
    Allowed,
    Queued,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// A classified notification. `priority` and `created_at` are assigned at
/// classification time and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub category: Category,
    pub title: String,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
}

impl Notification {
    pub fn lane(&self) -> Lane {
        self.category.lane()
    }
}
