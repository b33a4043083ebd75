use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::{Category, Lane, Notification, Priority};

/// Classification strategy. Pluggable so tests and real notification
/// sources can substitute the weighted-random mock.
pub trait Classify: Send + Sync {
    fn classify(&self, category: Category) -> Notification;
}

/// Routing decision for an incoming notification, with the reason attached.
/// Outside a focus session everything is delivered; inside one, only the
/// urgent categories pass through.
pub fn route(category: Category, focus_active: bool) -> (Lane, &'static str) {
    if !focus_active {
        return (Lane::Allowed, "no focus session is active");
    }
    match category.lane() {
        Lane::Allowed => (Lane::Allowed, "category is treated as urgent"),
        Lane::Queued => (
            Lane::Queued,
            "focus session is active and category is not urgent",
        ),
    }
}

/// Mock notification source: fresh id and timestamp, title/body drawn from a
/// per-category catalog, priority drawn with fixed weights
/// (high ≈ 30%, medium ≈ 30%, low ≈ 40%).
pub struct MockClassifier {
    rng: Mutex<StdRng>,
    seq: AtomicU64,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Seeded variant for reproducible draws in tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            seq: AtomicU64::new(0),
        }
    }

    /// Millisecond timestamp plus a per-process sequence suffix, so creation
    /// order stays recoverable even within the same millisecond.
    fn next_id(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:04}", Utc::now().timestamp_millis(), seq)
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classify for MockClassifier {
    fn classify(&self, category: Category) -> Notification {
        let (titles, bodies) = catalog(category);
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let title = titles[rng.gen_range(0..titles.len())];
        let body = bodies[rng.gen_range(0..bodies.len())];

        // These thresholds are the contract: r > 0.7 high, r > 0.4 medium.
        let roll: f64 = rng.gen();
        let priority = if roll > 0.7 {
            Priority::High
        } else if roll > 0.4 {
            Priority::Medium
        } else {
            Priority::Low
        };

        Notification {
            id: self.next_id(),
            category,
            title: title.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
            priority,
        }
    }
}

fn catalog(category: Category) -> (&'static [&'static str], &'static [&'static str]) {
    match category {
        Category::CommunicationUrgent => (
            &["#general", "Direct Message", "#engineering", "@John"],
            &[
                "New message from team",
                "Quick question about the project",
                "Meeting reminder",
                "Can we sync?",
            ],
        ),
        Category::CommunicationCasual => (
            &["Newsletter", "Work Update", "Team Alert", "Weekly Report"],
            &[
                "Your weekly digest is ready",
                "Project deadline updated",
                "New task assigned",
                "Review requested",
            ],
        ),
        Category::Broadcast => (
            &["Instagram", "Twitter", "LinkedIn", "Facebook"],
            &[
                "New like on your post",
                "Someone mentioned you",
                "New connection request",
                "New comment",
            ],
        ),
        Category::Scheduling => (
            &["Team Standup", "1:1 Meeting", "Review Session", "Sprint Planning"],
            &[
                "Starting in 15 min",
                "Starting in 30 min",
                "Rescheduled",
                "New invite",
            ],
        ),
    }
}
