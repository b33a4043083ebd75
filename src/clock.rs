use chrono::{DateTime, Utc};

use crate::models::FocusSession;

/// Elapsed active seconds for the session, recomputed from wall-clock time.
///
/// Wall-clock deltas self-correct after process suspension (mobile
/// backgrounding), where an incrementing counter would drift. Callers
/// recompute on every tick and again on any foreground/visibility signal.
pub fn elapsed(session: &FocusSession) -> u64 {
    elapsed_at(session, Utc::now())
}

/// Same computation against an explicit `now`, for deterministic callers.
/// Inactive sessions report 0 regardless of any stale `started_at`.
pub fn elapsed_at(session: &FocusSession, now: DateTime<Utc>) -> u64 {
    if !session.active {
        return 0;
    }
    let Some(started_at) = session.started_at else {
        return 0;
    };
    // Floor at zero guards clock skew.
    (now - started_at).num_seconds().max(0) as u64
}
