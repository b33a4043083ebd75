use anyhow::{Context, Result};
use log::warn;

use super::Database;
use crate::models::FocusSession;

const SESSION_KEY: &str = "focusSession";

/// Persistence adapter for the live focus session. One JSON blob under a
/// fixed key; timestamps round-trip through RFC 3339. Summaries are not
/// persisted.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn save(&self, session: &FocusSession) -> Result<()> {
        let blob =
            serde_json::to_string(session).context("failed to serialize focus session")?;
        self.db.kv_put(SESSION_KEY, blob).await
    }

    /// Load the persisted session, if any. A malformed blob degrades to
    /// "no session" with a warning instead of failing the caller.
    pub async fn load(&self) -> Result<Option<FocusSession>> {
        let Some(blob) = self.db.kv_get(SESSION_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<FocusSession>(&blob) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!("Discarding corrupt persisted session: {err}");
                Ok(None)
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.db.kv_delete(SESSION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Notification, Priority};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SessionStore {
        SessionStore::new(Database::new(dir.path().join("test.sqlite3")).unwrap())
    }

    fn active_session() -> FocusSession {
        let mut session = FocusSession::idle();
        session.begin("session-1".into(), Utc::now() - Duration::seconds(90));
        session.prepend(Notification {
            id: "1700000000000-0000".into(),
            category: Category::Scheduling,
            title: "Team Standup".into(),
            body: "Starting in 15 min".into(),
            created_at: Utc::now(),
            priority: Priority::High,
        });
        session
    }

    #[tokio::test]
    async fn round_trip_preserves_timestamps_exactly() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let session = active_session();
        store.save(&session).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded, session);
        assert_eq!(loaded.started_at, session.started_at);
        assert_eq!(
            loaded.notifications[0].created_at,
            session.notifications[0].created_at
        );
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_blob_degrades_to_no_session() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.sqlite3")).unwrap();
        db.kv_put(SESSION_KEY, "{not valid json".into())
            .await
            .unwrap();

        let store = SessionStore::new(db);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_forgets_the_session() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.save(&active_session()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
