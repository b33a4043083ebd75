//! Focus session core: a time-boxed session during which incoming
//! notifications are classified and deferred rather than delivered, then
//! summarized once the session ends. UI layers sit outside this crate and
//! talk to [`AppCore`] through snapshots and watch channels.

pub mod auth;
pub mod classifier;
pub mod clock;
pub mod db;
pub mod error;
pub mod models;
pub mod session;
pub mod settings;
pub mod summary;

use std::{path::Path, sync::Arc};

use anyhow::Result;

pub use auth::{MockAuthService, User};
pub use classifier::{route, Classify, MockClassifier};
pub use db::{Database, SessionStore};
pub use error::CoreError;
pub use models::{Category, FocusSession, Lane, Notification, Priority, SessionSummary};
pub use session::SessionController;
pub use settings::{FocusSettings, SettingsStore};
pub use summary::SummaryGenerator;

/// Explicitly owned application state, wired once at startup and passed to
/// consumers. Replaces any notion of app-wide globals: the controller owns
/// the live session, the generator owns the last summary, everyone else
/// reads snapshots.
pub struct AppCore {
    pub session: SessionController,
    pub summaries: Arc<SummaryGenerator>,
    pub settings: SettingsStore,
    pub auth: MockAuthService,
}

impl AppCore {
    /// Initialize with the default mock services against `data_dir`.
    pub async fn init(data_dir: &Path) -> Result<Self> {
        Self::init_with(
            data_dir,
            Arc::new(MockClassifier::new()),
            Arc::new(SummaryGenerator::new()),
        )
        .await
    }

    /// Initialize with injected classification and summary strategies, the
    /// seam deterministic tests and real notification sources plug into.
    pub async fn init_with(
        data_dir: &Path,
        classifier: Arc<dyn Classify>,
        summaries: Arc<SummaryGenerator>,
    ) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let database = Database::new(data_dir.join("focusflow.sqlite3"))?;
        let store = SessionStore::new(database);
        let session = SessionController::new(store, classifier, summaries.clone()).await;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        Ok(Self {
            session,
            summaries,
            settings,
            auth: MockAuthService::new(),
        })
    }

    /// Teardown: stop periodic work. An active session stays persisted and
    /// is rehydrated on the next `init`.
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}
