use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::{info, warn};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    classifier::Classify,
    clock,
    db::SessionStore,
    error::CoreError,
    models::{Category, FocusSession, Notification, SessionSummary},
    summary::SummaryGenerator,
};

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Owns the authoritative live session. All mutations are write-through:
/// the new state is persisted before it is committed in memory, so a process
/// restart rehydrates an active session with its `started_at` and
/// accumulated notifications intact.
#[derive(Clone)]
pub struct SessionController {
    session: Arc<Mutex<FocusSession>>,
    store: SessionStore,
    classifier: Arc<dyn Classify>,
    summaries: Arc<SummaryGenerator>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    focus_mode_tx: watch::Sender<bool>,
    elapsed_tx: watch::Sender<u64>,
}

impl SessionController {
    /// Rehydrate from the persistence adapter. Corrupt or unreadable state
    /// degrades to a fresh idle session; an active rehydrated session
    /// restarts the ticker and re-raises the focus-mode signal.
    pub async fn new(
        store: SessionStore,
        classifier: Arc<dyn Classify>,
        summaries: Arc<SummaryGenerator>,
    ) -> Self {
        let session = match store.load().await {
            Ok(Some(session)) if session.active => {
                info!(
                    "Rehydrated active session {} started at {}",
                    session.id.as_deref().unwrap_or("<unknown>"),
                    session
                        .started_at
                        .map(|dt| dt.to_rfc3339())
                        .unwrap_or_else(|| "<unset>".into())
                );
                session
            }
            Ok(_) => FocusSession::idle(),
            Err(err) => {
                warn!("Failed to load persisted session, starting idle: {err:#}");
                FocusSession::idle()
            }
        };

        let active = session.active;
        let (focus_mode_tx, _) = watch::channel(active);
        let (elapsed_tx, _) = watch::channel(clock::elapsed(&session));

        let controller = Self {
            session: Arc::new(Mutex::new(session)),
            store,
            classifier,
            summaries,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            focus_mode_tx,
            elapsed_tx,
        };

        if active {
            controller.spawn_ticker().await;
        }

        controller
    }

    /// Begin a focus session. Rejected while one is already active so a
    /// misbehaving collaborator cannot silently discard a running session.
    pub async fn start(&self) -> Result<FocusSession, CoreError> {
        let started_at = Utc::now();
        let snapshot = {
            let mut guard = self.session.lock().await;
            if guard.active {
                return Err(CoreError::InvalidState("session already active"));
            }

            let mut next = FocusSession::idle();
            next.begin(Uuid::new_v4().to_string(), started_at);
            self.store.save(&next).await?;
            *guard = next.clone();
            next
        };

        self.focus_mode_tx.send_replace(true);
        self.elapsed_tx.send_replace(0);
        self.spawn_ticker().await;

        info!(
            "Focus session {} started",
            snapshot.id.as_deref().unwrap_or_default()
        );
        Ok(snapshot)
    }

    /// Classify an incoming notification and record it on the live session.
    /// Only valid while active; the idle case is an integration error.
    pub async fn record(&self, category: Category) -> Result<Notification, CoreError> {
        let notification = self.classifier.classify(category);

        let mut guard = self.session.lock().await;
        if !guard.active {
            return Err(CoreError::InvalidState(
                "cannot record a notification while idle",
            ));
        }

        let mut next = guard.clone();
        next.prepend(notification.clone());
        self.store.save(&next).await?;
        *guard = next;

        Ok(notification)
    }

    /// End the active session: archive it into a summary, reset to idle,
    /// cancel the ticker, lower the focus-mode signal.
    pub async fn end(&self) -> Result<SessionSummary, CoreError> {
        let ended_at = Utc::now();
        let snapshot = {
            let mut guard = self.session.lock().await;
            if !guard.active {
                return Err(CoreError::InvalidState("no active session to end"));
            }

            let snapshot = guard.clone();
            let next = FocusSession::idle();
            self.store.save(&next).await?;
            *guard = next;
            snapshot
        };

        self.cancel_ticker().await;
        self.focus_mode_tx.send_replace(false);
        self.elapsed_tx.send_replace(0);

        let summary = self.summaries.finalize(&snapshot, ended_at);
        info!(
            "Focus session {} ended after {}s ({} queued, {} muted)",
            summary.session_id,
            summary.total_duration_secs,
            summary.queued_count,
            summary.muted_count
        );
        Ok(summary)
    }

    /// Elapsed active seconds, recomputed from wall clock. Idle sessions
    /// report 0.
    pub async fn elapsed(&self) -> u64 {
        clock::elapsed(&*self.session.lock().await)
    }

    /// Read view of the live session.
    pub async fn snapshot(&self) -> FocusSession {
        self.session.lock().await.clone()
    }

    /// Foreground/visibility signal: recompute immediately instead of
    /// waiting for the next tick, correcting for ticks missed while the
    /// process was suspended.
    pub async fn resync(&self) -> u64 {
        let elapsed = self.elapsed().await;
        self.elapsed_tx.send_replace(elapsed);
        elapsed
    }

    /// Boolean theming signal, raised on `start()` and lowered on `end()`.
    pub fn focus_mode(&self) -> watch::Receiver<bool> {
        self.focus_mode_tx.subscribe()
    }

    /// Per-tick elapsed seconds for UI consumption.
    pub fn elapsed_updates(&self) -> watch::Receiver<u64> {
        self.elapsed_tx.subscribe()
    }

    /// Teardown: stop periodic work. The persisted session is left in place
    /// so the next process start can rehydrate it.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(old) = ticker_guard.take() {
            old.cancel.cancel();
            old.handle.abort();
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let session = self.session.clone();
        let elapsed_tx = self.elapsed_tx.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // Ticks recompute from wall clock, so skipping missed ones is
            // lossless.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let elapsed = {
                            let guard = session.lock().await;
                            if !guard.active {
                                break;
                            }
                            clock::elapsed(&guard)
                        };
                        elapsed_tx.send_replace(elapsed);
                    }
                    _ = token.cancelled() => break,
                }
            }
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MockClassifier;
    use crate::db::Database;
    use crate::models::Priority;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::TempDir;

    /// Deterministic classification double: fixed priority, sequential ids.
    struct FixedClassifier {
        priority: Priority,
        seq: AtomicU64,
    }

    impl FixedClassifier {
        fn new(priority: Priority) -> Self {
            Self {
                priority,
                seq: AtomicU64::new(0),
            }
        }
    }

    impl Classify for FixedClassifier {
        fn classify(&self, category: Category) -> Notification {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            Notification {
                id: format!("fixed-{seq:04}"),
                category,
                title: "title".into(),
                body: "body".into(),
                created_at: Utc::now(),
                priority: self.priority,
            }
        }
    }

    fn store_at(dir: &TempDir) -> SessionStore {
        SessionStore::new(Database::new(dir.path().join("core.sqlite3")).unwrap())
    }

    async fn controller_with(
        dir: &TempDir,
        classifier: Arc<dyn Classify>,
    ) -> SessionController {
        let _ = env_logger::builder().is_test(true).try_init();
        let summaries = Arc::new(
            SummaryGenerator::with_seed(0).with_latency(Duration::from_millis(0)),
        );
        SessionController::new(store_at(dir), classifier, summaries).await
    }

    #[tokio::test]
    async fn start_record_end_happy_path() {
        let dir = TempDir::new().unwrap();
        let controller =
            controller_with(&dir, Arc::new(FixedClassifier::new(Priority::High))).await;

        let session = controller.start().await.unwrap();
        assert!(session.active);
        assert!(session.started_at.is_some());

        controller.record(Category::CommunicationUrgent).await.unwrap();
        controller.record(Category::Broadcast).await.unwrap();

        let summary = controller.end().await.unwrap();
        assert_eq!(summary.queued_count, 2);
        assert_eq!(summary.muted_count, 0);
        assert_eq!(summary.notifications.len(), 2);
        assert_eq!(controller.elapsed().await, 0);
        assert_eq!(controller.snapshot().await, FocusSession::idle());
    }

    #[tokio::test]
    async fn record_keeps_newest_first_and_counts_calls() {
        let dir = TempDir::new().unwrap();
        let controller =
            controller_with(&dir, Arc::new(FixedClassifier::new(Priority::Low))).await;

        controller.start().await.unwrap();
        for _ in 0..5 {
            controller.record(Category::Broadcast).await.unwrap();
        }

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.notifications.len(), 5);
        let ids: Vec<&str> = snapshot
            .notifications
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted, "expected newest-first ordering");
    }

    #[tokio::test]
    async fn invalid_transitions_are_rejected() {
        let dir = TempDir::new().unwrap();
        let controller =
            controller_with(&dir, Arc::new(FixedClassifier::new(Priority::Low))).await;

        let err = controller.record(Category::Broadcast).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));

        let err = controller.end().await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));

        controller.start().await.unwrap();
        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[tokio::test]
    async fn rehydration_restores_the_active_session_exactly() {
        let dir = TempDir::new().unwrap();
        let classifier: Arc<dyn Classify> = Arc::new(FixedClassifier::new(Priority::Medium));

        let first = controller_with(&dir, classifier.clone()).await;
        first.start().await.unwrap();
        first.record(Category::Scheduling).await.unwrap();
        first.record(Category::CommunicationCasual).await.unwrap();
        let before = first.snapshot().await;
        first.shutdown().await;
        drop(first);

        let second = controller_with(&dir, classifier).await;
        let after = second.snapshot().await;
        assert_eq!(after, before);
        let before_start: DateTime<Utc> = before.started_at.unwrap();
        assert_eq!(after.started_at.unwrap(), before_start);
        assert!(*second.focus_mode().borrow());
    }

    #[tokio::test]
    async fn corrupt_persisted_state_starts_idle() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("core.sqlite3")).unwrap();
        db.kv_put("focusSession", "][ definitely not json".into())
            .await
            .unwrap();

        let summaries = Arc::new(SummaryGenerator::with_seed(0));
        let controller = SessionController::new(
            SessionStore::new(db),
            Arc::new(FixedClassifier::new(Priority::Low)),
            summaries,
        )
        .await;

        assert_eq!(controller.snapshot().await, FocusSession::idle());
        assert!(!*controller.focus_mode().borrow());
    }

    #[tokio::test]
    async fn focus_mode_signal_follows_the_lifecycle() {
        let dir = TempDir::new().unwrap();
        let controller =
            controller_with(&dir, Arc::new(FixedClassifier::new(Priority::Low))).await;
        let focus_mode = controller.focus_mode();

        assert!(!*focus_mode.borrow());
        controller.start().await.unwrap();
        assert!(*focus_mode.borrow());
        controller.end().await.unwrap();
        assert!(!*focus_mode.borrow());
    }

    #[tokio::test]
    async fn end_publishes_the_summary_to_the_generator() {
        let dir = TempDir::new().unwrap();
        let summaries = Arc::new(
            SummaryGenerator::with_seed(1).with_latency(Duration::from_millis(0)),
        );
        let controller = SessionController::new(
            store_at(&dir),
            Arc::new(FixedClassifier::new(Priority::High)),
            summaries.clone(),
        )
        .await;

        assert!(summaries.last().is_none());
        controller.start().await.unwrap();
        controller.record(Category::CommunicationUrgent).await.unwrap();
        let summary = controller.end().await.unwrap();

        let published = summaries.last().unwrap();
        assert_eq!(published.session_id, summary.session_id);
        assert_eq!(published.queued_count, 1);

        let annotated = summaries.annotate().await.unwrap();
        assert!(annotated.annotation.is_some());
    }

    #[tokio::test]
    async fn resync_reports_current_elapsed() {
        let dir = TempDir::new().unwrap();
        let controller =
            controller_with(&dir, Arc::new(FixedClassifier::new(Priority::Low))).await;

        assert_eq!(controller.resync().await, 0);
        controller.start().await.unwrap();
        let updates = controller.elapsed_updates();
        let elapsed = controller.resync().await;
        assert_eq!(*updates.borrow(), elapsed);
    }
}
