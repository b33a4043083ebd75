use std::cmp;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::clock;
use crate::error::CoreError;
use crate::models::{FocusSession, Priority, SessionSummary};

const DEFAULT_ANNOTATION_LATENCY: Duration = Duration::from_secs(2);

/// Builds and owns the most recent `SessionSummary`. One summary is produced
/// per ended session and replaces its predecessor; the annotation enrichment
/// is write-once.
pub struct SummaryGenerator {
    rng: Mutex<StdRng>,
    annotation_latency: Duration,
    last: RwLock<Option<SessionSummary>>,
}

impl SummaryGenerator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy(), DEFAULT_ANNOTATION_LATENCY)
    }

    /// Seeded score draws for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), DEFAULT_ANNOTATION_LATENCY)
    }

    /// Override the simulated annotation latency (tests pass zero).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.annotation_latency = latency;
        self
    }

    fn from_rng(rng: StdRng, annotation_latency: Duration) -> Self {
        Self {
            rng: Mutex::new(rng),
            annotation_latency,
            last: RwLock::new(None),
        }
    }

    /// Aggregate a session into a summary. Pure in its inputs except for the
    /// focus-score draw: `min(100, floor(70 + r*30))`. The `min` guard is
    /// unreachable for r in [0,1) and kept anyway.
    pub fn build(&self, session: &FocusSession, ended_at: DateTime<Utc>) -> SessionSummary {
        let queued_count = session
            .notifications
            .iter()
            .filter(|n| n.priority == Priority::High)
            .count() as u32;
        let muted_count = session.notifications.len() as u32 - queued_count;

        let roll: f64 = {
            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            rng.gen()
        };
        let focus_score = cmp::min(100, (70.0 + roll * 30.0).floor() as u8);

        SessionSummary {
            session_id: session.id.clone().unwrap_or_default(),
            total_duration_secs: clock::elapsed_at(session, ended_at),
            queued_count,
            muted_count,
            focus_score,
            notifications: session.notifications.clone(),
            annotation: None,
            ended_at,
        }
    }

    /// Build a summary and publish it as the most recent one.
    pub fn finalize(&self, session: &FocusSession, ended_at: DateTime<Utc>) -> SessionSummary {
        let summary = self.build(session, ended_at);
        *self.last.write().unwrap_or_else(|p| p.into_inner()) = Some(summary.clone());
        summary
    }

    pub fn last(&self) -> Option<SessionSummary> {
        self.last.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Enrich the most recent summary with a generated annotation, modeling
    /// an external generation step that may be slow. Write-once: a second
    /// call returns the summary unchanged. The bundled mock always succeeds;
    /// real backends would reject with `ServiceUnavailable` and leave the
    /// summary untouched.
    pub async fn annotate(&self) -> Result<SessionSummary, CoreError> {
        {
            let guard = self.last.read().unwrap_or_else(|p| p.into_inner());
            match guard.as_ref() {
                None => return Err(CoreError::InvalidState("no summary to annotate")),
                Some(summary) if summary.annotation.is_some() => return Ok(summary.clone()),
                Some(_) => {}
            }
        }

        tokio::time::sleep(self.annotation_latency).await;

        let mut guard = self.last.write().unwrap_or_else(|p| p.into_inner());
        let Some(summary) = guard.as_mut() else {
            return Err(CoreError::InvalidState("no summary to annotate"));
        };
        if summary.annotation.is_none() {
            summary.annotation = Some(render_annotation(summary));
            info!("annotated summary for session {}", summary.session_id);
        }
        Ok(summary.clone())
    }
}

impl Default for SummaryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn render_annotation(summary: &SessionSummary) -> String {
    format!(
        "During your {} minute focus session, you maintained excellent concentration. \
         {} important notifications were queued for your review, while {} low-priority \
         alerts were silently muted. Your focus score of {}% indicates strong \
         productivity. Consider scheduling similar sessions in the morning for \
         optimal results.",
        summary.total_duration_secs / 60,
        summary.queued_count,
        summary.muted_count,
        summary.focus_score
    )
}
