//! Pipeline run supervision
//!
//! **[TPS-WF-040]** Runs are never fire-and-forget: every spawned pipeline
//! task is tracked here with its cancellation token, so the process can
//! cancel runs, join them on shutdown, and surface failures through the
//! health endpoint instead of losing them in a detached timer.
//!
//! The supervisor is also the at-most-once guard: a second trigger for a
//! tour whose run is still in flight is refused rather than overlapped.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::PipelineOrchestrator;

/// Reasons a run could not be started
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    /// A run for this tour is still in flight
    #[error("pipeline already running for tour {0}")]
    AlreadyRunning(i64),
}

struct RunHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Tracks at most one pipeline run per tour
pub struct PipelineSupervisor {
    runs: RwLock<HashMap<i64, RunHandle>>,
    last_error: Arc<RwLock<Option<String>>>,
}

impl PipelineSupervisor {
    /// `last_error` is shared with the application state so the health
    /// endpoint can report the most recent pipeline failure.
    pub fn new(last_error: Arc<RwLock<Option<String>>>) -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
            last_error,
        }
    }

    /// Spawn a supervised run for `tour_id`
    ///
    /// Refuses to overlap a run that is still in flight. A finished run's
    /// slot is reclaimed, so a tour can be processed again after a later
    /// upload.
    pub async fn start(
        &self,
        tour_id: i64,
        orchestrator: PipelineOrchestrator,
    ) -> Result<(), StartError> {
        let mut runs = self.runs.write().await;
        if let Some(existing) = runs.get(&tour_id) {
            if !existing.handle.is_finished() {
                return Err(StartError::AlreadyRunning(tour_id));
            }
        }

        let token = CancellationToken::new();
        let run_token = token.clone();
        let last_error = Arc::clone(&self.last_error);
        let handle = tokio::spawn(async move {
            if let Err(e) = orchestrator.execute(tour_id, run_token).await {
                tracing::error!(tour_id, error = %e, "Processing pipeline failed");
                orchestrator.handle_failure(tour_id, &format!("{e:#}")).await;
                *last_error.write().await = Some(format!("tour {tour_id}: {e:#}"));
            }
        });

        runs.insert(tour_id, RunHandle { token, handle });
        Ok(())
    }

    /// Whether a run for `tour_id` is still in flight
    pub async fn is_running(&self, tour_id: i64) -> bool {
        self.runs
            .read()
            .await
            .get(&tour_id)
            .map(|run| !run.handle.is_finished())
            .unwrap_or(false)
    }

    /// Request cancellation of an in-flight run; returns whether one existed
    pub async fn cancel(&self, tour_id: i64) -> bool {
        match self.runs.read().await.get(&tour_id) {
            Some(run) if !run.handle.is_finished() => {
                run.token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Wait for the run of `tour_id` (if any) to finish
    pub async fn wait(&self, tour_id: i64) {
        let run = self.runs.write().await.remove(&tour_id);
        if let Some(run) = run {
            if let Err(e) = run.handle.await {
                tracing::error!(tour_id, error = %e, "Pipeline task panicked");
            }
        }
    }

    /// Drain every tracked run; called on shutdown
    pub async fn join_all(&self) {
        let runs: Vec<(i64, RunHandle)> = self.runs.write().await.drain().collect();
        for (tour_id, run) in runs {
            if let Err(e) = run.handle.await {
                tracing::error!(tour_id, error = %e, "Pipeline task panicked");
            }
        }
    }
}
