//! Plan executor.
//!
//! [`PlanRunner`] executes a deployment plan one step at a time:
//!
//! - each step moves `pending -> running -> completed | failed`;
//! - the first failure halts the run and leaves every later step `pending`;
//! - failures are never retried;
//! - once all steps complete the run is `complete`, and the completion
//!   callback fires after a grace interval.
//!
//! [`PlanRunner::start`] returns a [`RunHandle`]. Dropping the handle (or
//! calling [`RunHandle::cancel`]) stops the run and suppresses a pending
//! completion callback, so nothing calls back into a disposed consumer.
//!
//! Step durations are advisory. A step that never resolves blocks the run
//! until the handle is cancelled.

use purviewx_domain::{PlanStep, Provisioner};
use purviewx_types::run::{RunSnapshot, RunState, StepRecord, StepStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default delay between reaching `complete` and firing the callback.
pub const DEFAULT_COMPLETION_GRACE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub completion_grace: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            completion_grace: DEFAULT_COMPLETION_GRACE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("run task ended abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A plan ready to execute. Consumed by [`PlanRunner::start`].
pub struct PlanRunner {
    steps: Vec<PlanStep>,
    provisioner: Arc<dyn Provisioner>,
    settings: RunnerSettings,
    state_tx: watch::Sender<RunSnapshot>,
}

impl PlanRunner {
    pub fn new(steps: Vec<PlanStep>, provisioner: Arc<dyn Provisioner>) -> Self {
        let snapshot = RunSnapshot {
            state: RunState::Idle,
            current: 0,
            steps: steps
                .iter()
                .map(|s| StepRecord {
                    id: s.id.to_string(),
                    title: s.title.clone(),
                    status: StepStatus::Pending,
                    message: None,
                })
                .collect(),
        };
        let (state_tx, _) = watch::channel(snapshot);
        Self {
            steps,
            provisioner,
            settings: RunnerSettings::default(),
            state_tx,
        }
    }

    pub fn with_settings(mut self, settings: RunnerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.state_tx.subscribe()
    }

    /// Spawn the run on the current Tokio runtime.
    ///
    /// `on_complete` fires at most once: only when every step completed,
    /// and only after the grace interval elapsed without cancellation.
    pub fn start<F>(self, on_complete: F) -> RunHandle
    where
        F: FnOnce(&RunSnapshot) + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let state_rx = self.state_tx.subscribe();
        let task = tokio::spawn(drive(
            self.steps,
            self.provisioner,
            self.settings,
            self.state_tx,
            cancel_rx,
            on_complete,
        ));
        RunHandle {
            task: Some(task),
            cancel_tx,
            state_rx,
        }
    }
}

/// Owner of an in-flight run.
#[must_use = "dropping a RunHandle cancels the run"]
pub struct RunHandle {
    task: Option<JoinHandle<RunSnapshot>>,
    cancel_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<RunSnapshot>,
}

impl RunHandle {
    pub fn snapshot(&self) -> RunSnapshot {
        self.state_rx.borrow().clone()
    }

    pub fn status(&self, step_id: &str) -> Option<StepStatus> {
        self.state_rx.borrow().status_of(step_id)
    }

    pub fn state(&self) -> RunState {
        self.state_rx.borrow().state
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.state_rx.clone()
    }

    /// Stop the run. Idempotent; a no-op once the run task has finished.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    /// Wait for the run task to finish and return the final snapshot.
    ///
    /// For a completed run this includes the grace interval and the
    /// completion callback.
    pub async fn wait(mut self) -> Result<RunSnapshot, RunnerError> {
        match self.task.take() {
            Some(task) => Ok(task.await?),
            None => Ok(self.snapshot()),
        }
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.cancel_tx.send_replace(true);
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    // A closed channel means the handle is gone, which also cancels.
    let _ = cancel.wait_for(|c| *c).await;
}

async fn drive<F>(
    steps: Vec<PlanStep>,
    provisioner: Arc<dyn Provisioner>,
    settings: RunnerSettings,
    state: watch::Sender<RunSnapshot>,
    mut cancel: watch::Receiver<bool>,
    on_complete: F,
) -> RunSnapshot
where
    F: FnOnce(&RunSnapshot) + Send + 'static,
{
    state.send_modify(|s| s.state = RunState::Running);
    info!(steps = steps.len(), "plan run started");

    for (index, step) in steps.iter().enumerate() {
        set_status(&state, index, StepStatus::Running, None);
        debug!(step_id = step.id, status = "running", "{}", step.title);

        let result = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                set_status(&state, index, StepStatus::Pending, None);
                state.send_modify(|s| s.state = RunState::Cancelled);
                info!(step_id = step.id, "plan run cancelled");
                return state.borrow().clone();
            }
            result = step.execute(provisioner.as_ref()) => result,
        };

        let failure = match result {
            Ok(outcome) if outcome.success => {
                set_status(&state, index, StepStatus::Completed, Some(outcome.message));
                debug!(step_id = step.id, status = "completed");
                continue;
            }
            Ok(outcome) => outcome.message,
            Err(err) => err.to_string(),
        };

        warn!(
            step_id = step.id,
            status = "failed",
            "plan step {} failed: {}",
            step.title,
            failure
        );
        set_status(&state, index, StepStatus::Failed, Some(failure));
        state.send_modify(|s| s.state = RunState::Halted);
        return state.borrow().clone();
    }

    state.send_modify(|s| s.state = RunState::Complete);
    info!("plan run complete");

    tokio::select! {
        biased;
        _ = cancelled(&mut cancel) => {
            debug!("completion callback cancelled");
            return state.borrow().clone();
        }
        _ = tokio::time::sleep(settings.completion_grace) => {}
    }

    let snapshot = state.borrow().clone();
    on_complete(&snapshot);
    snapshot
}

fn set_status(
    state: &watch::Sender<RunSnapshot>,
    index: usize,
    status: StepStatus,
    message: Option<String>,
) {
    state.send_modify(|s| {
        s.current = index;
        if let Some(record) = s.steps.get_mut(index) {
            record.status = status;
            record.message = message;
        }
    });
}
