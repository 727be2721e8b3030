use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one plan step: `pending -> running -> completed | failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a whole run.
///
/// `Idle -> Running -> Complete` on the nominal path. A failed step moves
/// the run to `Halted`; disposing the run handle early moves it to
/// `Cancelled`. Both leave the unexecuted remainder `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Complete,
    Halted,
    Cancelled,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Complete => "complete",
            RunState::Halted => "halted",
            RunState::Cancelled => "cancelled",
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(
            self,
            RunState::Complete | RunState::Halted | RunState::Cancelled
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of one step within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: String,
    pub title: String,
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Point-in-time view of a run, published to observers on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub state: RunState,

    /// Index of the step currently (or last) being worked on.
    pub current: usize,

    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

impl RunSnapshot {
    pub fn status_of(&self, step_id: &str) -> Option<StepStatus> {
        self.steps
            .iter()
            .find(|s| s.id == step_id)
            .map(|s| s.status)
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// The step that halted the run, if any.
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: StepStatus) -> StepRecord {
        StepRecord {
            id: id.to_string(),
            title: id.to_string(),
            status,
            message: None,
        }
    }

    #[test]
    fn snapshot_queries() {
        let snap = RunSnapshot {
            state: RunState::Halted,
            current: 1,
            steps: vec![
                record("a", StepStatus::Completed),
                record("b", StepStatus::Failed),
                record("c", StepStatus::Pending),
            ],
        };
        assert_eq!(snap.status_of("b"), Some(StepStatus::Failed));
        assert_eq!(snap.status_of("zzz"), None);
        assert_eq!(snap.count(StepStatus::Pending), 1);
        assert_eq!(snap.failed_step().map(|s| s.id.as_str()), Some("b"));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&StepStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let json = serde_json::to_string(&RunState::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
