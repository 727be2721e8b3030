use crate::ToolInfo;
use crate::run::{RunState, StepRecord, StepStatus};
use serde::{Deserialize, Serialize};

/// On-disk record of one plan execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyDocument {
    pub schema: String,
    pub tool: ToolInfo,
    pub run_id: String,

    /// Checksum of the wizard snapshot the executed plan came from.
    pub config_checksum: String,

    pub state: RunState,

    #[serde(default)]
    pub results: Vec<StepRecord>,

    pub summary: ApplySummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApplyDocument {
    pub fn new(tool: ToolInfo, run_id: String, config_checksum: String) -> Self {
        Self {
            schema: crate::schema::PURVIEWX_APPLY_V1.to_string(),
            tool,
            run_id,
            config_checksum,
            state: RunState::Idle,
            results: vec![],
            summary: ApplySummary::default(),
            started_at: None,
            ended_at: None,
            errors: vec![],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub pending: u64,
}

impl ApplySummary {
    pub fn from_records(records: &[StepRecord]) -> Self {
        let count = |status: StepStatus| records.iter().filter(|r| r.status == status).count() as u64;
        Self {
            total: records.len() as u64,
            completed: count(StepStatus::Completed),
            failed: count(StepStatus::Failed),
            // A step interrupted mid-flight is reported with the untouched remainder.
            pending: count(StepStatus::Pending) + count(StepStatus::Running),
        }
    }
}
