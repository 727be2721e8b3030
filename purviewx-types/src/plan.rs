use crate::ToolInfo;
use crate::wizard::CloudEnvironment;
use serde::{Deserialize, Serialize};

/// On-disk form of a generated deployment plan.
///
/// Steps here are descriptions only; execution needs the live plan from
/// `purviewx-domain`, which is regenerated from the same wizard snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDocument {
    pub schema: String,
    pub tool: ToolInfo,
    pub cloud: CloudEnvironment,

    /// Checksum of the wizard snapshot the plan was generated from.
    pub config_checksum: String,

    #[serde(default)]
    pub steps: Vec<PlannedStep>,

    pub summary: PlanSummary,

    /// Label policy findings; advisory only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl PlanDocument {
    pub fn new(tool: ToolInfo, cloud: CloudEnvironment, config_checksum: String) -> Self {
        Self {
            schema: crate::schema::PURVIEWX_PLAN_V1.to_string(),
            tool,
            cloud,
            config_checksum,
            steps: vec![],
            summary: PlanSummary::default(),
            warnings: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub id: String,
    pub title: String,
    pub details: String,

    /// Advisory duration; not enforced as a timeout.
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub steps_total: u64,
    pub estimated_ms: u64,
}
