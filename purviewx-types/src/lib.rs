//! Shared DTOs (schemas-as-code) for the purviewx workspace.
//!
//! # Design constraints
//! - Wizard types mirror the camelCase JSON emitted by the wizard session layer.
//! - Artifact types (plan/apply/binder) are intended to be serialized to disk.
//! - Prefer adding optional fields over changing semantics.

pub mod apply;
pub mod binder;
pub mod defaults;
pub mod plan;
pub mod run;
pub mod wizard;

pub use binder::EvidenceBinder;
pub use wizard::{
    AuditSettings, CloudEnvironment, CustomSit, DlpPolicy, EDiscoveryCase, PlanType,
    RetentionPolicy, SensitivityLabel, WizardData,
};

/// Schema identifiers.
pub mod schema {
    pub const PURVIEWX_PLAN_V1: &str = "purviewx.plan.v1";
    pub const PURVIEWX_APPLY_V1: &str = "purviewx.apply.v1";
    pub const PURVIEWX_BINDER_V1: &str = "purviewx.binder.v1";
    pub const PURVIEWX_MANIFEST_V1: &str = "purviewx.manifest.v1";
}

/// Identity of the tool that produced an artifact.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
