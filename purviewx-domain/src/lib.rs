//! Deployment planning for purviewx.
//!
//! [`generate_plan`] turns a wizard snapshot into an ordered list of
//! [`PlanStep`]s. Each step's provisioning work goes through the
//! [`Provisioner`] port; [`SimulatedProvisioner`] stands in for the real
//! tenant APIs.

pub mod cloud;
pub mod planner;
pub mod provision;
pub mod sit_import;
pub mod validate;

pub use planner::{PlanStep, StepKind, estimated_duration, generate_plan, step_ids};
pub use provision::{
    ProvisionError, ProvisionOutcome, Provisioner, SimulatedProvisioner, scaled,
};
pub use sit_import::{SitImportError, add_custom_sit, parse_sit_rule_pack};
pub use validate::{ValidationError, ValidationIssue, validate_wizard, verify_label_policy};
