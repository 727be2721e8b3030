//! Input guards applied before a wizard snapshot reaches the planner.
//!
//! Planning, checksumming and rendering assume these hold; they do not
//! re-check them.

use purviewx_types::wizard::AUDIT_RETENTION_DAYS;
use purviewx_types::{SensitivityLabel, WizardData};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wizard data ({} issue(s)): {}", .issues.len(), join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn validate_wizard(data: &WizardData) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    check_unique_ids(
        "sensitivityLabels",
        data.sensitivity_labels.iter().map(|l| l.id.as_str()),
        &mut issues,
    );
    check_unique_ids(
        "customSits",
        data.custom_sits.iter().map(|s| s.id.as_str()),
        &mut issues,
    );
    check_unique_ids(
        "retentionPolicies",
        data.retention_policies.iter().map(|p| p.id.as_str()),
        &mut issues,
    );
    check_unique_ids(
        "dlpPolicies",
        data.dlp_policies.iter().map(|p| p.id.as_str()),
        &mut issues,
    );

    for policy in &data.retention_policies {
        if !policy.is_indefinite() && policy.duration_days <= 0 {
            issues.push(ValidationIssue {
                field: format!("retentionPolicies[{}].durationDays", policy.id),
                message: format!(
                    "must be positive or -1 for indefinite, got {}",
                    policy.duration_days
                ),
            });
        }
    }

    if !AUDIT_RETENTION_DAYS.contains(&data.audit_settings.retention_days) {
        issues.push(ValidationIssue {
            field: "auditSettings.retentionDays".to_string(),
            message: format!(
                "{} is not one of {:?}",
                data.audit_settings.retention_days, AUDIT_RETENTION_DAYS
            ),
        });
    }

    if data.e_discovery_case.create && data.e_discovery_case.name.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "eDiscoveryCase.name".to_string(),
            message: "required when create is set".to_string(),
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

fn check_unique_ids<'a>(
    field: &str,
    ids: impl Iterator<Item = &'a str>,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.trim().is_empty() {
            issues.push(ValidationIssue {
                field: field.to_string(),
                message: "empty id".to_string(),
            });
        } else if !seen.insert(id) {
            issues.push(ValidationIssue {
                field: field.to_string(),
                message: format!("duplicate id {}", id),
            });
        }
    }
}

/// Best-practice findings for a single label. Empty means the label passes.
pub fn verify_label(label: &SensitivityLabel, all: &[SensitivityLabel]) -> Vec<String> {
    let mut issues = Vec::new();

    if label.name == "Highly Confidential"
        && let Some(confidential) = all.iter().find(|l| l.name == "Confidential")
        && label.priority <= confidential.priority
    {
        issues.push(
            "\"Highly Confidential\" must have a higher priority (be ordered above) \"Confidential\"."
                .to_string(),
        );
    }

    if label.description.trim().is_empty() {
        issues.push("Label description should not be empty.".to_string());
    }

    issues
}

/// Label findings across the whole snapshot, prefixed with the label name.
///
/// Advisory: callers surface these as warnings and still plan.
pub fn verify_label_policy(data: &WizardData) -> Vec<String> {
    data.sensitivity_labels
        .iter()
        .flat_map(|label| {
            verify_label(label, &data.sensitivity_labels)
                .into_iter()
                .map(move |issue| format!("label {}: {}", label.name, issue))
        })
        .collect()
}
