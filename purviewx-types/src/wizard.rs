use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sentinel `durationDays` value for indefinite retention.
pub const INDEFINITE_RETENTION_DAYS: i64 = -1;

/// Audit log retention choices offered by the wizard, in days.
pub const AUDIT_RETENTION_DAYS: [u32; 5] = [90, 180, 365, 1825, 3650];

/// Microsoft cloud the tenant lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CloudEnvironment {
    #[serde(rename = "Commercial")]
    Commercial,
    #[serde(rename = "GCC")]
    Gcc,
    #[serde(rename = "GCC High")]
    GccHigh,
    #[serde(rename = "DoD")]
    Dod,
}

impl CloudEnvironment {
    pub const ALL: [CloudEnvironment; 4] = [
        CloudEnvironment::Commercial,
        CloudEnvironment::Gcc,
        CloudEnvironment::GccHigh,
        CloudEnvironment::Dod,
    ];

    /// Display name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            CloudEnvironment::Commercial => "Commercial",
            CloudEnvironment::Gcc => "GCC",
            CloudEnvironment::GccHigh => "GCC High",
            CloudEnvironment::Dod => "DoD",
        }
    }
}

impl fmt::Display for CloudEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cloud environment \"{value}\": must be one of [Commercial, GCC, GCC High, DoD]")]
pub struct ParseCloudError {
    pub value: String,
}

impl FromStr for CloudEnvironment {
    type Err = ParseCloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CloudEnvironment::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCloudError {
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Baseline,
    Enhanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSit {
    pub id: String,
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    pub confidence: u32,

    /// Raw rule-pack text the SIT was imported from.
    #[serde(default)]
    pub xml_content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityLabel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub priority: i64,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    pub id: String,
    pub name: String,
    pub description: String,
    /// `-1` means indefinite.
    pub duration_days: i64,
    pub is_enabled: bool,
}

impl RetentionPolicy {
    pub fn is_indefinite(&self) -> bool {
        self.duration_days == INDEFINITE_RETENTION_DAYS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlpPolicy {
    pub id: String,
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub locations: Vec<String>,

    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSettings {
    pub is_enabled: bool,
    pub retention_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EDiscoveryCase {
    pub create: bool,
    pub name: String,
}

/// Configuration collected by the wizard.
///
/// Treated as an immutable snapshot by the planner, executor and binder
/// generator; only the session layer edits it, and only between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardData {
    #[serde(default)]
    pub plan_type: PlanType,

    pub cloud_environment: CloudEnvironment,

    /// Permission scope -> granted.
    #[serde(default)]
    pub consents: BTreeMap<String, bool>,

    #[serde(default)]
    pub custom_sits: Vec<CustomSit>,

    #[serde(default)]
    pub sensitivity_labels: Vec<SensitivityLabel>,

    #[serde(default)]
    pub retention_policies: Vec<RetentionPolicy>,

    #[serde(default)]
    pub dlp_policies: Vec<DlpPolicy>,

    pub audit_settings: AuditSettings,

    #[serde(rename = "eDiscoveryCase")]
    pub e_discovery_case: EDiscoveryCase,
}

impl WizardData {
    pub fn enabled_retention_policies(&self) -> impl Iterator<Item = &RetentionPolicy> {
        self.retention_policies.iter().filter(|p| p.is_enabled)
    }

    pub fn enabled_dlp_policies(&self) -> impl Iterator<Item = &DlpPolicy> {
        self.dlp_policies.iter().filter(|p| p.is_enabled)
    }

    /// Scopes whose consent flag is set, in key order.
    pub fn granted_scopes(&self) -> impl Iterator<Item = &str> {
        self.consents
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(scope, _)| scope.as_str())
    }

    /// Labels ordered by descending priority. Ties keep their wizard order.
    pub fn labels_by_priority(&self) -> Vec<&SensitivityLabel> {
        let mut labels: Vec<&SensitivityLabel> = self.sensitivity_labels.iter().collect();
        labels.sort_by(|a, b| b.priority.cmp(&a.priority));
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_round_trips_through_display_names() {
        for cloud in CloudEnvironment::ALL {
            assert_eq!(cloud.as_str().parse::<CloudEnvironment>().unwrap(), cloud);
        }
    }

    #[test]
    fn cloud_parse_rejects_unknown_value() {
        let err = "gcc high".parse::<CloudEnvironment>().unwrap_err();
        assert_eq!(err.value, "gcc high");
        assert!(err.to_string().contains("GCC High"));
    }

    #[test]
    fn labels_sort_descending_and_stable_on_ties() {
        let label = |id: &str, priority| SensitivityLabel {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            color: "#000000".to_string(),
            priority,
            is_enabled: true,
        };
        let data = WizardData {
            sensitivity_labels: vec![label("a", 1), label("b", 3), label("c", 1), label("d", 2)],
            ..WizardData::default()
        };
        let ids: Vec<&str> = data
            .labels_by_priority()
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
        // Source order is untouched.
        assert_eq!(data.sensitivity_labels[0].id, "a");
    }

    #[test]
    fn granted_scopes_skip_revoked_entries() {
        let mut data = WizardData::default();
        data.consents.insert("User.Read.All".to_string(), true);
        data.consents.insert("Policy.Read.All".to_string(), false);
        let scopes: Vec<&str> = data.granted_scopes().collect();
        assert_eq!(scopes, vec!["User.Read.All"]);
    }
}
