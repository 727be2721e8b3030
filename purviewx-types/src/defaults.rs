//! Baseline configuration and the admin consent catalog.

use crate::wizard::{
    AuditSettings, CloudEnvironment, DlpPolicy, EDiscoveryCase, PlanType, RetentionPolicy,
    SensitivityLabel, WizardData,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// A group of permission scopes granted together on the consent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureScope {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub scopes: &'static [&'static str],
}

pub const FEATURE_SCOPES: [FeatureScope; 4] = [
    FeatureScope {
        key: "graph",
        title: "Microsoft Graph API",
        description: "Provides core access to organizational data like users and groups.",
        scopes: &["User.Read.All", "Group.Read.All", "Directory.Read.All"],
    },
    FeatureScope {
        key: "security",
        title: "Security & Compliance",
        description: "Allows reading and writing security policies, including DLP and sensitivity labels.",
        scopes: &[
            "SecurityEvents.ReadWrite.All",
            "Policy.Read.All",
            "InformationProtectionPolicy.ReadWrite",
        ],
    },
    FeatureScope {
        key: "ediscovery",
        title: "eDiscovery",
        description: "Enables creation and management of eDiscovery cases and holds.",
        scopes: &["eDiscovery.ReadWrite.All"],
    },
    FeatureScope {
        key: "powershell",
        title: "Exchange Online PowerShell",
        description: "Required for advanced configuration tasks and automation scripts.",
        scopes: &["Exchange.ManageAsApp"],
    },
];

pub fn feature_scope(key: &str) -> Option<&'static FeatureScope> {
    FEATURE_SCOPES.iter().find(|f| f.key == key)
}

/// Mark every scope of `feature` as granted.
pub fn grant_feature(consents: &mut BTreeMap<String, bool>, feature: &FeatureScope) {
    for scope in feature.scopes {
        consents.insert((*scope).to_string(), true);
    }
}

/// True when every scope of `feature` is granted.
pub fn feature_connected(consents: &BTreeMap<String, bool>, feature: &FeatureScope) -> bool {
    feature
        .scopes
        .iter()
        .all(|s| consents.get(*s).copied().unwrap_or(false))
}

pub fn baseline_sensitivity_labels() -> Vec<SensitivityLabel> {
    let label = |id: &str, name: &str, description: &str, color: &str, priority| SensitivityLabel {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        color: color.to_string(),
        priority,
        is_enabled: true,
    };
    vec![
        label("sl1", "Public", "Data is public and can be shared freely.", "#9CA3AF", 0),
        label("sl2", "General", "General business data, not sensitive.", "#3B82F6", 1),
        label(
            "sl3",
            "Confidential",
            "Sensitive business data, limited internal access.",
            "#F59E0B",
            2,
        ),
        label(
            "sl4",
            "Highly Confidential",
            "Very sensitive data, restricted to named users.",
            "#EF4444",
            3,
        ),
    ]
}

pub fn baseline_retention_policies() -> Vec<RetentionPolicy> {
    let policy = |id: &str, name: &str, description: &str, duration_days, is_enabled| {
        RetentionPolicy {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            duration_days,
            is_enabled,
        }
    };
    vec![
        policy(
            "rp1",
            "Retain Financial Records for 7 Years",
            "Applies to financial documents in SharePoint and OneDrive.",
            2555,
            true,
        ),
        policy(
            "rp2",
            "Retain Project Documents for 5 Years",
            "Keeps project-related materials for 5 years after last modification.",
            1825,
            false,
        ),
        policy(
            "rp3",
            "Delete Teams Chat History after 90 Days",
            "Reduces data sprawl by cleaning up old chat messages.",
            90,
            false,
        ),
    ]
}

pub fn baseline_dlp_policies() -> Vec<DlpPolicy> {
    let policy = |id: &str, name: &str, description: &str, locations: &[&str], is_enabled| {
        DlpPolicy {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            locations: locations.iter().map(|l| l.to_string()).collect(),
            is_enabled,
        }
    };
    vec![
        policy(
            "dlp1",
            "U.S. Financial Data Protection",
            "Detects and blocks sharing of credit card numbers and bank account info.",
            &["Exchange", "SharePoint", "OneDrive", "Teams"],
            true,
        ),
        policy(
            "dlp2",
            "Health Information (HIPAA)",
            "Prevents sharing of protected health information (PHI) outside the organization.",
            &["Exchange", "Teams"],
            false,
        ),
        policy(
            "dlp3",
            "Block Executable Files on Endpoints",
            "Prevents users from downloading or transferring executable files.",
            &["Devices"],
            false,
        ),
    ]
}

impl Default for WizardData {
    /// The wizard's starting configuration.
    fn default() -> Self {
        Self {
            plan_type: PlanType::Baseline,
            cloud_environment: CloudEnvironment::Commercial,
            consents: BTreeMap::new(),
            custom_sits: Vec::new(),
            sensitivity_labels: baseline_sensitivity_labels(),
            retention_policies: baseline_retention_policies(),
            dlp_policies: baseline_dlp_policies(),
            audit_settings: AuditSettings {
                is_enabled: true,
                retention_days: 365,
            },
            e_discovery_case: EDiscoveryCase {
                create: true,
                name: "Initial Investigation Case 2024".to_string(),
            },
        }
    }
}
