use crate::provision::{ProvisionError, ProvisionOutcome, Provisioner};
use purviewx_types::plan::PlannedStep;
use purviewx_types::{CloudEnvironment, WizardData};
use std::time::Duration;

/// Stable step identifiers. UI and run records key off these.
pub mod step_ids {
    pub const CONNECT_API: &str = "connect-api";
    pub const IMPORT_SITS: &str = "import-sits";
    pub const CONFIGURE_LABELS: &str = "configure-labels";
    pub const CONFIGURE_RETENTION: &str = "configure-retention";
    pub const CONFIGURE_DLP: &str = "configure-dlp";
    pub const ENABLE_AUDITING: &str = "enable-auditing";
    pub const CREATE_EDISCOVERY: &str = "create-ediscovery";
    pub const VERIFY_DEPLOYMENT: &str = "verify-deployment";
}

/// What a plan step provisions, with the parameters captured at plan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    ConnectApi { cloud: CloudEnvironment },
    ImportSits { count: usize },
    ConfigureLabels { count: usize },
    ConfigureRetention { enabled: usize },
    ConfigureDlp { enabled: usize },
    EnableAuditing { retention_days: u32 },
    CreateEDiscoveryCase { name: String },
    VerifyDeployment,
}

impl StepKind {
    pub fn id(&self) -> &'static str {
        match self {
            StepKind::ConnectApi { .. } => step_ids::CONNECT_API,
            StepKind::ImportSits { .. } => step_ids::IMPORT_SITS,
            StepKind::ConfigureLabels { .. } => step_ids::CONFIGURE_LABELS,
            StepKind::ConfigureRetention { .. } => step_ids::CONFIGURE_RETENTION,
            StepKind::ConfigureDlp { .. } => step_ids::CONFIGURE_DLP,
            StepKind::EnableAuditing { .. } => step_ids::ENABLE_AUDITING,
            StepKind::CreateEDiscoveryCase { .. } => step_ids::CREATE_EDISCOVERY,
            StepKind::VerifyDeployment => step_ids::VERIFY_DEPLOYMENT,
        }
    }

    pub fn title(&self) -> String {
        match self {
            StepKind::ConnectApi { .. } => "Initialize API Connections".to_string(),
            StepKind::ImportSits { count } => format!("Import {} Custom SITs", count),
            StepKind::ConfigureLabels { count } => {
                format!("Configure {} Sensitivity Labels", count)
            }
            StepKind::ConfigureRetention { enabled } => {
                format!("Enable {} Retention Policies", enabled)
            }
            StepKind::ConfigureDlp { enabled } => format!("Enable {} DLP Policies", enabled),
            StepKind::EnableAuditing { .. } => "Enable Unified Auditing".to_string(),
            StepKind::CreateEDiscoveryCase { .. } => "Create Initial eDiscovery Case".to_string(),
            StepKind::VerifyDeployment => "Finalize and Verify Deployment".to_string(),
        }
    }

    pub fn details(&self) -> String {
        match self {
            StepKind::ConnectApi { cloud } => format!("Connecting to {} endpoints.", cloud),
            StepKind::ImportSits { .. } => {
                "Uploading XML definitions for custom sensitive info types.".to_string()
            }
            StepKind::ConfigureLabels { .. } => {
                "Creating and ordering sensitivity labels.".to_string()
            }
            StepKind::ConfigureRetention { .. } => {
                "Applying data retention policies across specified locations.".to_string()
            }
            StepKind::ConfigureDlp { .. } => {
                "Applying data loss prevention policies to protect sensitive data.".to_string()
            }
            StepKind::EnableAuditing { retention_days } => {
                format!("Setting audit log retention to {} days.", retention_days)
            }
            StepKind::CreateEDiscoveryCase { name } => {
                format!("Creating case named \"{}\".", name)
            }
            StepKind::VerifyDeployment => "Running post-deployment health checks.".to_string(),
        }
    }

    /// Advisory latency of the provisioning call. Not a timeout.
    pub fn duration(&self) -> Duration {
        let ms = match self {
            StepKind::ConnectApi { .. } => 1200,
            StepKind::ImportSits { count } => 1500 + 200 * *count as u64,
            StepKind::ConfigureLabels { .. } => 2000,
            StepKind::ConfigureRetention { .. } => 2500,
            StepKind::ConfigureDlp { .. } => 3000,
            StepKind::EnableAuditing { .. } => 1000,
            StepKind::CreateEDiscoveryCase { .. } => 1800,
            StepKind::VerifyDeployment => 1500,
        };
        Duration::from_millis(ms)
    }

    /// Short past-tense description of the work, used in outcome messages.
    pub fn action_label(&self) -> String {
        match self {
            StepKind::ConnectApi { .. } => "Initialized API Connections".to_string(),
            StepKind::ImportSits { count } => format!("Imported {} SITs", count),
            StepKind::ConfigureLabels { .. } => "Configured Sensitivity Labels".to_string(),
            StepKind::ConfigureRetention { enabled } => {
                format!("Enabled {} Retention Policies", enabled)
            }
            StepKind::ConfigureDlp { enabled } => format!("Enabled {} DLP Policies", enabled),
            StepKind::EnableAuditing { .. } => "Enabled Unified Auditing".to_string(),
            StepKind::CreateEDiscoveryCase { .. } => "Created eDiscovery Case".to_string(),
            StepKind::VerifyDeployment => "Deployment Verified".to_string(),
        }
    }
}

/// One unit of provisioning work in a deployment plan.
///
/// Generated on demand, consumed once by a runner and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub id: &'static str,
    pub title: String,
    pub details: String,
    pub duration: Duration,
    pub kind: StepKind,
}

impl PlanStep {
    pub fn new(kind: StepKind) -> Self {
        Self {
            id: kind.id(),
            title: kind.title(),
            details: kind.details(),
            duration: kind.duration(),
            kind,
        }
    }

    /// Run this step's provisioning call.
    pub async fn execute(
        &self,
        provisioner: &dyn Provisioner,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        provisioner.provision(self).await
    }

    pub fn to_planned(&self) -> PlannedStep {
        PlannedStep {
            id: self.id.to_string(),
            title: self.title.clone(),
            details: self.details.clone(),
            duration_ms: self.duration.as_millis() as u64,
        }
    }
}

/// Build the ordered deployment plan for a wizard snapshot.
///
/// Connections come first and verification last; optional steps appear only
/// when the snapshot asks for them. The same snapshot always yields the same
/// step sequence, and ids are unique within a plan.
pub fn generate_plan(data: &WizardData) -> Vec<PlanStep> {
    let mut kinds = vec![StepKind::ConnectApi {
        cloud: data.cloud_environment,
    }];

    if !data.custom_sits.is_empty() {
        kinds.push(StepKind::ImportSits {
            count: data.custom_sits.len(),
        });
    }

    kinds.push(StepKind::ConfigureLabels {
        count: data.sensitivity_labels.len(),
    });

    let enabled_retention = data.enabled_retention_policies().count();
    if enabled_retention > 0 {
        kinds.push(StepKind::ConfigureRetention {
            enabled: enabled_retention,
        });
    }

    let enabled_dlp = data.enabled_dlp_policies().count();
    if enabled_dlp > 0 {
        kinds.push(StepKind::ConfigureDlp {
            enabled: enabled_dlp,
        });
    }

    if data.audit_settings.is_enabled {
        kinds.push(StepKind::EnableAuditing {
            retention_days: data.audit_settings.retention_days,
        });
    }

    if data.e_discovery_case.create {
        kinds.push(StepKind::CreateEDiscoveryCase {
            name: data.e_discovery_case.name.clone(),
        });
    }

    kinds.push(StepKind::VerifyDeployment);

    kinds.into_iter().map(PlanStep::new).collect()
}

/// Sum of advisory step durations.
pub fn estimated_duration(plan: &[PlanStep]) -> Duration {
    plan.iter().map(|s| s.duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use purviewx_types::CustomSit;

    fn sit(id: &str) -> CustomSit {
        CustomSit {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            keywords: vec![],
            confidence: 75,
            xml_content: String::new(),
        }
    }

    #[test]
    fn sit_import_duration_scales_with_count() {
        let mut data = WizardData::default();
        data.custom_sits = vec![sit("a"), sit("b"), sit("c")];
        let plan = generate_plan(&data);
        let step = plan.iter().find(|s| s.id == step_ids::IMPORT_SITS).unwrap();
        assert_eq!(step.duration, Duration::from_millis(2100));
        assert_eq!(step.title, "Import 3 Custom SITs");
    }

    #[test]
    fn connect_details_name_the_cloud() {
        let mut data = WizardData::default();
        data.cloud_environment = CloudEnvironment::GccHigh;
        let plan = generate_plan(&data);
        assert_eq!(plan[0].details, "Connecting to GCC High endpoints.");
    }

    #[test]
    fn ediscovery_details_quote_case_name() {
        let plan = generate_plan(&WizardData::default());
        let step = plan
            .iter()
            .find(|s| s.id == step_ids::CREATE_EDISCOVERY)
            .unwrap();
        assert_eq!(
            step.details,
            "Creating case named \"Initial Investigation Case 2024\"."
        );
    }

    #[test]
    fn labels_step_is_emitted_even_without_labels() {
        let mut data = WizardData::default();
        data.sensitivity_labels.clear();
        let plan = generate_plan(&data);
        let step = plan
            .iter()
            .find(|s| s.id == step_ids::CONFIGURE_LABELS)
            .unwrap();
        assert_eq!(step.title, "Configure 0 Sensitivity Labels");
    }

    #[test]
    fn estimated_duration_sums_steps() {
        let plan = generate_plan(&WizardData::default());
        // connect 1200 + labels 2000 + retention 2500 + dlp 3000 + audit 1000
        // + ediscovery 1800 + verify 1500
        assert_eq!(estimated_duration(&plan), Duration::from_millis(13_000));
    }

    #[test]
    fn to_planned_carries_millis() {
        let plan = generate_plan(&WizardData::default());
        let planned = plan[0].to_planned();
        assert_eq!(planned.id, "connect-api");
        assert_eq!(planned.duration_ms, 1200);
    }
}
