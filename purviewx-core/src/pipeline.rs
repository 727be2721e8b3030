//! Core plan, apply and binder pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: the wizard snapshot, previous
//! binders and all written artifacts go through the port traits.

use crate::adapters::BINDER_JSON;
use crate::ports::{BinderStore, WizardSource, WritePort};
use crate::settings::{ApplySettings, BinderSettings, PlanSettings};
use anyhow::Context;
use camino::Utf8Path;
use chrono::{SecondsFormat, Utc};
use purviewx_domain::{
    SimulatedProvisioner, ValidationError, estimated_duration, generate_plan, scaled,
    validate_wizard, verify_label_policy,
};
use purviewx_evidence::{binder_file_name, generate_binder, next_version};
use purviewx_render::{render_binder_html, render_plan_md, render_run_md};
use purviewx_runner::{PlanRunner, RunnerSettings};
use purviewx_types::apply::{ApplyDocument, ApplySummary};
use purviewx_types::binder::{ArtifactManifest, BinderDocument, ManifestEntry};
use purviewx_types::plan::{PlanDocument, PlanSummary};
use purviewx_types::run::RunState;
use purviewx_types::{CloudEnvironment, EvidenceBinder, ToolInfo, WizardData};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 2 = halted run or invalid
/// input, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("deployment halted: step {step_id} failed: {message}")]
    RunHalted { step_id: String, message: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::RunHalted { .. } | ToolError::Invalid(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Load, override and validate the wizard snapshot.
pub fn prepare_wizard(
    source: &dyn WizardSource,
    cloud: Option<CloudEnvironment>,
) -> Result<WizardData, ToolError> {
    let mut data = source.load_wizard()?;
    if let Some(cloud) = cloud {
        debug!(from = %data.cloud_environment, to = %cloud, "cloud environment overridden");
        data.cloud_environment = cloud;
    }
    validate_wizard(&data)?;
    Ok(data)
}

/// Outcome of `run_plan`.
pub struct PlanOutcome {
    pub plan: PlanDocument,
    pub data: WizardData,
}

/// Run the plan pipeline.
///
/// The caller is responsible for writing artifacts to disk (via `WritePort`)
/// or the convenience `write_plan_artifacts` helper.
pub fn run_plan(
    settings: &PlanSettings,
    source: &dyn WizardSource,
    tool: ToolInfo,
) -> Result<PlanOutcome, ToolError> {
    let data = prepare_wizard(source, settings.cloud)?;
    let plan = plan_document(&data, tool)?;
    info!(
        steps = plan.summary.steps_total,
        checksum = %plan.config_checksum,
        "plan generated"
    );
    Ok(PlanOutcome { plan, data })
}

fn plan_document(data: &WizardData, tool: ToolInfo) -> anyhow::Result<PlanDocument> {
    let steps = generate_plan(data);
    let checksum = purviewx_hash::checksum(data).context("checksum wizard snapshot")?;
    let mut doc = PlanDocument::new(tool, data.cloud_environment, checksum);
    doc.summary = PlanSummary {
        steps_total: steps.len() as u64,
        estimated_ms: estimated_duration(&steps).as_millis() as u64,
    };
    doc.steps = steps.iter().map(|s| s.to_planned()).collect();
    doc.warnings = verify_label_policy(data);
    for w in &doc.warnings {
        warn!("{}", w);
    }
    Ok(doc)
}

pub fn write_plan_artifacts(
    outcome: &PlanOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let plan_json = serde_json::to_string_pretty(&outcome.plan).context("serialize plan")?;
    writer.write_file(&out_dir.join("plan.json"), plan_json.as_bytes())?;

    let plan_md = render_plan_md(&outcome.plan);
    writer.write_file(&out_dir.join("plan.md"), plan_md.as_bytes())?;

    info!("wrote plan to {}", out_dir);
    Ok(())
}

/// Outcome of `run_apply`.
pub struct ApplyOutcome {
    pub apply: ApplyDocument,

    /// A step failed; the remainder of the plan was not executed.
    pub halted: bool,
}

impl ApplyOutcome {
    /// `Err(RunHalted)` for a halted run, naming the failed step.
    pub fn halt_error(&self) -> Option<ToolError> {
        if !self.halted {
            return None;
        }
        let failed = self
            .apply
            .results
            .iter()
            .find(|r| r.status == purviewx_types::run::StepStatus::Failed)?;
        Some(ToolError::RunHalted {
            step_id: failed.id.clone(),
            message: failed.message.clone().unwrap_or_default(),
        })
    }
}

/// Execute the plan for the wizard snapshot against the simulated tenant.
///
/// Returns once the run finished, including the completion grace interval
/// for a successful run. A halted run is still `Ok`; inspect
/// [`ApplyOutcome::halted`].
pub async fn run_apply(
    settings: &ApplySettings,
    source: &dyn WizardSource,
    tool: ToolInfo,
) -> Result<ApplyOutcome, ToolError> {
    let data = prepare_wizard(source, settings.cloud)?;
    let steps = generate_plan(&data);

    for id in &settings.fail_steps {
        if !steps.iter().any(|s| s.id == id.as_str()) {
            warn!(step_id = %id, "injected failure targets a step not in this plan");
        }
    }

    let provisioner = SimulatedProvisioner::new(settings.time_scale)
        .failing_on(settings.fail_steps.iter().cloned());
    let runner = PlanRunner::new(steps, Arc::new(provisioner)).with_settings(RunnerSettings {
        completion_grace: scaled(settings.completion_grace, settings.time_scale),
    });

    let run_id = uuid::Uuid::new_v4().to_string();
    let checksum = purviewx_hash::checksum(&data).context("checksum wizard snapshot")?;
    let mut apply = ApplyDocument::new(tool, run_id, checksum);
    apply.started_at = Some(now());

    let handle = runner.start(|snapshot| {
        info!(steps = snapshot.steps.len(), "deployment complete");
    });
    let snapshot = handle.wait().await.context("wait for plan run")?;

    apply.ended_at = Some(now());
    apply.state = snapshot.state;
    apply.summary = ApplySummary::from_records(&snapshot.steps);
    if let Some(failed) = snapshot.failed_step() {
        apply.errors.push(format!(
            "step {} failed: {}",
            failed.id,
            failed.message.as_deref().unwrap_or("no message")
        ));
    }
    apply.results = snapshot.steps;

    let halted = apply.state == RunState::Halted;
    if halted {
        warn!(run_id = %apply.run_id, "deployment halted");
    }
    Ok(ApplyOutcome { apply, halted })
}

pub fn write_apply_artifacts(
    outcome: &ApplyOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let apply_json = serde_json::to_string_pretty(&outcome.apply).context("serialize apply")?;
    writer.write_file(&out_dir.join("apply.json"), apply_json.as_bytes())?;

    let apply_md = render_run_md(&outcome.apply);
    writer.write_file(&out_dir.join("apply.md"), apply_md.as_bytes())?;

    info!("wrote apply artifacts to {}", out_dir);
    Ok(())
}

/// Outcome of `run_binder`.
pub struct BinderOutcome {
    pub binder: EvidenceBinder,
    pub document: BinderDocument,
    pub report_html: String,
    pub report_file: String,
}

/// Generate the next evidence binder and render its report.
pub async fn run_binder(
    settings: &BinderSettings,
    source: &dyn WizardSource,
    store: &dyn BinderStore,
    tool: ToolInfo,
) -> Result<BinderOutcome, ToolError> {
    let data = prepare_wizard(source, settings.cloud)?;
    let version = match settings.version {
        Some(v) => v,
        None => next_version(store.latest()?.as_ref()).context("next binder version")?,
    };

    let delay = scaled(settings.packaging_delay, settings.time_scale);
    let binder = generate_binder(&data, version, delay)
        .await
        .context("generate evidence binder")?;
    let report_html = render_binder_html(&binder);
    let report_file = binder_file_name(binder.version);
    let document = BinderDocument::new(tool, binder.clone());

    Ok(BinderOutcome {
        binder,
        document,
        report_html,
        report_file,
    })
}

/// Write the HTML report, `binder.json` and `manifest.json`.
///
/// The manifest records a SHA-256 of each other file written.
pub fn write_binder_artifacts(
    outcome: &BinderOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<ArtifactManifest> {
    writer.create_dir_all(out_dir)?;

    let binder_json =
        serde_json::to_string_pretty(&outcome.document).context("serialize binder")?;
    let files: [(&str, &[u8]); 2] = [
        (outcome.report_file.as_str(), outcome.report_html.as_bytes()),
        (BINDER_JSON, binder_json.as_bytes()),
    ];

    let mut manifest = ArtifactManifest {
        schema: purviewx_types::schema::PURVIEWX_MANIFEST_V1.to_string(),
        binder_version: outcome.binder.version,
        files: Vec::new(),
    };
    for (name, bytes) in files {
        writer.write_file(&out_dir.join(name), bytes)?;
        manifest.files.push(ManifestEntry {
            path: name.to_string(),
            sha256: purviewx_hash::sha256_hex(bytes),
            bytes: bytes.len() as u64,
        });
    }

    let manifest_json = serde_json::to_string_pretty(&manifest).context("serialize manifest")?;
    writer.write_file(&out_dir.join("manifest.json"), manifest_json.as_bytes())?;

    info!(
        version = outcome.binder.version,
        "wrote evidence binder to {}", out_dir
    );
    Ok(manifest)
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
