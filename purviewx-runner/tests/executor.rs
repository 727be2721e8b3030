//! Executor state machine behaviour on virtual time.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use purviewx_domain::{
    PlanStep, ProvisionError, ProvisionOutcome, Provisioner, SimulatedProvisioner, generate_plan,
};
use purviewx_runner::{PlanRunner, RunnerSettings};
use purviewx_types::WizardData;
use purviewx_types::run::{RunState, StepStatus};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Records each provisioning interval; optionally fails some steps.
#[derive(Default)]
struct RecordingProvisioner {
    intervals: Mutex<Vec<(String, Instant, Instant)>>,
    reject: BTreeSet<String>,
    report_failure: BTreeSet<String>,
}

impl RecordingProvisioner {
    fn rejecting(id: &str) -> Self {
        Self {
            reject: [id.to_string()].into(),
            ..Self::default()
        }
    }

    fn reporting_failure(id: &str) -> Self {
        Self {
            report_failure: [id.to_string()].into(),
            ..Self::default()
        }
    }

    fn started_ids(&self) -> Vec<String> {
        self.intervals
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl Provisioner for RecordingProvisioner {
    async fn provision(&self, step: &PlanStep) -> Result<ProvisionOutcome, ProvisionError> {
        let start = Instant::now();
        tokio::time::sleep(step.duration).await;
        let end = Instant::now();
        self.intervals
            .lock()
            .unwrap()
            .push((step.id.to_string(), start, end));

        if self.reject.contains(step.id) {
            return Err(ProvisionError::Rejected {
                step_id: step.id.to_string(),
                message: "tenant refused".to_string(),
            });
        }
        if self.report_failure.contains(step.id) {
            return Ok(ProvisionOutcome::failure("quota exceeded"));
        }
        Ok(ProvisionOutcome::success(format!("{} done", step.id)))
    }
}

/// Never resolves.
struct HangingProvisioner;

#[async_trait]
impl Provisioner for HangingProvisioner {
    async fn provision(&self, _step: &PlanStep) -> Result<ProvisionOutcome, ProvisionError> {
        std::future::pending().await
    }
}

fn counter() -> (Arc<AtomicUsize>, impl FnOnce(&purviewx_types::run::RunSnapshot) + Send + 'static) {
    let fired = Arc::new(AtomicUsize::new(0));
    let hook = {
        let fired = fired.clone();
        move |_: &purviewx_types::run::RunSnapshot| {
            fired.fetch_add(1, Ordering::SeqCst);
        }
    };
    (fired, hook)
}

#[tokio::test(start_paused = true)]
async fn nominal_run_completes_every_step_in_order() {
    let plan = generate_plan(&WizardData::default());
    let expected: Vec<String> = plan.iter().map(|s| s.id.to_string()).collect();
    let provisioner = Arc::new(RecordingProvisioner::default());
    let (fired, hook) = counter();

    let runner = PlanRunner::new(plan, provisioner.clone());
    assert_eq!(runner.snapshot().state, RunState::Idle);
    assert_eq!(runner.snapshot().count(StepStatus::Pending), expected.len());

    let snapshot = runner.start(hook).wait().await.unwrap();

    assert_eq!(snapshot.state, RunState::Complete);
    assert_eq!(snapshot.count(StepStatus::Completed), expected.len());
    assert_eq!(provisioner.started_ids(), expected);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(
        snapshot.steps[0].message.as_deref(),
        Some("connect-api done")
    );
}

#[tokio::test(start_paused = true)]
async fn step_intervals_never_overlap() {
    let plan = generate_plan(&WizardData::default());
    let provisioner = Arc::new(RecordingProvisioner::default());
    let (_, hook) = counter();

    PlanRunner::new(plan, provisioner.clone())
        .start(hook)
        .wait()
        .await
        .unwrap();

    let intervals = provisioner.intervals.lock().unwrap();
    for pair in intervals.windows(2) {
        let (_, _, prev_end) = &pair[0];
        let (_, next_start, _) = &pair[1];
        assert!(next_start >= prev_end);
    }
}

#[tokio::test(start_paused = true)]
async fn rejected_step_halts_and_leaves_rest_pending() {
    let plan = generate_plan(&WizardData::default());
    let provisioner = Arc::new(RecordingProvisioner::rejecting("configure-retention"));
    let (fired, hook) = counter();

    let snapshot = PlanRunner::new(plan, provisioner.clone())
        .start(hook)
        .wait()
        .await
        .unwrap();

    assert_eq!(snapshot.state, RunState::Halted);
    let statuses: Vec<(&str, StepStatus)> = snapshot
        .steps
        .iter()
        .map(|s| (s.id.as_str(), s.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("connect-api", StepStatus::Completed),
            ("configure-labels", StepStatus::Completed),
            ("configure-retention", StepStatus::Failed),
            ("configure-dlp", StepStatus::Pending),
            ("enable-auditing", StepStatus::Pending),
            ("create-ediscovery", StepStatus::Pending),
            ("verify-deployment", StepStatus::Pending),
        ]
    );
    let failed = snapshot.failed_step().unwrap();
    assert!(failed.message.as_deref().unwrap().contains("tenant refused"));
    // Not retried, and nothing after it ran.
    assert_eq!(
        provisioner.started_ids(),
        vec!["connect-api", "configure-labels", "configure-retention"]
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failure_outcome_halts_like_a_rejection() {
    let plan = generate_plan(&WizardData::default());
    let provisioner = Arc::new(RecordingProvisioner::reporting_failure("connect-api"));
    let (fired, hook) = counter();

    let snapshot = PlanRunner::new(plan, provisioner)
        .start(hook)
        .wait()
        .await
        .unwrap();

    assert_eq!(snapshot.state, RunState::Halted);
    assert_eq!(snapshot.status_of("connect-api"), Some(StepStatus::Failed));
    assert_eq!(snapshot.count(StepStatus::Pending), snapshot.steps.len() - 1);
    assert_eq!(
        snapshot.steps[0].message.as_deref(),
        Some("quota exceeded")
    );
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn completion_callback_waits_for_grace_interval() {
    let plan = generate_plan(&WizardData::default());
    let provisioner = Arc::new(SimulatedProvisioner::default());
    let fired_at = Arc::new(Mutex::new(None));
    let hook = {
        let fired_at = fired_at.clone();
        move |_: &purviewx_types::run::RunSnapshot| {
            *fired_at.lock().unwrap() = Some(Instant::now());
        }
    };

    let handle = PlanRunner::new(plan, provisioner)
        .with_settings(RunnerSettings {
            completion_grace: Duration::from_millis(1500),
        })
        .start(hook);
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.state == RunState::Complete).await.unwrap();
    let completed_at = Instant::now();
    assert!(fired_at.lock().unwrap().is_none());

    handle.wait().await.unwrap();
    let fired_at = fired_at.lock().unwrap().unwrap();
    assert!(fired_at - completed_at >= Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn cancel_during_grace_suppresses_callback() {
    let plan = generate_plan(&WizardData::default());
    let (fired, hook) = counter();

    let handle = PlanRunner::new(plan, Arc::new(SimulatedProvisioner::default())).start(hook);
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.state == RunState::Complete).await.unwrap();

    handle.cancel();
    let snapshot = handle.wait().await.unwrap();

    assert_eq!(snapshot.state, RunState::Complete);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_mid_run_cancels_remaining_steps() {
    let plan = generate_plan(&WizardData::default());
    let total = plan.len();
    let (fired, hook) = counter();

    let handle = PlanRunner::new(plan, Arc::new(SimulatedProvisioner::default())).start(hook);
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.status_of("configure-labels") == Some(StepStatus::Running))
        .await
        .unwrap();

    drop(handle);
    rx.wait_for(|s| s.state == RunState::Cancelled).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    let snapshot = rx.borrow().clone();
    assert_eq!(snapshot.status_of("connect-api"), Some(StepStatus::Completed));
    assert_eq!(snapshot.status_of("configure-labels"), Some(StepStatus::Pending));
    assert_eq!(snapshot.count(StepStatus::Pending), total - 1);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn hung_step_blocks_until_cancelled() {
    let plan = generate_plan(&WizardData::default());
    let (fired, hook) = counter();

    let handle = PlanRunner::new(plan, Arc::new(HangingProvisioner)).start(hook);
    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert_eq!(handle.state(), RunState::Running);
    assert_eq!(handle.status("connect-api"), Some(StepStatus::Running));

    handle.cancel();
    let snapshot = handle.wait().await.unwrap();
    assert_eq!(snapshot.state, RunState::Cancelled);
    assert_eq!(snapshot.count(StepStatus::Pending), snapshot.steps.len());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn empty_plan_completes_immediately() {
    let (fired, hook) = counter();
    let snapshot = PlanRunner::new(Vec::new(), Arc::new(SimulatedProvisioner::default()))
        .start(hook)
        .wait()
        .await
        .unwrap();
    assert_eq!(snapshot.state, RunState::Complete);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
