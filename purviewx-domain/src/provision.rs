//! Provisioning port and its simulated implementation.

use crate::cloud;
use crate::planner::{PlanStep, StepKind};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// Result of a provisioning call that completed.
///
/// `success == false` is a failure reported by the remote side rather than
/// a transport error; the runner treats both the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub success: bool,
    pub message: String,
}

impl ProvisionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    /// The tenant API rejected the call.
    #[error("step {step_id} rejected: {message}")]
    Rejected { step_id: String, message: String },

    /// The call could not be made at all.
    #[error("step {step_id} unavailable: {message}")]
    Unavailable { step_id: String, message: String },
}

impl ProvisionError {
    pub fn step_id(&self) -> &str {
        match self {
            ProvisionError::Rejected { step_id, .. } | ProvisionError::Unavailable { step_id, .. } => {
                step_id
            }
        }
    }
}

/// Performs the tenant-side work of a plan step.
///
/// Implementations must not assume any other step is in flight: the runner
/// calls `provision` strictly one step at a time, in plan order.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self, step: &PlanStep) -> Result<ProvisionOutcome, ProvisionError>;
}

/// Stand-in for the real provisioning APIs.
///
/// Sleeps for the step's advisory duration (scaled by `time_scale`) and
/// succeeds, unless the step id is listed in `fail_on`.
#[derive(Debug, Clone)]
pub struct SimulatedProvisioner {
    time_scale: f64,
    fail_on: BTreeSet<String>,
}

impl Default for SimulatedProvisioner {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SimulatedProvisioner {
    /// Negative or non-finite scales fall back to real time; see [`scaled`].
    pub fn new(time_scale: f64) -> Self {
        Self {
            time_scale,
            fail_on: BTreeSet::new(),
        }
    }

    /// Make the listed step ids fail after their simulated latency.
    pub fn failing_on<I, S>(mut self, step_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fail_on.extend(step_ids.into_iter().map(Into::into));
        self
    }

    fn latency(&self, step: &PlanStep) -> Duration {
        scaled(step.duration, self.time_scale)
    }
}

/// `duration * time_scale`. Non-finite or negative scales leave it unchanged.
pub fn scaled(duration: Duration, time_scale: f64) -> Duration {
    if !time_scale.is_finite() || time_scale < 0.0 {
        return duration;
    }
    Duration::try_from_secs_f64(duration.as_secs_f64() * time_scale).unwrap_or(duration)
}

#[async_trait]
impl Provisioner for SimulatedProvisioner {
    async fn provision(&self, step: &PlanStep) -> Result<ProvisionOutcome, ProvisionError> {
        tokio::time::sleep(self.latency(step)).await;

        if self.fail_on.contains(step.id) {
            return Err(ProvisionError::Rejected {
                step_id: step.id.to_string(),
                message: "simulated failure".to_string(),
            });
        }

        let label = step.kind.action_label();
        if let StepKind::ConnectApi { cloud } = &step.kind {
            let endpoints = cloud::endpoints(*cloud);
            debug!(
                step_id = step.id,
                graph = endpoints.graph,
                authority = endpoints.authority,
                "connected"
            );
        }
        debug!(step_id = step.id, "executed: {}", label);
        Ok(ProvisionOutcome::success(format!("{}: Success", label)))
    }
}
