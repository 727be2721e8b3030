//! Clap-free settings for the plan, apply and binder pipelines.

use camino::Utf8PathBuf;
use purviewx_evidence::DEFAULT_PACKAGING_DELAY;
use purviewx_runner::DEFAULT_COMPLETION_GRACE;
use purviewx_types::CloudEnvironment;
use std::time::Duration;

pub const DEFAULT_OUT_DIR: &str = "artifacts/purviewx";

/// Settings for the plan pipeline.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub out_dir: Utf8PathBuf,

    /// Replaces the wizard's cloud environment when set.
    pub cloud: Option<CloudEnvironment>,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from(DEFAULT_OUT_DIR),
            cloud: None,
        }
    }
}

/// Settings for the apply pipeline.
#[derive(Debug, Clone)]
pub struct ApplySettings {
    pub out_dir: Utf8PathBuf,
    pub cloud: Option<CloudEnvironment>,

    // Simulation
    pub time_scale: f64,
    pub fail_steps: Vec<String>,
    pub completion_grace: Duration,
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from(DEFAULT_OUT_DIR),
            cloud: None,
            time_scale: 1.0,
            fail_steps: Vec::new(),
            completion_grace: DEFAULT_COMPLETION_GRACE,
        }
    }
}

/// Settings for the binder pipeline.
#[derive(Debug, Clone)]
pub struct BinderSettings {
    pub out_dir: Utf8PathBuf,
    pub cloud: Option<CloudEnvironment>,

    /// Explicit version; otherwise the previous binder's version + 1.
    pub version: Option<u32>,

    pub time_scale: f64,
    pub packaging_delay: Duration,
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from(DEFAULT_OUT_DIR),
            cloud: None,
            version: None,
            time_scale: 1.0,
            packaging_delay: DEFAULT_PACKAGING_DELAY,
        }
    }
}
