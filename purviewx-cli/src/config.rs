//! Configuration file loading for purviewx.
//!
//! Discovers and loads `purviewx.toml` from the working root.
//! Precedence, lowest first: config file, `PURVIEWX_CLOUD`, CLI flags.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use purviewx_core::settings::DEFAULT_OUT_DIR;
use purviewx_domain::cloud::{CLOUD_ENV_VAR, cloud_from_env_value};
use purviewx_types::CloudEnvironment;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "purviewx.toml";

/// Top-level configuration from purviewx.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PurviewxConfig {
    pub cloud: CloudConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Replaces the wizard's cloud environment.
    pub environment: Option<CloudEnvironment>,
}

/// Simulated tenant behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Multiplier for every simulated latency; 0 makes runs instant.
    pub time_scale: f64,

    /// Step ids whose provisioning call fails.
    pub fail_steps: Vec<String>,

    pub completion_grace_ms: u64,
    pub packaging_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fail_steps: Vec::new(),
            completion_grace_ms: 1500,
            packaging_delay_ms: 2500,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Relative paths resolve against the working root.
    pub out_dir: Option<Utf8PathBuf>,
}

/// Discover the purviewx.toml config file in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a purviewx.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<PurviewxConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<PurviewxConfig> {
    let config: PurviewxConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<PurviewxConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(PurviewxConfig::default()),
    }
}

/// Overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub cloud: Option<CloudEnvironment>,
    pub time_scale: Option<f64>,
    pub fail_steps: Vec<String>,
    pub out_dir: Option<Utf8PathBuf>,
}

/// Effective settings after merging every source.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub cloud: Option<CloudEnvironment>,
    pub time_scale: f64,
    pub fail_steps: Vec<String>,
    pub completion_grace: Duration,
    pub packaging_delay: Duration,
    pub out_dir: Utf8PathBuf,
}

/// Builder for merging config file, environment and CLI arguments.
pub struct ConfigMerger {
    config: PurviewxConfig,
    env_cloud: Option<CloudEnvironment>,
}

impl ConfigMerger {
    pub fn new(config: PurviewxConfig) -> Self {
        Self {
            config,
            env_cloud: None,
        }
    }

    /// Apply a `PURVIEWX_CLOUD` value. `None` means unset.
    pub fn with_env_cloud(mut self, value: Option<&str>) -> anyhow::Result<Self> {
        self.env_cloud =
            cloud_from_env_value(value).with_context(|| format!("read {}", CLOUD_ENV_VAR))?;
        Ok(self)
    }

    /// Merge with CLI arguments.
    ///
    /// CLI `fail_steps` extend the config file list.
    pub fn merge(self, root: &Utf8Path, cli: &CliOverrides) -> MergedConfig {
        let sim = self.config.simulation;

        let mut fail_steps = sim.fail_steps;
        for id in &cli.fail_steps {
            if !fail_steps.contains(id) {
                fail_steps.push(id.clone());
            }
        }

        let out_dir = match (&cli.out_dir, &self.config.output.out_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dir)) => root.join(dir),
            (None, None) => root.join(DEFAULT_OUT_DIR),
        };

        MergedConfig {
            cloud: cli
                .cloud
                .or(self.env_cloud)
                .or(self.config.cloud.environment),
            time_scale: cli.time_scale.unwrap_or(sim.time_scale),
            fail_steps,
            completion_grace: Duration::from_millis(sim.completion_grace_ms),
            packaging_delay: Duration::from_millis(sim.packaging_delay_ms),
            out_dir,
        }
    }
}
