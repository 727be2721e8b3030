mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use fs_err as fs;
use purviewx_core::ToolError;
use purviewx_core::adapters::{FsBinderStore, FsWizardSource, FsWritePort};
use purviewx_core::pipeline::{
    prepare_wizard, run_apply, run_binder, run_plan, write_apply_artifacts,
    write_binder_artifacts, write_plan_artifacts,
};
use purviewx_core::ports::WizardSource;
use purviewx_core::settings::{ApplySettings, BinderSettings, PlanSettings};
use purviewx_domain::cloud::CLOUD_ENV_VAR;
use purviewx_domain::{add_custom_sit, parse_sit_rule_pack};
use purviewx_types::defaults::{FEATURE_SCOPES, grant_feature};
use purviewx_types::{CloudEnvironment, ToolInfo, WizardData};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const WIZARD_FILE_NAME: &str = "wizard.json";

#[derive(Debug, Parser)]
#[command(
    name = "purviewx",
    version,
    about = "Plan, simulate and evidence Microsoft Purview tenant configuration."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a baseline wizard.json.
    Init(InitArgs),
    /// Generate the deployment plan for the wizard configuration.
    Plan(PlanArgs),
    /// Execute the deployment plan against the simulated tenant.
    Apply(ApplyArgs),
    /// Generate the next evidence binder and its HTML report.
    Binder(BinderArgs),
    /// Print the configuration checksum of the wizard file.
    Checksum(ChecksumArgs),
    /// Import a custom SIT from a rule-pack file into the wizard file.
    ImportSit(ImportSitArgs),
    /// List the admin consent catalog.
    Scopes(ScopesArgs),
}

#[derive(Debug, Args)]
struct WizardArgs {
    /// Working root holding purviewx.toml (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Wizard configuration file (default: <root>/wizard.json).
    #[arg(long)]
    wizard: Option<Utf8PathBuf>,
}

impl WizardArgs {
    fn wizard_path(&self) -> Utf8PathBuf {
        self.wizard
            .clone()
            .unwrap_or_else(|| self.root.join(WIZARD_FILE_NAME))
    }
}

#[derive(Debug, Args)]
struct CommonArgs {
    #[command(flatten)]
    wizard: WizardArgs,

    /// Cloud environment (Commercial, GCC, "GCC High", DoD); overrides the wizard file.
    #[arg(long)]
    cloud: Option<CloudEnvironment>,

    /// Output directory for artifacts (default: <root>/artifacts/purviewx).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct InitArgs {
    #[command(flatten)]
    wizard: WizardArgs,

    /// Cloud environment recorded in the new file.
    #[arg(long)]
    cloud: Option<CloudEnvironment>,

    /// Grant every scope in the consent catalog.
    #[arg(long, default_value_t = false)]
    grant_consents: bool,

    /// Overwrite an existing wizard file.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Multiplier for simulated latency; 0 runs instantly.
    #[arg(long)]
    time_scale: Option<f64>,

    /// Make the given step id fail (repeatable).
    #[arg(long = "fail-step")]
    fail_steps: Vec<String>,
}

#[derive(Debug, Parser)]
struct BinderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Multiplier for the simulated packaging delay; 0 runs instantly.
    #[arg(long)]
    time_scale: Option<f64>,

    /// Binder version (default: previous binder.json version + 1, else 1).
    #[arg(long = "version")]
    binder_version: Option<u32>,
}

#[derive(Debug, Parser)]
struct ChecksumArgs {
    #[command(flatten)]
    wizard: WizardArgs,

    /// Cloud environment applied before hashing; overrides purviewx.toml and PURVIEWX_CLOUD.
    #[arg(long)]
    cloud: Option<CloudEnvironment>,
}

#[derive(Debug, Parser)]
struct ImportSitArgs {
    /// Rule-pack file to import.
    rule_pack: Utf8PathBuf,

    #[command(flatten)]
    wizard: WizardArgs,
}

#[derive(Debug, Parser)]
struct ScopesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match real_main(cli).await {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn real_main(cli: Cli) -> Result<(), ToolError> {
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Apply(args) => cmd_apply(args).await,
        Command::Binder(args) => cmd_binder(args).await,
        Command::Checksum(args) => cmd_checksum(args),
        Command::ImportSit(args) => cmd_import_sit(args),
        Command::Scopes(args) => cmd_scopes(args),
    }
}

impl CommonArgs {
    fn overrides(&self, time_scale: Option<f64>, fail_steps: &[String]) -> CliOverrides {
        CliOverrides {
            cloud: self.cloud,
            time_scale,
            fail_steps: fail_steps.to_vec(),
            out_dir: self.out_dir.clone(),
        }
    }
}

/// Merge purviewx.toml, `PURVIEWX_CLOUD` and the command line.
fn merged_config(root: &Utf8Path, cli: &CliOverrides) -> anyhow::Result<MergedConfig> {
    let file_config = config::load_or_default(root).context("load purviewx.toml config")?;
    let env_cloud = std::env::var(CLOUD_ENV_VAR).ok();
    let merged = ConfigMerger::new(file_config)
        .with_env_cloud(env_cloud.as_deref())?
        .merge(root, cli);
    debug!(
        "merged config: cloud={:?}, time_scale={}, fail_steps={:?}, out_dir={}",
        merged.cloud, merged.time_scale, merged.fail_steps, merged.out_dir
    );
    Ok(merged)
}

fn cmd_init(args: InitArgs) -> Result<(), ToolError> {
    let path = args.wizard.wizard_path();
    if path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "{} already exists; use --force to overwrite",
            path
        )
        .into());
    }

    let mut data = WizardData::default();
    if let Some(cloud) = args.cloud {
        data.cloud_environment = cloud;
    }
    if args.grant_consents {
        for feature in &FEATURE_SCOPES {
            grant_feature(&mut data.consents, feature);
        }
    }

    write_wizard(&path, &data)?;
    info!("wrote baseline configuration to {}", path);
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> Result<(), ToolError> {
    let merged = merged_config(&args.common.wizard.root, &args.common.overrides(None, &[]))?;
    let settings = PlanSettings {
        out_dir: merged.out_dir,
        cloud: merged.cloud,
    };
    let source = FsWizardSource::new(args.common.wizard.wizard_path());

    let outcome = run_plan(&settings, &source, tool_info())?;
    write_plan_artifacts(&outcome, &settings.out_dir, &FsWritePort)?;
    Ok(())
}

async fn cmd_apply(args: ApplyArgs) -> Result<(), ToolError> {
    let merged = merged_config(
        &args.common.wizard.root,
        &args.common.overrides(args.time_scale, &args.fail_steps),
    )?;
    let settings = ApplySettings {
        out_dir: merged.out_dir,
        cloud: merged.cloud,
        time_scale: merged.time_scale,
        fail_steps: merged.fail_steps,
        completion_grace: merged.completion_grace,
    };
    let source = FsWizardSource::new(args.common.wizard.wizard_path());

    let outcome = run_apply(&settings, &source, tool_info()).await?;
    write_apply_artifacts(&outcome, &settings.out_dir, &FsWritePort)?;

    match outcome.halt_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn cmd_binder(args: BinderArgs) -> Result<(), ToolError> {
    let merged = merged_config(
        &args.common.wizard.root,
        &args.common.overrides(args.time_scale, &[]),
    )?;
    let settings = BinderSettings {
        out_dir: merged.out_dir,
        cloud: merged.cloud,
        version: args.binder_version,
        time_scale: merged.time_scale,
        packaging_delay: merged.packaging_delay,
    };
    let source = FsWizardSource::new(args.common.wizard.wizard_path());
    let store = FsBinderStore::new(settings.out_dir.clone());

    let outcome = run_binder(&settings, &source, &store, tool_info()).await?;
    write_binder_artifacts(&outcome, &settings.out_dir, &FsWritePort)?;

    println!("{}", settings.out_dir.join(&outcome.report_file));
    Ok(())
}

fn cmd_checksum(args: ChecksumArgs) -> Result<(), ToolError> {
    let cli = CliOverrides {
        cloud: args.cloud,
        ..CliOverrides::default()
    };
    let merged = merged_config(&args.wizard.root, &cli)?;
    let source = FsWizardSource::new(args.wizard.wizard_path());
    let data = prepare_wizard(&source, merged.cloud)?;
    let sum = purviewx_hash::checksum(&data).context("checksum wizard snapshot")?;
    println!("{}", sum);
    Ok(())
}

fn cmd_import_sit(args: ImportSitArgs) -> Result<(), ToolError> {
    let text = fs::read_to_string(&args.rule_pack)
        .with_context(|| format!("read rule pack {}", args.rule_pack))?;
    let sit = parse_sit_rule_pack(&text)
        .with_context(|| format!("import {}", args.rule_pack))?;

    let path = args.wizard.wizard_path();
    let mut data = FsWizardSource::new(path.clone()).load_wizard()?;
    let (id, name) = (sit.id.clone(), sit.name.clone());
    add_custom_sit(&mut data, sit).with_context(|| format!("update {}", path))?;
    write_wizard(&path, &data)?;

    println!("imported {} ({})", name, id);
    Ok(())
}

fn cmd_scopes(args: ScopesArgs) -> Result<(), ToolError> {
    match args.format {
        OutputFormat::Text => {
            for feature in &FEATURE_SCOPES {
                println!("{:<12} {}", feature.key, feature.title);
                println!("{:<12} {}", "", feature.description);
                for scope in feature.scopes {
                    println!("{:<12} - {}", "", scope);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&FEATURE_SCOPES)
                .context("serialize consent catalog")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn write_wizard(path: &Utf8Path, data: &WizardData) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(data).context("serialize wizard")?;
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent))?;
    }
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "purviewx".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
