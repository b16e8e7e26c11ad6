//! Command handlers for hwinfoctl
//!
//! Each handler returns the process exit code; errors bubble up as
//! `anyhow::Error` and are mapped to `EXIT_GENERAL_ERROR` by main.

use crate::errors::{EXIT_ABORTED, EXIT_SUCCESS};
use crate::progress_display::ProbeProgressBar;
use anyhow::{Context, Result};
use hwinfo_common::config::ProbeConfig;
use hwinfo_common::cpuinfo::{CpuinfoProvider, PROC_CPUINFO};
use hwinfo_common::exclusions::{build_exclusions, display_server_running, is_uml};
use hwinfo_common::labels::label_of;
use hwinfo_common::progress::NeverCancel;
use hwinfo_common::summary::{detect_hardware, sysrq_enabled, SYSRQ_PATH};
use hwinfo_common::live::live_provider;
use hwinfo_common::tree::format_forest;
use hwinfo_common::{
    CancelFlag, ClassTable, ExcludedPaths, HwinfoConfig, MountedProvider, ProbePath,
    ProgressSink, Provider, RawValue, Snapshot, SnapshotProvider, SystemSummary, TreeRenderer,
    WalkOptions, WalkOutcome, Walker,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

type SharedProvider = Box<dyn Provider + Send + Sync>;

/// Options of the `tree` command.
#[derive(Debug, Clone, Default)]
pub struct TreeArgs {
    pub snapshot: Option<PathBuf>,
    pub root: Option<String>,
    pub exclude: Vec<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub no_progress: bool,
}

/// Options of the `summary` command.
#[derive(Debug, Clone, Default)]
pub struct SummaryArgs {
    pub snapshot: Option<PathBuf>,
    pub devices: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

/// Board data replaces SMBIOS on PowerPC.
const PPC: bool = cfg!(any(target_arch = "powerpc", target_arch = "powerpc64"));

/// Explicit config files must parse; the system one falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<HwinfoConfig> {
    match path {
        Some(path) => HwinfoConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(HwinfoConfig::load()),
    }
}

/// Built-in class names, overridden by the configured class file.
pub fn load_classes(config: &HwinfoConfig) -> Result<ClassTable> {
    let mut table = ClassTable::builtin();
    if let Some(file) = &config.classes.file {
        let extra = ClassTable::load(file)
            .with_context(|| format!("Failed to load class table {}", file.display()))?;
        debug!("Loaded {} class names from {}", extra.len(), file.display());
        table.merge(extra);
    }
    Ok(table)
}

fn parse_path(text: &str) -> Result<ProbePath> {
    ProbePath::parse(text).with_context(|| format!("Invalid probe path '{}'", text))
}

fn resolve_root(root: Option<&str>, config: &ProbeConfig) -> Result<ProbePath> {
    match root {
        Some(text) => parse_path(text),
        None => Ok(config.root.clone()),
    }
}

/// Inventory of the running system: the probe tree plus /proc/cpuinfo.
pub fn live_inventory(config: &ProbeConfig) -> MountedProvider {
    let mut provider =
        MountedProvider::new().mount(config.root.clone(), live_provider(&config.root));

    match CpuinfoProvider::load(config.cpuinfo_root.clone(), Path::new(PROC_CPUINFO)) {
        Ok(cpuinfo) => {
            debug!("{} processors in {}", cpuinfo.processors().len(), PROC_CPUINFO);
            provider = provider.mount(config.cpuinfo_root.clone(), cpuinfo);
        }
        Err(e) => debug!("No cpuinfo available: {}", e),
    }

    provider
}

fn open_provider(snapshot: Option<&Path>, config: &ProbeConfig) -> Result<SharedProvider> {
    match snapshot {
        Some(path) => {
            let provider = SnapshotProvider::load(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            info!("Using snapshot {}", path.display());
            Ok(Box::new(provider))
        }
        None => Ok(Box::new(live_inventory(config))),
    }
}

/// Exclusions for one walk. Pointer devices only matter when probing this
/// system, so the display server check is skipped for snapshots.
fn exclusions_for(
    config: &ProbeConfig,
    provider: &dyn Provider,
    from_snapshot: bool,
    extra: &[String],
) -> Result<ExcludedPaths> {
    let display_server = !from_snapshot
        && config.detect_display_server
        && display_server_running(&config.display_server_processes);

    let mut excluded = build_exclusions(config, provider, display_server);
    for text in extra {
        excluded.insert(parse_path(text)?);
    }
    Ok(excluded)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Walk on a blocking thread while Ctrl-C sets the cancel flag.
async fn walk_cancellable(
    provider: SharedProvider,
    classes: ClassTable,
    root: ProbePath,
    excluded: ExcludedPaths,
    options: WalkOptions,
    mut progress: ProbeProgressBar,
) -> Result<WalkOutcome> {
    let cancel = CancelFlag::new();

    let flag = cancel.clone();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted - stopping the probe");
            flag.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || {
        let renderer = TreeRenderer::new(&classes);
        let outcome = Walker::new(&*provider, renderer)
            .with_options(options)
            .with_cancel(&cancel)
            .with_progress(&mut progress)
            .walk_outcome(&root, &excluded);

        if outcome.aborted {
            progress.abandon("aborted");
        } else {
            progress.finish();
        }
        outcome
    })
    .await
    .context("Probe task failed")?;

    listener.abort();
    Ok(outcome)
}

pub async fn tree(config: &HwinfoConfig, args: TreeArgs) -> Result<i32> {
    let probe = &config.probe;
    let root = resolve_root(args.root.as_deref(), probe)?;
    let provider = open_provider(args.snapshot.as_deref(), probe)?;
    let excluded = exclusions_for(probe, &*provider, args.snapshot.is_some(), &args.exclude)?;
    let classes = load_classes(config)?;

    info!("Walking {} with {} excluded paths", root, excluded.len());
    let progress = ProbeProgressBar::for_terminal(args.no_progress);
    let outcome = walk_cancellable(
        provider,
        classes,
        root,
        excluded,
        WalkOptions::from(probe),
        progress,
    )
    .await?;

    if outcome.aborted {
        eprintln!("Probing aborted at {}/1000", outcome.progress);
        return Ok(EXIT_ABORTED);
    }

    let content = if args.json {
        let mut json = serde_json::to_string_pretty(&outcome.tree)?;
        json.push('\n');
        json
    } else {
        outcome.tree.as_ref().map(|t| t.to_text()).unwrap_or_default()
    };
    write_output(args.output.as_deref(), &content)?;

    Ok(EXIT_SUCCESS)
}

/// Capture the live inventory, including the cpuinfo address space.
pub fn snapshot(config: &HwinfoConfig, output: &Path, root: Option<&str>) -> Result<i32> {
    let probe = &config.probe;
    let root = resolve_root(root, probe)?;
    let provider = live_inventory(probe);

    let none = ExcludedPaths::new();
    let mut snapshot = Snapshot::capture(&provider, &root, &none);
    snapshot.capture_subtree(&provider, &probe.cpuinfo_root, &none);

    snapshot
        .save(output)
        .with_context(|| format!("Failed to save snapshot {}", output.display()))?;
    println!(
        "Saved {} directories and {} values to {}",
        snapshot.directories.len(),
        snapshot.values.len(),
        output.display()
    );

    Ok(EXIT_SUCCESS)
}

/// Render any JSON document with the generic renderer.
pub fn render(config: &HwinfoConfig, file: &Path) -> Result<i32> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let classes = load_classes(config)?;
    let nodes = TreeRenderer::new(&classes).render(&RawValue::from(json));
    print!("{}", format_forest(&nodes));

    Ok(EXIT_SUCCESS)
}

/// Short system description, optionally followed by the detected devices.
pub fn summary(config: &HwinfoConfig, args: SummaryArgs) -> Result<i32> {
    let probe = &config.probe;
    let provider = open_provider(args.snapshot.as_deref(), probe)?;

    let mut summary = SystemSummary::collect(&*provider, &probe.root, PPC);
    // SysRq is a property of the running kernel, not of the inventory
    if args.snapshot.is_none() {
        summary = summary.with_sysrq(sysrq_enabled(Path::new(SYSRQ_PATH)));
    }

    let devices = if args.devices {
        let uml = is_uml(probe, &*provider);
        let mut progress = ProbeProgressBar::for_terminal(false);
        let sink: &mut dyn ProgressSink = &mut progress;
        match detect_hardware(&*provider, &probe.root, uml, &NeverCancel, Some(sink)) {
            Some(devices) => {
                progress.finish();
                Some(devices)
            }
            None => {
                progress.abandon("aborted");
                eprintln!("Hardware detection aborted");
                return Ok(EXIT_ABORTED);
            }
        }
    } else {
        None
    };

    let content = if args.json {
        let doc = serde_json::json!({
            "summary": summary,
            "lines": summary.lines(),
            "devices": devices,
        });
        let mut json = serde_json::to_string_pretty(&doc)?;
        json.push('\n');
        json
    } else {
        let mut text = String::new();
        for line in summary.lines() {
            text.push_str(&line);
            text.push('\n');
        }
        if let Some(devices) = &devices {
            text.push_str("\nDetected hardware:\n");
            for device in devices {
                text.push_str(&format!("  {}: {}\n", label_of(&device.class), device.model));
            }
        }
        text
    };
    write_output(args.output.as_deref(), &content)?;

    Ok(EXIT_SUCCESS)
}

/// Print the effective exclusion set, one path per line.
pub fn excluded(config: &HwinfoConfig, snapshot: Option<&Path>) -> Result<i32> {
    let probe = &config.probe;
    let provider = open_provider(snapshot, probe)?;
    let excluded = exclusions_for(probe, &*provider, snapshot.is_some(), &[])?;

    for path in excluded.iter() {
        println!("{}", path);
    }

    Ok(EXIT_SUCCESS)
}
