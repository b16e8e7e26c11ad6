//! System summary - a few lines describing the machine, plus a flat list of
//! detected devices.
//!
//! The summary reads three leaves below the probe root:
//! - `cpu`: processors, counted by name ("2x Intel Xeon")
//! - `memory`: main memory entries (class 257, subclass 2), summed over
//!   their `resource.phys_mem` ranges
//! - `bios`: the SMBIOS `sysinfo` record ("manufacturer - product (version)")
//!
//! On PowerPC there is usually no SMBIOS; board and generation from the
//! `system` leaf are used instead.

use crate::labels::label_of;
use crate::probe_path::ProbePath;
use crate::progress::{CancelSource, ProgressSink, PROGRESS_MAX};
use crate::provider::Provider;
use crate::raw_value::{RawMap, RawValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub const UNKNOWN_PROCESSOR: &str = "Unknown processor";
pub const UNKNOWN_DEVICE: &str = "Unknown device";
const UNKNOWN: &str = "Unknown";

/// Internal class id of memory entries
pub const MEMORY_CLASS_ID: i64 = 257;
/// Memory subclass of main memory
pub const MAIN_MEMORY_SUBCLASS_ID: i64 = 2;

pub const SYSRQ_PATH: &str = "/proc/sys/kernel/sysrq";

/// Floppy assumed when floppy detection did not run
pub const DEFAULT_FLOPPY: (&str, &str) = ("/dev/fd0", "Floppy disk");

/// Device classes always detected.
pub const DETECT_PATHS: &[&str] = &[
    "cpu", "memory", "disk", "display", "mouse", "keyboard", "storage", "netcard", "monitor",
    "braille", "bios",
];

/// Additional classes, skipped on User Mode Linux.
pub const DETECT_PATHS_NON_UML: &[&str] = &[
    "cdrom",
    "floppy",
    "sound",
    "isdn",
    "modem",
    "printer",
    "tv",
    "dvb",
    "scanner",
    "camera",
    "chipcard",
    "usbctrl",
    "ieee1394ctrl",
    "hub",
    "joystick",
    "pppoe",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemSummary {
    /// Empty when neither SMBIOS nor board data is available
    pub system: String,
    pub processor: String,
    pub memory_bytes: u64,
    pub sysrq_enabled: bool,
}

impl SystemSummary {
    pub fn collect(provider: &dyn Provider, root: &ProbePath, ppc: bool) -> Self {
        let cpus = provider.value(&root.child("cpu"));
        let memory = provider.value(&root.child("memory"));
        let bios = provider.value(&root.child("bios"));
        let board = if ppc {
            provider.value(&root.child("system"))
        } else {
            RawValue::Empty
        };

        let summary = Self {
            system: system_string(&bios, &board),
            processor: processor_string(&cpus),
            memory_bytes: memory_size(&memory),
            sysrq_enabled: false,
        };
        info!("System summary: {:?}", summary);
        summary
    }

    pub fn with_sysrq(mut self, enabled: bool) -> Self {
        self.sysrq_enabled = enabled;
        self
    }

    /// Display lines: system (if known), processor, memory, SysRq (if on).
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.system.is_empty() {
            lines.push(format!("System: {}", self.system));
        }
        lines.push(format!("Processor: {}", self.processor));
        lines.push(format!("Main Memory: {}", format_size(self.memory_bytes)));
        if self.sysrq_enabled {
            lines.push("SysRq Key: Enabled".to_string());
        }
        lines
    }
}

fn maps(value: &RawValue) -> impl Iterator<Item = &RawMap> {
    value.as_list().unwrap_or_default().iter().filter_map(RawValue::as_map)
}

/// Text of `key`, or `default` when missing.
fn text_or(map: &RawMap, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(value) if !value.is_empty() => value.stringify(),
        _ => default.to_string(),
    }
}

/// Processor names with counts, in order of first appearance:
/// `2x Intel Xeon, AMD Athlon`.
pub fn processor_string(cpus: &RawValue) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for cpu in maps(cpus) {
        let name = text_or(cpu, "name", UNKNOWN_PROCESSOR);
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }

    counts
        .into_iter()
        .map(|(name, count)| {
            if count > 1 {
                format!("{}x {}", count, name)
            } else {
                name
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bytes of main memory over all main memory entries.
pub fn memory_size(memory: &RawValue) -> u64 {
    maps(memory)
        .filter(|info| {
            info.get("class_id").and_then(RawValue::as_int) == Some(MEMORY_CLASS_ID)
                && info.get("sub_class_id").and_then(RawValue::as_int)
                    == Some(MAIN_MEMORY_SUBCLASS_ID)
        })
        .flat_map(|info| {
            info.get("resource")
                .and_then(RawValue::as_map)
                .and_then(|resource| resource.get("phys_mem"))
                .map(maps)
                .into_iter()
                .flatten()
        })
        .filter_map(|range| range.get("range").and_then(RawValue::as_int))
        .map(|bytes| bytes.max(0) as u64)
        .sum()
}

/// `manufacturer - product (version)` from the SMBIOS sysinfo record, or
/// `board (generation)` from the system leaf.
pub fn system_string(bios: &RawValue, board: &RawValue) -> String {
    let entries = bios.as_list().unwrap_or_default();
    if entries.len() != 1 {
        warn!("BIOS list size is {}", entries.len());
    }

    // the last sysinfo record wins
    let sysinfo = entries
        .first()
        .and_then(RawValue::as_map)
        .and_then(|info| info.get("smbios"))
        .map(|smbios| {
            maps(smbios)
                .filter(|record| record.get("type").and_then(RawValue::as_str) == Some("sysinfo"))
                .last()
        })
        .unwrap_or_default();

    if let Some(sysinfo) = sysinfo.filter(|s| !s.is_empty()) {
        let manufacturer = text_or(sysinfo, "manufacturer", UNKNOWN);
        let product = text_or(sysinfo, "product", UNKNOWN);
        let version = text_or(sysinfo, "version", "");

        let mut system = format!("{} - {}", manufacturer, product);
        if !version.is_empty() {
            system.push_str(&format!(" ({})", version));
        }
        return system;
    }

    board_string(board)
}

fn board_string(board: &RawValue) -> String {
    let mut name = String::new();
    let mut generation = String::new();
    for entry in maps(board) {
        let system = text_or(entry, "system", "");
        if !system.is_empty() {
            name = system;
        }
        let entry_generation = text_or(entry, "generation", "");
        if !entry_generation.is_empty() {
            generation = entry_generation;
        }
    }

    if !name.is_empty() && !generation.is_empty() {
        format!("{} ({})", name, generation)
    } else {
        name
    }
}

/// Size with binary units and at most two decimals, trailing zeros
/// dropped: `512 B`, `1.5 KiB`, `8 GiB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = UNITS[0];
    for candidate in UNITS {
        value /= 1024.0;
        unit = candidate;
        if value < 1024.0 {
            break;
        }
    }

    let number = format!("{:.2}", value);
    let number = number.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", number, unit)
}

/// True if the magic SysRq key is enabled (any non-zero value).
pub fn sysrq_enabled(path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(content) => content.trim().parse::<i64>().map(|v| v != 0).unwrap_or(false),
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            false
        }
    }
}

/// One detected device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedDevice {
    /// Probe segment the device was found under, e.g. `netcard`
    pub class: String,
    pub model: String,
    pub info: RawValue,
}

/// Classes to detect, in order.
pub fn detection_paths(uml: bool) -> Vec<&'static str> {
    let mut paths = DETECT_PATHS.to_vec();
    if !uml {
        paths.extend_from_slice(DETECT_PATHS_NON_UML);
    }
    paths
}

/// Read every detection class and flatten the entries into one list.
///
/// Polls `cancel` before each class; returns `None` once cancelled. Progress
/// advances evenly per class.
pub fn detect_hardware(
    provider: &dyn Provider,
    root: &ProbePath,
    uml: bool,
    cancel: &dyn CancelSource,
    mut progress: Option<&mut dyn ProgressSink>,
) -> Option<Vec<DetectedDevice>> {
    let paths = detection_paths(uml);
    let total = paths.len() as u32;
    let mut devices = Vec::new();

    for (index, class) in paths.into_iter().enumerate() {
        if cancel.poll_cancel_requested() {
            info!("Hardware detection aborted before {}", class);
            return None;
        }
        if let Some(sink) = progress.as_deref_mut() {
            sink.on_label_update(&format!("{}...", label_of(class)));
        }

        let path = root.child(class);
        debug!("Probing: {}", path);
        for info in maps(&provider.value(&path)) {
            // CPU model names are stored under "name"
            let key = if class == "cpu" { "name" } else { "model" };
            devices.push(DetectedDevice {
                class: class.to_string(),
                model: text_or(info, key, UNKNOWN_DEVICE),
                info: RawValue::Map(info.clone()),
            });
        }

        if let Some(sink) = progress.as_deref_mut() {
            sink.on_progress(PROGRESS_MAX * (index as u32 + 1) / total);
        }
    }

    info!("Detected {} devices", devices.len());
    Some(devices)
}

/// Floppy device files and their models. Without floppy detection the
/// default `/dev/fd0` is assumed.
pub fn floppy_devices(
    devices: &[DetectedDevice],
    floppy_detected: bool,
) -> BTreeMap<String, String> {
    if !floppy_detected {
        let (device, model) = DEFAULT_FLOPPY;
        return BTreeMap::from([(device.to_string(), model.to_string())]);
    }

    devices
        .iter()
        .filter(|d| d.class == "floppy")
        .filter_map(|d| {
            let info = d.info.as_map()?;
            let device = info.get("dev_name")?.as_str()?;
            let model = info.get("model")?.as_str()?;
            Some((device.to_string(), model.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NeverCancel, RecordingProgress};
    use crate::snapshot::{Snapshot, SnapshotProvider};
    use serde_json::json;
    use std::cell::Cell;

    fn root() -> ProbePath {
        ProbePath::parse("probe").unwrap()
    }

    fn provider(values: serde_json::Value) -> SnapshotProvider {
        let doc = json!({ "values": values });
        SnapshotProvider::new(Snapshot::from_json_str(&doc.to_string()).unwrap())
    }

    fn workstation() -> SnapshotProvider {
        provider(json!({
            "probe.cpu": [
                {"name": "Intel(R) Xeon(R) CPU E5-2620"},
                {"name": "Intel(R) Xeon(R) CPU E5-2620"},
                {"vendor_id": "GenuineIntel"}
            ],
            "probe.memory": [
                {
                    "class_id": 257,
                    "sub_class_id": 2,
                    "model": "Main Memory",
                    "resource": {"phys_mem": [{"range": 4294967296_i64}, {"range": 4294967296_i64}]}
                },
                {"class_id": 257, "sub_class_id": 1, "resource": {"phys_mem": [{"range": 1024}]}}
            ],
            "probe.bios": [{
                "smbios": [
                    {"type": "biosinfo", "vendor": "Acme BIOS"},
                    {"type": "sysinfo", "manufacturer": "Acme", "product": "Workstation 5", "version": "1.0"}
                ]
            }],
            "probe.netcard": [{"model": "Intel 82540EM", "dev_name": "eth0"}, {"dev_name": "eth1"}],
            "probe.floppy": [{"model": "Floppy Disk", "dev_name": "/dev/fd0"}]
        }))
    }

    #[test]
    fn test_processor_counts() {
        let cpus = RawValue::from(json!([{"name": "A"}, {"name": "B"}, {"name": "A"}]));
        assert_eq!(processor_string(&cpus), "2x A, B");
        assert_eq!(processor_string(&RawValue::Empty), "");
    }

    #[test]
    fn test_collect_from_snapshot() {
        let summary = SystemSummary::collect(&workstation(), &root(), false);
        assert_eq!(summary.system, "Acme - Workstation 5 (1.0)");
        assert_eq!(
            summary.processor,
            "2x Intel(R) Xeon(R) CPU E5-2620, Unknown processor"
        );
        assert_eq!(summary.memory_bytes, 8 * 1024 * 1024 * 1024);
        assert_eq!(
            summary.lines(),
            vec![
                "System: Acme - Workstation 5 (1.0)",
                "Processor: 2x Intel(R) Xeon(R) CPU E5-2620, Unknown processor",
                "Main Memory: 8 GiB",
            ]
        );
    }

    #[test]
    fn test_system_defaults_and_missing_version() {
        let bios = RawValue::from(json!([{"smbios": [{"type": "sysinfo", "product": "X1"}]}]));
        assert_eq!(system_string(&bios, &RawValue::Empty), "Unknown - X1");
    }

    #[test]
    fn test_ppc_board_fallback() {
        let board = provider(json!({
            "probe.system": [{"system": "PowerMac3,6"}, {"generation": "PowerMac G4"}]
        }));
        let summary = SystemSummary::collect(&board, &root(), true);
        assert_eq!(summary.system, "PowerMac3,6 (PowerMac G4)");

        // not consulted on other architectures
        let summary = SystemSummary::collect(&board, &root(), false);
        assert_eq!(summary.system, "");
        assert_eq!(summary.lines()[0], "Processor: ");
    }

    #[test]
    fn test_sysrq_line() {
        let summary = SystemSummary::default().with_sysrq(true);
        assert_eq!(summary.lines().last().map(String::as_str), Some("SysRq Key: Enabled"));
    }

    #[test]
    fn test_sysrq_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysrq");
        std::fs::write(&path, "176\n").unwrap();
        assert!(sysrq_enabled(&path));
        std::fs::write(&path, "0\n").unwrap();
        assert!(!sysrq_enabled(&path));
        assert!(!sysrq_enabled(&dir.path().join("missing")));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(8 * 1024 * 1024 * 1024), "8 GiB");
        assert_eq!(format_size(8_300_000_000), "7.73 GiB");
    }

    #[test]
    fn test_detected_devices() {
        let mut progress = RecordingProgress::new();
        let sink: &mut dyn ProgressSink = &mut progress;
        let devices =
            detect_hardware(&workstation(), &root(), false, &NeverCancel, Some(sink)).unwrap();

        let found: Vec<(&str, &str)> = devices
            .iter()
            .map(|d| (d.class.as_str(), d.model.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("cpu", "Intel(R) Xeon(R) CPU E5-2620"),
                ("cpu", "Intel(R) Xeon(R) CPU E5-2620"),
                ("cpu", UNKNOWN_DEVICE),
                ("memory", "Main Memory"),
                ("memory", UNKNOWN_DEVICE),
                ("netcard", "Intel 82540EM"),
                ("netcard", UNKNOWN_DEVICE),
                ("bios", UNKNOWN_DEVICE),
                ("floppy", "Floppy Disk"),
            ]
        );
        assert_eq!(progress.last_value(), Some(PROGRESS_MAX));
        assert_eq!(progress.labels()[0], "CPU...");

        let floppies = floppy_devices(&devices, true);
        assert_eq!(floppies.get("/dev/fd0").map(String::as_str), Some("Floppy Disk"));
    }

    #[test]
    fn test_uml_skips_extra_classes() {
        let devices = detect_hardware(&workstation(), &root(), true, &NeverCancel, None).unwrap();
        assert!(devices.iter().all(|d| d.class != "floppy"));
        assert_eq!(
            floppy_devices(&devices, false),
            BTreeMap::from([("/dev/fd0".to_string(), "Floppy disk".to_string())])
        );
    }

    #[test]
    fn test_detection_cancel() {
        let polls = Cell::new(0);
        let cancel = || {
            polls.set(polls.get() + 1);
            polls.get() > 2
        };
        assert!(detect_hardware(&workstation(), &root(), false, &cancel, None).is_none());
        assert_eq!(polls.get(), 3);
    }
}
