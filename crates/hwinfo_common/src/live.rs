//! Live inventory from the running system via sysinfo.
//!
//! System state is read once, up front, and frozen into a [`Snapshot`], so
//! repeated provider queries during a walk are cheap and consistent.
//!
//! Layout under the root (usually `probe`):
//! - `cpu`: one map per logical CPU
//! - `memory`: main memory entry
//! - `disk`: one map per mounted disk
//! - `has_smp`, `is_uml`: booleans

use crate::probe_path::ProbePath;
use crate::raw_value::RawValue;
use crate::snapshot::{Snapshot, SnapshotProvider};
use crate::summary::{MAIN_MEMORY_SUBCLASS_ID, MEMORY_CLASS_ID};
use chrono::Utc;
use sysinfo::{Disks, System};
use tracing::debug;

/// Vendor string reported by User Mode Linux kernels
const UML_VENDOR: &str = "User Mode Linux";

pub fn capture_system(root: &ProbePath) -> Snapshot {
    let mut system = System::new();
    system.refresh_cpu();
    system.refresh_memory();
    let disks = Disks::new_with_refreshed_list();

    let cpus: Vec<RawValue> = system
        .cpus()
        .iter()
        .map(|cpu| {
            RawValue::map([
                ("name", RawValue::str(cpu.brand())),
                ("model", RawValue::str(cpu.brand())),
                ("vendor_id", RawValue::str(cpu.vendor_id())),
                ("mhz", RawValue::int(cpu.frequency() as i64)),
                ("unit", RawValue::str(cpu.name())),
            ])
        })
        .collect();

    let memory = RawValue::List(vec![RawValue::map([
        ("class_id", RawValue::int(MEMORY_CLASS_ID)),
        ("sub_class_id", RawValue::int(MAIN_MEMORY_SUBCLASS_ID)),
        ("model", RawValue::str("Main Memory")),
        (
            "resource",
            RawValue::map([(
                "phys_mem",
                RawValue::List(vec![RawValue::map([(
                    "range",
                    RawValue::int(system.total_memory() as i64),
                )])]),
            )]),
        ),
        ("swap", RawValue::int(system.total_swap() as i64)),
    ])]);

    let disk_entries: Vec<RawValue> = disks
        .list()
        .iter()
        .map(|disk| {
            RawValue::map([
                ("device", RawValue::str(disk.name().to_string_lossy())),
                ("mount_point", RawValue::str(disk.mount_point().display().to_string())),
                ("size", RawValue::int(disk.total_space() as i64)),
                ("type", RawValue::str(format!("{:?}", disk.kind()))),
                ("removable", RawValue::bool(disk.is_removable())),
            ])
        })
        .collect();

    let is_uml = system
        .cpus()
        .first()
        .map(|cpu| cpu.vendor_id() == UML_VENDOR)
        .unwrap_or(false);

    debug!(
        "Live inventory: {} cpus, {} disks",
        cpus.len(),
        disk_entries.len()
    );

    let leaves = [
        ("cpu", RawValue::list(cpus)),
        ("memory", memory),
        ("disk", RawValue::list(disk_entries)),
        ("has_smp", RawValue::bool(system.cpus().len() > 1)),
        ("is_uml", RawValue::bool(is_uml)),
    ];

    let mut snapshot = Snapshot {
        captured_at: Some(Utc::now()),
        ..Snapshot::default()
    };
    snapshot.add_directory(
        root,
        leaves.iter().map(|(name, _)| name.to_string()).collect(),
    );
    for (name, value) in leaves {
        snapshot.add_value(&root.child(name), value);
    }
    snapshot
}

/// Provider over a fresh capture of the running system.
pub fn live_provider(root: &ProbePath) -> SnapshotProvider {
    SnapshotProvider::new(capture_system(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use crate::summary::memory_size;

    #[test]
    fn test_live_layout() {
        let root = ProbePath::parse("probe").unwrap();
        let provider = live_provider(&root);

        let children = provider.children(&root).unwrap();
        assert_eq!(children, vec!["cpu", "memory", "disk", "has_smp", "is_uml"]);
        assert!(provider.value(&root.child("has_smp")).as_bool().is_some());
        assert!(provider.children(&root.child("memory")).is_none());

        let memory = provider.value(&root.child("memory"));
        // main memory entry is counted by the summary
        assert!(memory_size(&memory) > 0);
    }
}
