//! Paths the walker must not probe.
//!
//! Some probe paths are slow, some are not interesting to users, and some
//! have side effects (probing the mouse while a display server runs moves
//! the cursor). The set is computed once before a walk and stays fixed.

use crate::config::ProbeConfig;
use crate::probe_path::ProbePath;
use crate::provider::Provider;
use std::collections::BTreeSet;
use sysinfo::System;
use tracing::{info, warn};

/// Fixed set of excluded probe paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedPaths {
    paths: BTreeSet<ProbePath>,
}

impl ExcludedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: ProbePath) -> bool {
        self.paths.insert(path)
    }

    /// Exact match only: excluding `probe.usb` does not exclude a path
    /// reached some other way, such as `probe.bybus.usb`.
    pub fn contains(&self, path: &ProbePath) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbePath> {
        self.paths.iter()
    }
}

impl FromIterator<ProbePath> for ExcludedPaths {
    fn from_iter<I: IntoIterator<Item = ProbePath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl Extend<ProbePath> for ExcludedPaths {
    fn extend<I: IntoIterator<Item = ProbePath>>(&mut self, iter: I) {
        self.paths.extend(iter);
    }
}

/// Build the exclusion set for one walk.
///
/// - configured default and extra exclusions always apply
/// - on User Mode Linux the UML list is added (few devices are emulated)
/// - while a display server runs, pointer-sensitive paths are added
pub fn build_exclusions(
    config: &ProbeConfig,
    provider: &dyn Provider,
    display_server_running: bool,
) -> ExcludedPaths {
    let mut excluded: ExcludedPaths = config
        .default_exclude
        .iter()
        .chain(config.extra_exclude.iter())
        .cloned()
        .collect();

    if is_uml(config, provider) {
        info!("UML system detected - excluding {} more paths", config.uml_exclude.len());
        excluded.extend(config.uml_exclude.iter().cloned());
    }

    if display_server_running {
        warn!("Display server is running - pointer devices will not be probed");
        excluded.extend(config.pointer_sensitive.iter().cloned());
    }

    excluded
}

/// True if the provider reports User Mode Linux.
pub fn is_uml(config: &ProbeConfig, provider: &dyn Provider) -> bool {
    provider.value(&config.uml_flag_path).as_bool() == Some(true)
}

/// True if any of the given process names is running.
pub fn display_server_running(process_names: &[String]) -> bool {
    let mut system = System::new();
    system.refresh_processes();

    process_names
        .iter()
        .any(|name| system.processes_by_exact_name(name).next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_value::RawValue;

    struct UmlFlag(bool);

    impl Provider for UmlFlag {
        fn children(&self, _path: &ProbePath) -> Option<Vec<String>> {
            None
        }

        fn value(&self, path: &ProbePath) -> RawValue {
            if path.to_string() == "probe.is_uml" {
                RawValue::bool(self.0)
            } else {
                RawValue::Empty
            }
        }
    }

    fn path(s: &str) -> ProbePath {
        ProbePath::parse(s).unwrap()
    }

    #[test]
    fn test_default_exclusions() {
        let excluded = build_exclusions(&ProbeConfig::default(), &UmlFlag(false), false);
        assert_eq!(excluded.len(), 7);
        assert!(excluded.contains(&path("probe.byclass")));
        assert!(!excluded.contains(&path("probe.mouse")));
    }

    #[test]
    fn test_uml_adds_device_paths() {
        let excluded = build_exclusions(&ProbeConfig::default(), &UmlFlag(true), false);
        assert_eq!(excluded.len(), 7 + 13);
        assert!(excluded.contains(&path("probe.usb")));
    }

    #[test]
    fn test_display_server_adds_pointer_paths() {
        let mut config = ProbeConfig::default();
        config.extra_exclude.push(path("probe.floppy"));
        let excluded = build_exclusions(&config, &UmlFlag(false), true);
        assert!(excluded.contains(&path("probe.mouse")));
        assert!(excluded.contains(&path("probe.chipcard")));
        assert!(excluded.contains(&path("probe.floppy")));
        assert_eq!(excluded.len(), 10);
    }

    #[test]
    fn test_exact_match_only() {
        let excluded = ExcludedPaths::from_iter([path("probe.usb")]);
        assert!(!excluded.contains(&path("probe.usb.0")));
        assert!(!excluded.contains(&path("probe")));
    }

    #[test]
    fn test_no_display_server_names_means_not_running() {
        assert!(!display_server_running(&[]));
    }
}
