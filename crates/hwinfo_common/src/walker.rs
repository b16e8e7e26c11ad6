//! Probe Tree Walker - builds the hardware tree from a live provider.
//!
//! Depth-first, synchronous, single-threaded. Each recursion step polls the
//! cancel source before doing anything else; once a cancel is seen the whole
//! walk unwinds without further provider calls. Progress is spread evenly
//! over sibling fan-out on a 0..=1000 scale and never goes backwards.
//!
//! Two leaves get special treatment before rendering:
//! - the BIOS leaf loses SMBIOS stub entries left by incomplete detection
//! - the CPU leaf gets per-processor details merged in from cpuinfo

use crate::config::ProbeConfig;
use crate::exclusions::ExcludedPaths;
use crate::labels::{key_value_label, label_of};
use crate::probe_path::ProbePath;
use crate::progress::{CancelSource, NeverCancel, ProgressSink, PROGRESS_MAX};
use crate::provider::Provider;
use crate::raw_value::{RawMap, RawValue};
use crate::renderer::TreeRenderer;
use crate::tree::{sort_by_label, TreeNode};
use std::collections::HashSet;
use tracing::{debug, info};

/// Key added to each CPU entry holding its processor index.
pub const PROCESSOR_KEY: &str = "Processor";

/// Paths and names with special leaf handling.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOptions {
    pub bios_path: ProbePath,
    pub cpu_segment: String,
    pub cpuinfo_root: ProbePath,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::from(&ProbeConfig::default())
    }
}

impl From<&ProbeConfig> for WalkOptions {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            bios_path: config.bios_path.clone(),
            cpu_segment: config.cpu_segment.clone(),
            cpuinfo_root: config.cpuinfo_root.clone(),
        }
    }
}

/// Mutable state of one traversal.
#[derive(Debug)]
pub struct WalkState<'e> {
    /// Set once a cancel is observed; never cleared
    pub abort: bool,
    pub excluded: &'e ExcludedPaths,
    /// Last reported progress
    pub progress: u32,
}

impl<'e> WalkState<'e> {
    pub fn new(excluded: &'e ExcludedPaths) -> Self {
        Self {
            abort: false,
            excluded,
            progress: 0,
        }
    }
}

/// Result of a walk, with the abort flag made explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    pub tree: Option<TreeNode>,
    pub aborted: bool,
    pub progress: u32,
}

pub struct Walker<'a> {
    provider: &'a dyn Provider,
    renderer: TreeRenderer<'a>,
    progress: Option<&'a mut dyn ProgressSink>,
    cancel: &'a dyn CancelSource,
    options: WalkOptions,
}

impl<'a> Walker<'a> {
    pub fn new(provider: &'a dyn Provider, renderer: TreeRenderer<'a>) -> Self {
        Self {
            provider,
            renderer,
            progress: None,
            cancel: &NeverCancel,
            options: WalkOptions::default(),
        }
    }

    pub fn with_progress(mut self, sink: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_cancel(mut self, cancel: &'a dyn CancelSource) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Walk from `root`. `None` if the walk was aborted, `root` is excluded,
    /// or there is nothing to show.
    pub fn walk(&mut self, root: &ProbePath, excluded: &ExcludedPaths) -> Option<TreeNode> {
        self.walk_outcome(root, excluded).tree
    }

    pub fn walk_outcome(&mut self, root: &ProbePath, excluded: &ExcludedPaths) -> WalkOutcome {
        let mut state = WalkState::new(excluded);
        let tree = self.build(&mut state, root, 0, PROGRESS_MAX);

        if state.abort {
            info!("Probing aborted, last progress {}", state.progress);
            return WalkOutcome {
                tree: None,
                aborted: true,
                progress: state.progress,
            };
        }

        WalkOutcome {
            tree,
            aborted: false,
            progress: state.progress,
        }
    }

    fn build(
        &mut self,
        state: &mut WalkState<'_>,
        path: &ProbePath,
        prog_min: u32,
        prog_max: u32,
    ) -> Option<TreeNode> {
        if state.abort {
            return None;
        }
        if self.cancel.poll_cancel_requested() {
            info!("Cancel requested at {}", path);
            state.abort = true;
            return None;
        }
        if state.excluded.contains(path) {
            debug!("Skipping excluded path {}", path);
            return None;
        }

        let node = path.last_segment();
        let node_label = label_of(node);
        if let Some(sink) = self.progress.as_deref_mut() {
            sink.on_label_update(&node_label);
        }
        info!("Probing {} ({})...", node, node_label);

        match self.provider.children(path) {
            None => self.build_leaf(path),
            Some(children) => self.build_directory(state, path, children, prog_min, prog_max),
        }
    }

    fn build_leaf(&self, path: &ProbePath) -> Option<TreeNode> {
        let mut value = self.provider.value(path);
        if *path == self.options.bios_path {
            value = clean_bios_tree(value);
        }

        let last = path.last_segment();
        if value.is_empty() {
            return None;
        }
        if value.is_scalar() {
            return Some(TreeNode::leaf(key_value_label(last, &value)));
        }

        if last == self.options.cpu_segment {
            value = self.add_cpu_info(value);
        }
        Some(TreeNode::branch(label_of(last), self.renderer.render(&value)))
    }

    fn build_directory(
        &mut self,
        state: &mut WalkState<'_>,
        path: &ProbePath,
        children: Vec<String>,
        prog_min: u32,
        prog_max: u32,
    ) -> Option<TreeNode> {
        let children = dedupe_children(children);

        let span = prog_max.saturating_sub(prog_min);
        let step = match children.len() as u32 {
            0 => span,
            n => span / n,
        };

        let mut prog = prog_min;
        let mut nodes = Vec::with_capacity(children.len());

        for child in &children {
            let node = self.build(state, &path.child(child), prog, prog + step);
            if state.abort {
                return None;
            }
            if let Some(node) = node {
                nodes.push(node);
            }

            prog += step;
            self.report_progress(state, prog);
        }

        sort_by_label(&mut nodes);
        Some(TreeNode::branch(label_of(path.last_segment()), nodes))
    }

    fn report_progress(&mut self, state: &mut WalkState<'_>, value: u32) {
        let value = value.min(PROGRESS_MAX).max(state.progress);
        state.progress = value;
        if let Some(sink) = self.progress.as_deref_mut() {
            sink.on_progress(value);
        }
    }

    /// Merge per-processor cpuinfo into each CPU map and tag it with its index.
    fn add_cpu_info(&self, value: RawValue) -> RawValue {
        let entries = match value {
            RawValue::List(entries) => entries,
            other => return other,
        };

        let merged = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                RawValue::Map(map) => RawValue::Map(self.merge_processor(index, map)),
                other => other,
            })
            .collect();

        RawValue::List(merged)
    }

    fn merge_processor(&self, index: usize, mut map: RawMap) -> RawMap {
        let processor = self.options.cpuinfo_root.child(&index.to_string());

        let Some(keys) = self.provider.children(&processor) else {
            return map;
        };
        for key in keys.iter().filter(|k| !k.is_empty()) {
            map.insert(key.clone(), self.provider.value(&processor.child(key)));
        }
        map.insert(PROCESSOR_KEY.to_string(), RawValue::int(index as i64));
        map
    }
}

/// Drop repeated child names, keeping the first occurrence. Empty names are
/// not valid segments and are dropped too.
fn dedupe_children(children: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    children
        .into_iter()
        .filter(|child| {
            if child.is_empty() {
                debug!("Ignoring empty child name");
                return false;
            }
            seen.insert(child.clone())
        })
        .collect()
}

/// SMBIOS stub entries: maps with at most two keys whose type is "unknown",
/// e.g. `{"type": "unknown", "type_id": 217}`. Larger entries are kept even
/// with an unknown type.
fn is_smbios_stub(entry: &RawValue) -> bool {
    match entry {
        RawValue::Map(map) => {
            map.len() <= 2 && map.get("type").and_then(RawValue::as_str) == Some("unknown")
        }
        _ => false,
    }
}

/// Remove SMBIOS stub entries from a list of SMBIOS records.
pub fn clean_smbios_entries(entries: &[RawValue]) -> Vec<RawValue> {
    entries
        .iter()
        .filter(|entry| !is_smbios_stub(entry))
        .cloned()
        .collect()
}

/// Clean the `smbios` list of every BIOS entry. Other shapes pass through.
pub fn clean_bios_tree(bios: RawValue) -> RawValue {
    let entries = match bios {
        RawValue::List(entries) => entries,
        other => return other,
    };

    let cleaned = entries
        .into_iter()
        .map(|entry| match entry {
            RawValue::Map(mut map) => {
                let kept = match map.get("smbios") {
                    Some(RawValue::List(smbios)) => {
                        let kept = clean_smbios_entries(smbios);
                        info!("smbios items: {}, after cleanup: {}", smbios.len(), kept.len());
                        Some(kept)
                    }
                    _ => None,
                };
                if let Some(kept) = kept {
                    map.insert("smbios".to_string(), RawValue::list(kept));
                }
                RawValue::Map(map)
            }
            other => other,
        })
        .collect();

    RawValue::List(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_smbios_stub_rule() {
        let entries = RawValue::from(json!([
            {"type": "unknown"},
            {"type": "unknown", "x": 1, "y": 2},
            {"type": "unknown", "type_id": 217},
            {"type": "bios", "vendor": "Acme"},
        ]));
        let cleaned = clean_smbios_entries(entries.as_list().unwrap());
        assert_eq!(
            RawValue::List(cleaned),
            RawValue::from(json!([
                {"type": "unknown", "x": 1, "y": 2},
                {"type": "bios", "vendor": "Acme"},
            ]))
        );
    }

    #[test]
    fn test_clean_bios_tree_only_touches_smbios() {
        let bios = RawValue::from(json!([
            {"smbios": [{"type": "unknown"}, {"type": "board", "name": "X"}], "lba_support": true},
            "scalar",
        ]));
        let cleaned = clean_bios_tree(bios);
        assert_eq!(
            cleaned,
            RawValue::from(json!([
                {"smbios": [{"type": "board", "name": "X"}], "lba_support": true},
                "scalar",
            ]))
        );
    }

    #[test]
    fn test_all_stub_smbios_becomes_empty() {
        let bios = RawValue::from(json!([
            {"smbios": [{"type": "unknown", "type_id": 217}], "lba_support": true},
        ]));
        let cleaned = clean_bios_tree(bios);
        let entry = cleaned.as_list().unwrap()[0].as_map().unwrap();
        assert_eq!(entry["smbios"], RawValue::Empty);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let children = vec!["usb", "usb", "pci", "", "usb"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dedupe_children(children), vec!["usb", "pci"]);
    }

    #[test]
    fn test_options_follow_config() {
        let mut config = ProbeConfig::default();
        config.cpu_segment = "processor".to_string();
        let options = WalkOptions::from(&config);
        assert_eq!(options.cpu_segment, "processor");
        assert_eq!(options.bios_path.to_string(), "probe.bios");
    }
}
