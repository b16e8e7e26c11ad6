//! Inventory snapshots - a probe tree frozen to JSON.
//!
//! A snapshot stores directory listings and leaf values separately, keyed by
//! dotted path, so leaves holding maps stay distinguishable from directories:
//!
//! ```json
//! {
//!   "captured_at": "2024-05-01T10:00:00Z",
//!   "directories": { "probe": ["cpu", "has_smp"] },
//!   "values": { "probe.cpu": [{"model": "..."}], "probe.has_smp": true }
//! }
//! ```

use crate::error::{HwinfoError, Result};
use crate::exclusions::ExcludedPaths;
use crate::probe_path::ProbePath;
use crate::provider::Provider;
use crate::raw_value::RawValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,

    /// Directory path -> child segments, in provider order
    #[serde(default)]
    pub directories: BTreeMap<String, Vec<String>>,

    /// Leaf path -> value
    #[serde(default)]
    pub values: BTreeMap<String, RawValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_directory(&mut self, path: &ProbePath, children: Vec<String>) {
        self.directories.insert(path.to_string(), children);
    }

    pub fn add_value(&mut self, path: &ProbePath, value: RawValue) {
        self.values.insert(path.to_string(), value);
    }

    /// Record everything reachable from `root`, skipping excluded paths.
    ///
    /// Extra paths outside the tree (e.g. the cpuinfo address space the
    /// walker merges into CPU entries) can be captured with further calls.
    pub fn capture(provider: &dyn Provider, root: &ProbePath, excluded: &ExcludedPaths) -> Self {
        let mut snapshot = Self {
            captured_at: Some(Utc::now()),
            ..Self::default()
        };
        snapshot.capture_subtree(provider, root, excluded);
        info!(
            "Captured {} directories and {} values under {}",
            snapshot.directories.len(),
            snapshot.values.len(),
            root
        );
        snapshot
    }

    pub fn capture_subtree(&mut self, provider: &dyn Provider, path: &ProbePath, excluded: &ExcludedPaths) {
        if excluded.contains(path) {
            return;
        }

        match provider.children(path) {
            Some(children) => {
                for child in &children {
                    self.capture_subtree(provider, &path.child(child), excluded);
                }
                self.add_directory(path, children);
            }
            None => {
                let value = provider.value(path);
                if !value.is_empty() {
                    self.add_value(path, value);
                }
            }
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for key in self.directories.keys().chain(self.values.keys()) {
            ProbePath::parse(key)
                .map_err(|_| HwinfoError::Snapshot(format!("invalid path key '{}'", key)))?;
        }
        for (dir, children) in &self.directories {
            if children.iter().any(|c| c.is_empty()) {
                return Err(HwinfoError::Snapshot(format!(
                    "empty child name under '{}'",
                    dir
                )));
            }
        }
        Ok(())
    }
}

/// Serves a [`Snapshot`] as a provider.
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    snapshot: Snapshot,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(Snapshot::load(path)?))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl Provider for SnapshotProvider {
    fn children(&self, path: &ProbePath) -> Option<Vec<String>> {
        self.snapshot.directories.get(&path.to_string()).cloned()
    }

    fn value(&self, path: &ProbePath) -> RawValue {
        self.snapshot
            .values
            .get(&path.to_string())
            .cloned()
            .unwrap_or_default()
    }
}
