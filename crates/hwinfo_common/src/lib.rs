//! hwinfo common - probe-tree traversal and tree rendering.
//!
//! Walks a hierarchical hardware inventory (the probe tree) through a
//! [`Provider`], and turns arbitrary nested inventory data into a sorted,
//! labeled [`TreeNode`] tree for display and export.

pub mod classnames;
pub mod config;
pub mod cpuinfo;
pub mod error;
pub mod exclusions;
pub mod labels;
pub mod live;
pub mod probe_path;
pub mod progress;
pub mod provider;
pub mod raw_value;
pub mod renderer;
pub mod snapshot;
pub mod summary;
pub mod tree;
pub mod walker;

pub use classnames::{ClassTable, DeviceClasses};
pub use config::HwinfoConfig;
pub use error::HwinfoError;
pub use exclusions::ExcludedPaths;
pub use probe_path::ProbePath;
pub use progress::{CancelFlag, CancelSource, ProgressSink};
pub use provider::{MountedProvider, Provider};
pub use raw_value::{RawMap, RawValue, Scalar};
pub use renderer::{render, TreeRenderer};
pub use snapshot::{Snapshot, SnapshotProvider};
pub use summary::{DetectedDevice, SystemSummary};
pub use tree::TreeNode;
pub use walker::{WalkOptions, WalkOutcome, Walker};
