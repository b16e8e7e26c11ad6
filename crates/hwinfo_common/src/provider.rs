//! Provider seam - the hierarchical inventory the walker reads from.
//!
//! A provider answers two questions about a path: which children it has
//! (`None` means the path is a leaf) and what value a leaf holds. Providers
//! report failures as `Empty` values, never as errors.

use crate::probe_path::ProbePath;
use crate::raw_value::RawValue;
use tracing::debug;

pub trait Provider {
    /// Child segment names, or `None` if `path` is a leaf.
    fn children(&self, path: &ProbePath) -> Option<Vec<String>>;

    /// Value of a leaf. Unknown paths read as `Empty`.
    fn value(&self, path: &ProbePath) -> RawValue;
}

impl<P: Provider + ?Sized> Provider for &P {
    fn children(&self, path: &ProbePath) -> Option<Vec<String>> {
        (**self).children(path)
    }

    fn value(&self, path: &ProbePath) -> RawValue {
        (**self).value(path)
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn children(&self, path: &ProbePath) -> Option<Vec<String>> {
        (**self).children(path)
    }

    fn value(&self, path: &ProbePath) -> RawValue {
        (**self).value(path)
    }
}

/// Routes each query to the provider mounted at the longest matching prefix.
///
/// Mounted providers see full paths, not paths relative to their mount point.
#[derive(Default)]
pub struct MountedProvider {
    mounts: Vec<(ProbePath, Box<dyn Provider + Send + Sync>)>,
}

impl MountedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(mut self, prefix: ProbePath, provider: impl Provider + Send + Sync + 'static) -> Self {
        self.mounts.push((prefix, Box::new(provider)));
        // Longest prefix first
        self.mounts.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    pub fn mount_points(&self) -> Vec<&ProbePath> {
        self.mounts.iter().map(|(p, _)| p).collect()
    }

    fn route(&self, path: &ProbePath) -> Option<&(dyn Provider + Send + Sync)> {
        let found = self
            .mounts
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix))
            .map(|(_, provider)| provider.as_ref());
        if found.is_none() {
            debug!("No provider mounted for {}", path);
        }
        found
    }
}

impl Provider for MountedProvider {
    fn children(&self, path: &ProbePath) -> Option<Vec<String>> {
        self.route(path)?.children(path)
    }

    fn value(&self, path: &ProbePath) -> RawValue {
        self.route(path).map(|p| p.value(path)).unwrap_or_default()
    }
}
