//! Per-processor details from /proc/cpuinfo.
//!
//! Serves the secondary address space the walker merges into CPU entries:
//!
//! - `<root>` lists processor indices (`0`, `1`, ...)
//! - `<root>.<index>` lists the keys of that processor, in file order
//! - `<root>.<index>.<key>` is the string value

use crate::error::Result;
use crate::probe_path::ProbePath;
use crate::provider::Provider;
use crate::raw_value::RawValue;
use std::path::Path;

pub const PROC_CPUINFO: &str = "/proc/cpuinfo";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processor {
    pub fields: Vec<(String, String)>,
}

impl Processor {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse cpuinfo text: `key : value` lines, processors separated by blank lines.
pub fn parse_cpuinfo(text: &str) -> Vec<Processor> {
    let mut processors = Vec::new();
    let mut current = Processor::default();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.fields.is_empty() {
                processors.push(std::mem::take(&mut current));
            }
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.contains('.') {
            continue;
        }
        current
            .fields
            .push((key.to_string(), value.trim().to_string()));
    }

    if !current.fields.is_empty() {
        processors.push(current);
    }

    processors
}

#[derive(Debug, Clone)]
pub struct CpuinfoProvider {
    root: ProbePath,
    processors: Vec<Processor>,
}

impl CpuinfoProvider {
    pub fn new(root: ProbePath, text: &str) -> Self {
        Self {
            root,
            processors: parse_cpuinfo(text),
        }
    }

    pub fn load(root: ProbePath, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(root, &text))
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    fn processor(&self, segment: &str) -> Option<&Processor> {
        let index: usize = segment.parse().ok()?;
        self.processors.get(index)
    }
}

impl Provider for CpuinfoProvider {
    fn children(&self, path: &ProbePath) -> Option<Vec<String>> {
        match path.strip_prefix(&self.root)? {
            [] => Some((0..self.processors.len()).map(|i| i.to_string()).collect()),
            [index] => self
                .processor(index)
                .map(|p| p.fields.iter().map(|(k, _)| k.clone()).collect()),
            _ => None,
        }
    }

    fn value(&self, path: &ProbePath) -> RawValue {
        match path.strip_prefix(&self.root) {
            Some([index, key]) => self
                .processor(index)
                .and_then(|p| p.get(key))
                .map(RawValue::str)
                .unwrap_or_default(),
            _ => RawValue::Empty,
        }
    }
}
