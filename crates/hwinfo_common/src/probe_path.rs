//! Probe paths - dotted addresses into the hardware inventory.
//!
//! `probe.cpu`, `probe.usb.0`, `proc.cpuinfo.value.1.model name`.
//! Segments are never empty. Segments may contain spaces (cpuinfo keys do),
//! so child paths are built with [`ProbePath::child`] rather than by parsing.

use crate::error::HwinfoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address of a node in the probe tree.
///
/// Ordering is lexicographic over segments, so a path sorts directly before
/// its own descendants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProbePath {
    segments: Vec<String>,
}

impl ProbePath {
    /// Parse a dotted path. A leading dot (`.probe.cpu`) is accepted.
    pub fn parse(s: &str) -> Result<Self, HwinfoError> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(HwinfoError::InvalidPath(s.to_string()));
        }

        let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(HwinfoError::InvalidPath(s.to_string()));
        }

        Ok(Self { segments })
    }

    /// Single-segment path.
    pub fn root(segment: &str) -> Result<Self, HwinfoError> {
        if segment.is_empty() {
            return Err(HwinfoError::InvalidPath(segment.to_string()));
        }
        Ok(Self {
            segments: vec![segment.to_string()],
        })
    }

    /// Build from a well-formed dotted literal. Empty segments are dropped.
    pub(crate) fn literal(s: &str) -> Self {
        Self {
            segments: s
                .split('.')
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// `self + "." + segment`. An empty segment yields `self` unchanged.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        if !segment.is_empty() {
            segments.push(segment.to_string());
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Text behind the last dot.
    pub fn last_segment(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if `prefix` equals `self` or is one of its ancestors.
    pub fn starts_with(&self, prefix: &ProbePath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Segments of `self` after `prefix`, if `prefix` is an ancestor.
    pub fn strip_prefix(&self, prefix: &ProbePath) -> Option<&[String]> {
        if self.starts_with(prefix) {
            Some(&self.segments[prefix.segments.len()..])
        } else {
            None
        }
    }
}

impl fmt::Display for ProbePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for ProbePath {
    type Err = HwinfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProbePath {
    type Error = HwinfoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ProbePath> for String {
    fn from(path: ProbePath) -> Self {
        path.to_string()
    }
}
