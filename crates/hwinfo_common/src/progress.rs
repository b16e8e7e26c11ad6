//! Progress reporting and cancellation seams for the probe walk.
//!
//! Both are consumed, never queried back: the walker pushes progress into a
//! [`ProgressSink`] and polls a [`CancelSource`] once per recursion step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Upper bound of the progress scale.
pub const PROGRESS_MAX: u32 = 1000;

/// Receiver of walk progress.
pub trait ProgressSink {
    /// Overall progress in `0..=PROGRESS_MAX`, non-decreasing within a walk.
    fn on_progress(&mut self, value: u32);

    /// Label of the node currently being probed.
    fn on_label_update(&mut self, text: &str);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&mut self, _value: u32) {}

    fn on_label_update(&mut self, _text: &str) {}
}

/// A single recorded progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Value(u32),
    Label(String),
}

/// Keeps every event, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Value(v) => Some(*v),
                ProgressEvent::Label(_) => None,
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Label(l) => Some(l.as_str()),
                ProgressEvent::Value(_) => None,
            })
            .collect()
    }

    pub fn last_value(&self) -> Option<u32> {
        self.values().last().copied()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_progress(&mut self, value: u32) {
        self.events.push(ProgressEvent::Value(value));
    }

    fn on_label_update(&mut self, text: &str) {
        self.events.push(ProgressEvent::Label(text.to_string()));
    }
}

/// Non-blocking cancellation check.
pub trait CancelSource {
    fn poll_cancel_requested(&self) -> bool;
}

/// Never requests cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancelSource for NeverCancel {
    fn poll_cancel_requested(&self) -> bool {
        false
    }
}

/// Shared flag, set from another thread (signal handler, UI button).
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl CancelSource for CancelFlag {
    fn poll_cancel_requested(&self) -> bool {
        self.is_cancelled()
    }
}

impl<F> CancelSource for F
where
    F: Fn() -> bool,
{
    fn poll_cancel_requested(&self) -> bool {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let remote = flag.clone();
        assert!(!flag.poll_cancel_requested());
        remote.cancel();
        assert!(flag.poll_cancel_requested());
    }

    #[test]
    fn test_closure_cancel_source() {
        let source = || true;
        assert!(source.poll_cancel_requested());
        assert!(!NeverCancel.poll_cancel_requested());
    }

    #[test]
    fn test_recording_progress_splits_events() {
        let mut sink = RecordingProgress::new();
        sink.on_label_update("CPU");
        sink.on_progress(500);
        sink.on_progress(1000);
        assert_eq!(sink.values(), vec![500, 1000]);
        assert_eq!(sink.labels(), vec!["CPU"]);
        assert_eq!(sink.last_value(), Some(1000));
    }
}
