//! Progress bar for the probe walk.
//!
//! Shown on stderr, and only when stderr is a terminal, so redirected or
//! piped output never carries bar artifacts. A hidden bar still accepts
//! updates, which keeps the walk code free of TTY checks.

use console::Term;
use hwinfo_common::progress::PROGRESS_MAX;
use hwinfo_common::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner} [{bar:40}] {percent:>3}% {wide_msg}";

pub struct ProbeProgressBar {
    bar: Option<ProgressBar>,
}

impl ProbeProgressBar {
    /// Bar on stderr if it is a terminal and progress was not disabled.
    pub fn for_terminal(no_progress: bool) -> Self {
        let is_tty = Term::stderr().is_term();
        let no_color = std::env::var("NO_COLOR").is_ok();
        if no_progress || !is_tty || no_color {
            return Self::hidden();
        }
        Self::visible()
    }

    pub fn visible() -> Self {
        let bar = ProgressBar::new(PROGRESS_MAX as u64);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar: Some(bar) }
    }

    pub fn hidden() -> Self {
        Self { bar: None }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    /// Remove the bar from the terminal.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Leave the bar where it stopped, with a final message.
    pub fn abandon(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}

impl ProgressSink for ProbeProgressBar {
    fn on_progress(&mut self, value: u32) {
        if let Some(bar) = &self.bar {
            bar.set_position(value.min(PROGRESS_MAX) as u64);
        }
    }

    fn on_label_update(&mut self, text: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(text.to_string());
        }
    }
}
