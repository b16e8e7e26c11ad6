//! Logging for hwinfoctl
//!
//! Diagnostics go to stderr so tree output on stdout stays clean.
//!
//! Filter priority:
//! 1. $HWINFO_LOG (any tracing filter directive)
//! 2. -v flags: info, debug, trace
//! 3. `log.level` from the config file (default "warn")

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive
pub const LOG_ENV: &str = "HWINFO_LOG";

const FALLBACK_LEVEL: &str = "warn";

/// Pick the filter directive to use.
pub fn filter_directive(env: Option<String>, verbose: u8, config_level: &str) -> String {
    if let Some(directive) = env.filter(|d| !d.trim().is_empty()) {
        return directive;
    }
    match verbose {
        0 if config_level.trim().is_empty() => FALLBACK_LEVEL.to_string(),
        0 => config_level.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// keep the first subscriber.
pub fn init(verbose: u8, config_level: &str) {
    let directive = filter_directive(std::env::var(LOG_ENV).ok(), verbose, config_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter '{}': {}", directive, e);
        EnvFilter::new(FALLBACK_LEVEL)
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
