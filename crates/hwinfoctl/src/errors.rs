//! Exit status for hwinfoctl

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the walk was cancelled (Ctrl-C)
pub const EXIT_ABORTED: i32 = 3;
