pub mod crowd;

pub use crowd::error::{CrowdError, Result};

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100 ticks when the `perf_stats` feature is enabled.
///
/// `$tick` is any integer tick counter. Without the feature the macro expands
/// to an empty block and its arguments are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(self.tick_count, "[CROWD] agents: {}", self.len());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick % 100 == 0 {
            bevy::log::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
