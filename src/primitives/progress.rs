//! Stage progress logging.
//!
//! Pipeline stages report what they are doing and how long it took. The
//! estimator's `verbose` flag picks the `tracing` level: `info` when verbose,
//! `debug` otherwise. The crate never installs a subscriber.

use std::time::Instant;

/// Emit a progress event at `info` (verbose) or `debug` (quiet) level.
#[macro_export]
#[doc(hidden)]
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            ::tracing::info!($($arg)+);
        } else {
            ::tracing::debug!($($arg)+);
        }
    };
}

/// Wall-clock timer for a single pipeline stage.
#[derive(Debug, Clone, Copy)]
pub struct StageTimer {
    started: Instant,
}

impl StageTimer {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Seconds elapsed since `start`.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
