//! Elapsed-time measurement for diagnostics.

use std::time::{Duration, Instant};

/// Lap timer: each tick returns the time since the previous one
#[derive(Debug, Clone, Copy)]
pub struct Chrono {
    start: Instant,
}

impl Default for Chrono {
    fn default() -> Self {
        Self::new()
    }
}

impl Chrono {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since creation or the last tick, and restart
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now - self.start;
        self.start = now;
        elapsed
    }
}

/// Format a duration as `123us`, `4.567ms` or `8.901s`
pub fn format_duration(duration: Duration) -> String {
    let us = duration.as_micros();
    if us < 1_000 {
        format!("{}us", us)
    } else if us < 1_000_000 {
        format!("{}.{:03}ms", us / 1_000, us % 1_000)
    } else {
        let ms = us / 1_000;
        format!("{}.{:03}s", ms / 1_000, ms % 1_000)
    }
}
