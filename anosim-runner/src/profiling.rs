//! Phase timing for ANOSIM runs.
//!
//! Off unless `ANOSIM_PROFILE=1` (or `true`). When on, each phase scope
//! prints its wall time to stderr on drop:
//!
//! ```text
//! [PROFILE] rank_transform took 12.408ms
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

static PROFILING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Read `ANOSIM_PROFILE` and set the global flag. Call once at startup.
pub fn init() {
    let enabled = enabled_by(std::env::var("ANOSIM_PROFILE").ok().as_deref());
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);

    if enabled {
        eprintln!("[PROFILING] Enabled (ANOSIM_PROFILE=1)");
    }
}

fn enabled_by(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[inline]
pub fn is_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

/// Times one run phase; reports on drop when profiling is on.
pub struct ProfileScope {
    phase: &'static str,
    start: Instant,
}

impl ProfileScope {
    #[inline]
    pub fn new(phase: &'static str) -> Self {
        Self {
            phase,
            start: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        if is_enabled() {
            eprintln!("{}", phase_line(self.phase, self.start.elapsed()));
        }
    }
}

fn phase_line(phase: &str, duration: Duration) -> String {
    format!(
        "[PROFILE] {phase} took {:.3}ms",
        duration.as_secs_f64() * 1000.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_values_that_enable_profiling() {
        assert!(enabled_by(Some("1")));
        assert!(enabled_by(Some("TRUE")));
        assert!(!enabled_by(Some("0")));
        assert!(!enabled_by(Some("")));
        assert!(!enabled_by(None));
    }

    #[test]
    fn phase_line_reports_milliseconds() {
        let line = phase_line("rank_transform", Duration::from_micros(12_408));
        assert_eq!(line, "[PROFILE] rank_transform took 12.408ms");
    }
}
