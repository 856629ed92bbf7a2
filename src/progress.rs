//! Throughput reporting.
//!
//! The importer calls [`ProgressReporter::observe`] after every joined batch
//! and [`ProgressReporter::finish`] at the end of a file. A line is printed to
//! stdout whenever the report interval has elapsed, with the number of lines
//! loaded since the previous report:
//!
//! ```text
//! Time Elapsed: 001m.05s, Lines Loaded: +20000
//! ```

use std::time::{Duration, Instant};
use tracing::debug;

/// Format one progress line.
#[must_use]
pub fn format_progress(elapsed: Duration, lines: u64) -> String {
    let secs = elapsed.as_secs();
    format!(
        "Time Elapsed: {:03}m.{:02}s, Lines Loaded: +{lines}",
        secs / 60,
        secs % 60
    )
}

/// Periodic progress printer for one file.
pub struct ProgressReporter {
    periodic: bool,
    interval: Duration,
    started: Instant,
    next_report: Instant,
    last_count: u64,
}

impl ProgressReporter {
    /// `periodic` enables the interval reports; the closing report of
    /// [`finish`](Self::finish) is always printed.
    #[must_use]
    pub fn new(interval: Duration, periodic: bool) -> Self {
        Self::starting_at(Instant::now(), interval, periodic)
    }

    #[must_use]
    pub fn starting_at(started: Instant, interval: Duration, periodic: bool) -> Self {
        Self {
            periodic,
            interval,
            started,
            next_report: started + interval,
            last_count: 0,
        }
    }

    /// Report if the interval has elapsed; returns the printed line.
    pub fn observe(&mut self, line_count: u64) -> Option<String> {
        self.observe_at(Instant::now(), line_count)
    }

    pub fn observe_at(&mut self, now: Instant, line_count: u64) -> Option<String> {
        if !self.periodic || now <= self.next_report {
            return None;
        }
        let line = self.emit(now, line_count);
        self.next_report += self.interval;
        Some(line)
    }

    /// Print the closing report for the file.
    pub fn finish(&mut self, line_count: u64) -> String {
        self.finish_at(Instant::now(), line_count)
    }

    pub fn finish_at(&mut self, now: Instant, line_count: u64) -> String {
        self.emit(now, line_count)
    }

    fn emit(&mut self, now: Instant, line_count: u64) -> String {
        let line = format_progress(
            now.saturating_duration_since(self.started),
            line_count.saturating_sub(self.last_count),
        );
        self.last_count = line_count;
        debug!(line_count, "{line}");
        println!("{line}");
        line
    }
}
