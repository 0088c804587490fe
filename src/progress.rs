// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progress reports and wall-clock formatting.  None of this affects
//! the image; it only keeps a long render from looking hung.

use itertools::Itertools;
use log::info;
use std::time::{Duration, Instant};

/// How long to wait before the first report.
pub const FIRST_REPORT: Duration = Duration::from_secs(5);

/// How long to wait between later reports.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Somewhere to send "samples taken" updates.  Called from a sampling
/// thread at most once per tick, never per sample.
pub trait ProgressSink: Sync {
    /// `taken` of `total` samples for `channel` have been processed.
    fn report(&self, channel: &str, taken: usize, total: usize);
}

/// Reports through the `log` facade at `info` level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, channel: &str, taken: usize, total: usize) {
        info!("{} channel: samples taken {}/{}", channel, taken, total);
    }
}

/// Drops every report.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _channel: &str, _taken: usize, _total: usize) {}
}

/// Decides when the next report is due.
#[derive(Debug)]
pub struct Ticker {
    next: Instant,
    interval: Duration,
}

impl Ticker {
    /// The reference cadence: after five seconds, then every thirty.
    pub fn new() -> Ticker {
        Ticker::with_intervals(FIRST_REPORT, REPORT_INTERVAL)
    }

    /// A ticker that first fires after `first` and then every `interval`.
    pub fn with_intervals(first: Duration, interval: Duration) -> Ticker {
        Ticker {
            next: Instant::now() + first,
            interval,
        }
    }

    /// True if a report is due; if so, schedules the next one.
    pub fn due(&mut self) -> bool {
        let now = Instant::now();
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker::new()
    }
}

/// Renders a duration as e.g. `"1 Hours, 2 Minutes, 3 Seconds, 4
/// Milliseconds"`.  Zero-valued units are left out; more than a day's
/// worth of hours is split into days.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = u64::from(elapsed.subsec_millis());

    let mut parts = vec![];
    if hours > 24 {
        parts.push(format!("{} Days", hours / 24));
        parts.push(format!("{} Hours", hours % 24));
    } else if hours > 0 {
        parts.push(format!("{} Hours", hours));
    }
    for &(count, unit) in &[(minutes, "Minutes"), (seconds, "Seconds"), (millis, "Milliseconds")] {
        if count > 0 {
            parts.push(format!("{} {}", count, unit));
        }
    }

    if parts.is_empty() {
        "0 Milliseconds".to_string()
    } else {
        parts.iter().join(", ")
    }
}
