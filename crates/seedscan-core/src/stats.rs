//! Session statistics

use std::time::Duration;

use serde::Serialize;

use crate::evaluator::Outcome;

/// Running counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    /// Phrases checked since the last reset
    pub checked: u64,
    /// Hits since the last reset
    pub found: u64,
    /// Session start as Unix milliseconds, 0 while unset
    pub start_time: i64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one processed tick
    pub fn on_tick(&mut self, outcome: &Outcome) {
        self.checked += 1;
        if outcome.is_hit() {
            self.found += 1;
        }
    }

    /// Stamp the start time unless already set this session
    pub fn on_start(&mut self) {
        self.on_start_at(chrono::Utc::now().timestamp_millis());
    }

    /// Like `on_start` with an explicit clock, for replay and tests
    pub fn on_start_at(&mut self, now_ms: i64) {
        if self.start_time == 0 {
            self.start_time = now_ms;
        }
    }

    /// Zero everything for a fresh session
    pub fn on_reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_started(&self) -> bool {
        self.start_time != 0
    }

    /// Wall time since the session started
    pub fn elapsed(&self, now_ms: i64) -> Duration {
        if !self.is_started() {
            return Duration::ZERO;
        }
        Duration::from_millis(now_ms.saturating_sub(self.start_time).max(0) as u64)
    }

    /// Phrases checked per second of wall time
    pub fn rate(&self, now_ms: i64) -> f64 {
        let elapsed = self.elapsed(now_ms).as_secs_f64();
        if elapsed > 0.0 {
            self.checked as f64 / elapsed
        } else {
            0.0
        }
    }

    /// One-line tally for status displays
    pub fn format(&self, now_ms: i64) -> String {
        format!(
            "[{:.1} checks/s][Checked {}][Found {}][Elapsed {}]",
            self.rate(now_ms),
            format_count(self.checked),
            self.found,
            format_duration(self.elapsed(now_ms).as_secs_f64())
        )
    }
}

/// Abbreviate a counter with K/M/G suffixes
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000_000 {
        format!("{:.2}G", count as f64 / 1e9)
    } else if count >= 1_000_000 {
        format!("{:.2}M", count as f64 / 1e6)
    } else if count >= 1000 {
        format!("{:.2}K", count as f64 / 1e3)
    } else {
        format!("{}", count)
    }
}

/// Compact duration in the largest fitting unit
pub fn format_duration(seconds: f64) -> String {
    if seconds <= 0.0 {
        return "0s".to_string();
    }
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.0}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.0}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else {
        format!("{:.1}d", seconds / 86400.0)
    }
}
