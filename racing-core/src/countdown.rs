//! Start countdown timer
//!
//! Counts down once per tick from the configured default. The timer is not
//! clamped at zero: after the gun it keeps counting into negative values so
//! the crew can see how late they crossed.

use serde::{Deserialize, Serialize};

/// Five-minute start sequence
pub const DEFAULT_START_SECONDS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownTimer {
    default_seconds: i64,
    total_seconds: i64,
    running: bool,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        CountdownTimer::new(DEFAULT_START_SECONDS)
    }
}

impl CountdownTimer {
    pub fn new(default_seconds: i64) -> Self {
        CountdownTimer {
            default_seconds,
            total_seconds: default_seconds,
            running: false,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        self.total_seconds
    }

    pub fn default_seconds(&self) -> i64 {
        self.default_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Change the configured default. Takes effect on the next start or reset.
    pub fn set_default(&mut self, seconds: i64) {
        self.default_seconds = seconds;
    }

    /// Load the default and begin counting down
    pub fn start(&mut self) {
        self.total_seconds = self.default_seconds;
        self.running = true;
    }

    /// Stop and restore the default
    pub fn reset(&mut self) {
        self.running = false;
        self.total_seconds = self.default_seconds;
    }

    /// Advance one second
    pub fn tick(&mut self) {
        if self.running {
            self.total_seconds -= 1;
        }
    }

    /// `m:ss`, with a leading `-` once past zero
    pub fn format(&self) -> String {
        let sign = if self.total_seconds < 0 { "-" } else { "" };
        let remaining = self.total_seconds.unsigned_abs();
        format!("{}{}:{:02}", sign, remaining / 60, remaining % 60)
    }
}

impl std::fmt::Display for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let timer = CountdownTimer::default();
        assert_eq!(timer.total_seconds(), 300);
        assert!(!timer.is_running());
        assert_eq!(timer.format(), "5:00");
    }

    #[test]
    fn test_tick_only_while_running() {
        let mut timer = CountdownTimer::default();
        timer.tick();
        assert_eq!(timer.total_seconds(), 300);

        timer.start();
        timer.tick();
        assert_eq!(timer.total_seconds(), 299);
        assert_eq!(timer.format(), "4:59");
    }

    #[test]
    fn test_overshoot() {
        let mut timer = CountdownTimer::default();
        timer.start();
        for _ in 0..301 {
            timer.tick();
        }
        assert_eq!(timer.total_seconds(), -1);
        assert_eq!(timer.format(), "-0:01");

        for _ in 0..60 {
            timer.tick();
        }
        assert_eq!(timer.format(), "-1:01");
    }

    #[test]
    fn test_reset_restores_default() {
        let mut timer = CountdownTimer::new(120);
        timer.start();
        timer.tick();
        timer.tick();
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.total_seconds(), 120);
        timer.tick();
        assert_eq!(timer.total_seconds(), 120);
    }

    #[test]
    fn test_start_restarts_sequence() {
        let mut timer = CountdownTimer::default();
        timer.start();
        for _ in 0..10 {
            timer.tick();
        }
        timer.set_default(60);
        assert_eq!(timer.total_seconds(), 290);
        timer.start();
        assert_eq!(timer.total_seconds(), 60);
        assert!(timer.is_running());
    }
}
