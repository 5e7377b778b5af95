//! Tick-driven rest countdown.
//!
//! The timer holds no clock of its own: the owner feeds it one `tick()`
//! per elapsed second. That keeps the countdown fully deterministic and
//! trivially cancelable — dropping the timer stops it.

use serde::{Deserialize, Serialize};

/// Countdown between sets. A zero duration counts as already elapsed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestTimer {
    duration: u32,
    remaining: u32,
    paused: bool,
}

impl RestTimer {
    /// Start a countdown for `duration` seconds
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            paused: false,
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `true` on the tick that reaches zero — the caller fires
    /// its rest-complete handling exactly once, on that tick. Ticks while
    /// paused or after expiry are no-ops.
    pub fn tick(&mut self) -> bool {
        if self.paused || self.remaining == 0 {
            return false;
        }

        self.remaining -= 1;
        self.remaining == 0
    }

    /// Stop decrementing until resumed
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume a paused countdown
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Force the countdown to zero. Fires the same completion path as
    /// natural expiry; the caller decides what "complete" means.
    pub fn skip(&mut self) {
        self.remaining = 0;
    }

    /// Reset to a new duration (e.g. a different exercise's rest period),
    /// clearing any pause.
    pub fn restart(&mut self, duration: u32) {
        self.duration = duration;
        self.remaining = duration;
        self.paused = false;
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining == 0
    }

    /// Fraction of the countdown already elapsed, in `0.0..=1.0`.
    /// Derived, not stored. A zero-duration timer reads as fully elapsed.
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 1.0;
        }
        f64::from(self.duration - self.remaining) / f64::from(self.duration)
    }

    /// Remaining time as `M:SS` for display
    pub fn format_remaining(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_to_zero() {
        let mut timer = RestTimer::new(3);

        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick()); // fires on the tick reaching zero
        assert!(timer.is_elapsed());

        // Further ticks do not fire again
        assert!(!timer.tick());
    }

    #[test]
    fn test_pause_blocks_ticks() {
        let mut timer = RestTimer::new(10);
        timer.tick();
        timer.pause();

        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 9);

        timer.resume();
        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 8);
    }

    #[test]
    fn test_skip_forces_zero() {
        let mut timer = RestTimer::new(60);
        timer.tick();
        timer.skip();

        assert!(timer.is_elapsed());
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_restart_resets_and_unpauses() {
        let mut timer = RestTimer::new(60);
        timer.tick();
        timer.pause();

        timer.restart(90);

        assert_eq!(timer.duration(), 90);
        assert_eq!(timer.remaining(), 90);
        assert!(!timer.is_paused());
    }

    #[test]
    fn test_zero_duration_is_already_elapsed() {
        let mut timer = RestTimer::new(0);
        assert!(timer.is_elapsed());
        assert!(!timer.tick());
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn test_progress_is_derived() {
        let mut timer = RestTimer::new(4);
        assert_eq!(timer.progress(), 0.0);
        timer.tick();
        assert_eq!(timer.progress(), 0.25);
        timer.skip();
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn test_format_remaining() {
        let timer = RestTimer::new(125);
        assert_eq!(timer.format_remaining(), "2:05");

        let timer = RestTimer::new(9);
        assert_eq!(timer.format_remaining(), "0:09");
    }
}
